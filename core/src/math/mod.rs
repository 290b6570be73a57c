pub mod fft;
pub mod psr;
pub mod stats;

pub use fft::FftHelper;
pub use stats::StatsHelper;
