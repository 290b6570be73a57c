pub mod dispersion;
pub mod grid;
pub mod period;

pub use dispersion::{DispersionDelay, DispersionRealigner};
pub use grid::ProfileGrid;
pub use period::{PeriodRealigner, SpinDelay};
