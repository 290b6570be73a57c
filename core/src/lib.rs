//! Phase re-alignment of folded pulsar observations.
//!
//! A folded candidate carries two profile grids: sub-integrations against
//! phase and frequency channels against phase. When the timing model changes
//! (spin period and its derivatives, or dispersion measure) each row of the
//! grid must be circularly rotated so that the pulse lines up at the new
//! phase reference. The realigners here own those grids and apply the
//! rotations; the shared delay math lives in [`math::psr`].

pub mod ephemeris;
pub mod math;
pub mod prelude;
pub mod realign;
pub mod telemetry;

pub use ephemeris::{SpinEphemeris, SpinFrequency};
pub use prelude::{AlignError, AlignResult, DelayModel};
pub use realign::{DispersionRealigner, PeriodRealigner, ProfileGrid};
