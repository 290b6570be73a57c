use ndarray::Array1;

/// Common error type for grid construction and realignment.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AlignError {
    #[error("grid has {rows} rows but {metadata} per-row metadata values were supplied")]
    ShapeMismatch { rows: usize, metadata: usize },
    #[error("profile grid must have at least one row and one phase bin")]
    EmptyGrid,
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("non-finite bin delay computed for row {row}")]
    NonFiniteDelay { row: usize },
}

pub type AlignResult<T> = Result<T, AlignError>;

/// Strategy that turns a change of timing model into a per-row delay.
///
/// Delays are expressed in phase bins and are positive for content that
/// arrives late; the grid negates them before rotating.
pub trait DelayModel {
    /// Unrounded delay of every grid row, in bins.
    fn bin_delays(&self, nbin: usize) -> Array1<f64>;

    /// Integer shift applied to each row: `floor(delay + 0.5)`.
    fn rounded_bin_delays(&self, nbin: usize) -> Array1<f64> {
        self.bin_delays(nbin).mapv(round_half_up)
    }
}

/// Round to nearest integer with ties going up (`2.5 -> 3`, `-2.5 -> -2`).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

pub(crate) fn ensure_finite(name: &str, value: f64) -> AlignResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AlignError::InvalidParameter(format!(
            "{} must be finite, got {}",
            name, value
        )))
    }
}

pub(crate) fn ensure_positive_period(p: f64) -> AlignResult<()> {
    ensure_finite("period", p)?;
    if p > 0.0 {
        Ok(())
    } else {
        Err(AlignError::InvalidParameter(format!(
            "period must be positive, got {}",
            p
        )))
    }
}
