use serde::{Deserialize, Serialize};

use crate::math::psr;

/// Spin ephemeris in the period domain: period (s) and its first two
/// time derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinEphemeris {
    pub p: f64,
    #[serde(default)]
    pub pd: f64,
    #[serde(default)]
    pub pdd: f64,
}

/// Spin ephemeris in the frequency domain: spin frequency (Hz) and its first
/// two time derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinFrequency {
    pub f: f64,
    pub fd: f64,
    pub fdd: f64,
}

impl SpinEphemeris {
    pub fn new(p: f64, pd: f64, pdd: f64) -> Self {
        Self { p, pd, pdd }
    }

    /// Replace only the terms that are given.
    pub fn with_overrides(&self, p: Option<f64>, pd: Option<f64>, pdd: Option<f64>) -> Self {
        Self {
            p: p.unwrap_or(self.p),
            pd: pd.unwrap_or(self.pd),
            pdd: pdd.unwrap_or(self.pdd),
        }
    }

    pub fn to_frequency(&self) -> SpinFrequency {
        psr::period_to_frequency(self.p, self.pd, self.pdd)
    }
}
