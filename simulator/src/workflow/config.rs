use anyhow::Context;
use foldalign::SpinEphemeris;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Synthetic observation and the timing model it was folded with.
///
/// `period`, `pd`, `pdd` and `dm` are the trial values the data are folded
/// at; `true_period` and `true_dm` describe the injected pulsar.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub nsubint: usize,
    pub nchan: usize,
    pub nbin: usize,
    /// Observation length (s).
    pub tobs: f64,
    /// Centre frequency of the lowest channel (MHz).
    pub lofreq: f64,
    /// Channel width (MHz).
    pub chan_bw: f64,
    pub period: f64,
    pub pd: f64,
    pub pdd: f64,
    pub dm: f64,
    pub true_period: f64,
    pub true_dm: f64,
    /// Pulse FWHM as a fraction of a turn.
    pub duty: f64,
    pub noise: f64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            nsubint: 32,
            nchan: 32,
            nbin: 64,
            tobs: 600.0,
            lofreq: 1200.0,
            chan_bw: 10.0,
            period: 0.25,
            pd: 0.0,
            pdd: 0.0,
            dm: 0.0,
            true_period: 0.25001,
            true_dm: 45.0,
            duty: 0.04,
            noise: 0.05,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading simulation config {}", path_ref.display()))?;
        let config: SimulationConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing simulation config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(nsubint: usize, nchan: usize, nbin: usize, seed: u64) -> Self {
        Self {
            nsubint,
            nchan,
            nbin,
            seed,
            ..Default::default()
        }
    }

    pub fn trial_ephemeris(&self) -> SpinEphemeris {
        SpinEphemeris::new(self.period, self.pd, self.pdd)
    }

    pub fn true_ephemeris(&self) -> SpinEphemeris {
        SpinEphemeris::new(self.true_period, self.pd, self.pdd)
    }

    /// Epoch offset of each sub-integration start (s).
    pub fn start_secs(&self) -> Vec<f64> {
        let step = self.tobs / self.nsubint.max(1) as f64;
        (0..self.nsubint).map(|i| i as f64 * step).collect()
    }

    /// Channel frequencies (MHz), lowest first.
    pub fn subfreqs(&self) -> Vec<f64> {
        (0..self.nchan)
            .map(|i| self.lofreq + i as f64 * self.chan_bw)
            .collect()
    }
}
