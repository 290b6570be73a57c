use crate::generator::profile::{build_freq_vs_phase, build_time_vs_phase};
use crate::workflow::config::SimulationConfig;
use anyhow::Context;
use foldalign::math::StatsHelper;
use foldalign::{DispersionRealigner, PeriodRealigner, ProfileGrid};
use ndarray::Array1;
use serde::Serialize;

/// Peak positions of every row before and after realignment.
#[derive(Debug, Clone, Serialize)]
pub struct AlignmentSummary {
    pub peak_bins_before: Vec<usize>,
    pub peak_bins_after: Vec<usize>,
    /// Largest circular distance (bins) between any two row peaks.
    pub spread_before: usize,
    pub spread_after: usize,
    /// Height of the brightest bin of the summed profile.
    pub summed_peak_before: f64,
    pub summed_peak_after: f64,
    pub max_row_sum_drift: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub nbin: usize,
    pub period: AlignmentSummary,
    pub dispersion: AlignmentSummary,
}

#[derive(Clone)]
pub struct Runner {
    config: SimulationConfig,
}

struct Snapshot {
    peaks: Vec<usize>,
    spread: usize,
    summed_peak: f64,
    row_sums: Array1<f64>,
}

impl Snapshot {
    fn of(grid: &ProfileGrid) -> Self {
        let peaks: Vec<usize> = grid
            .data()
            .rows()
            .into_iter()
            .map(|row| StatsHelper::peak_bin(row).unwrap_or(0))
            .collect();
        let nbin = grid.nbin();
        let spread = peaks
            .iter()
            .flat_map(|&a| peaks.iter().map(move |&b| circular_distance(a, b, nbin)))
            .max()
            .unwrap_or(0);
        let summed = grid.summed_profile();
        let summed_peak = StatsHelper::peak_bin(summed.view())
            .map(|bin| summed[bin])
            .unwrap_or(0.0);
        Self {
            peaks,
            spread,
            summed_peak,
            row_sums: grid.row_sums(),
        }
    }

    fn compare(self, after: Snapshot) -> AlignmentSummary {
        let max_row_sum_drift = self
            .row_sums
            .iter()
            .zip(after.row_sums.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        AlignmentSummary {
            peak_bins_before: self.peaks,
            peak_bins_after: after.peaks,
            spread_before: self.spread,
            spread_after: after.spread,
            summed_peak_before: self.summed_peak,
            summed_peak_after: after.summed_peak,
            max_row_sum_drift,
        }
    }
}

fn circular_distance(a: usize, b: usize, nbin: usize) -> usize {
    let diff = a.abs_diff(b) % nbin.max(1);
    diff.min(nbin - diff)
}

impl Runner {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> anyhow::Result<SimulationReport> {
        let cfg = &self.config;

        let mut tvph = PeriodRealigner::new(
            build_time_vs_phase(cfg)?,
            cfg.trial_ephemeris(),
            cfg.dm,
            Array1::from(cfg.start_secs()),
        )
        .context("building time-vs-phase realigner")?;
        let before = Snapshot::of(tvph.grid());
        tvph.realign(Some(cfg.true_period), None, None)
            .context("realigning to true period")?;
        let period = before.compare(Snapshot::of(tvph.grid()));

        let mut fvph = DispersionRealigner::new(
            build_freq_vs_phase(cfg)?,
            cfg.trial_ephemeris(),
            cfg.dm,
            Array1::from(cfg.subfreqs()),
        )
        .context("building frequency-vs-phase realigner")?;
        let before = Snapshot::of(fvph.grid());
        fvph.dedisperse(cfg.true_dm)
            .context("dedispersing at true DM")?;
        let dispersion = before.compare(Snapshot::of(fvph.grid()));

        log::info!(
            "period spread {} -> {} bins, dispersion spread {} -> {} bins",
            period.spread_before,
            period.spread_after,
            dispersion.spread_before,
            dispersion.spread_after
        );

        Ok(SimulationReport {
            nbin: cfg.nbin,
            period,
            dispersion,
        })
    }
}
