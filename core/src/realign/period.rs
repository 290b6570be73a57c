use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::ephemeris::SpinEphemeris;
use crate::math::psr::{delay_from_frequency_offsets, period_to_frequency};
use crate::prelude::{ensure_finite, ensure_positive_period, AlignResult, DelayModel};
use crate::realign::grid::ProfileGrid;
use crate::telemetry::log::LogManager;

/// Delay of each sub-integration caused by moving from one spin ephemeris
/// to another.
pub struct SpinDelay<'a> {
    current: SpinEphemeris,
    target: SpinEphemeris,
    start_secs: ArrayView1<'a, f64>,
}

impl<'a> SpinDelay<'a> {
    pub fn new(
        current: SpinEphemeris,
        target: SpinEphemeris,
        start_secs: ArrayView1<'a, f64>,
    ) -> Self {
        Self {
            current,
            target,
            start_secs,
        }
    }

    /// Frequency-domain offsets `(df, dfd, dfdd)` from current to target.
    ///
    /// Each target term is converted against the current lower-order terms,
    /// and `dfdd` is exactly zero whenever the target `pdd` is zero.
    pub fn frequency_offsets(&self) -> (f64, f64, f64) {
        let cur = self.current;
        let tgt = self.target;
        let fcurr = cur.to_frequency();

        let fdd = period_to_frequency(cur.p, cur.pd, tgt.pdd).fdd;
        let fd = period_to_frequency(cur.p, tgt.pd, 0.0).fd;
        let f = 1.0 / tgt.p;

        let fdd_diff = if tgt.pdd != 0.0 { fdd - fcurr.fdd } else { 0.0 };
        (f - fcurr.f, fd - fcurr.fd, fdd_diff)
    }
}

impl DelayModel for SpinDelay<'_> {
    fn bin_delays(&self, nbin: usize) -> Array1<f64> {
        let parttimes = single_precision_epochs(self.start_secs);
        let (df, dfd, dfdd) = self.frequency_offsets();
        let delays = delay_from_frequency_offsets(df, dfd, dfdd, parttimes.view());

        let nbin = nbin as f64;
        delays.mapv(|delay| (delay * nbin) % nbin)
    }
}

/// Epoch offsets narrowed to `f32` and widened back, matching folding code
/// that stores sub-integration start times in single precision.
pub fn single_precision_epochs(start_secs: ArrayView1<f64>) -> Array1<f64> {
    start_secs.mapv(|t| t as f32 as f64)
}

/// Sub-integration by phase grid that can be re-phased to a new spin
/// ephemeris.
#[derive(Debug, Clone)]
pub struct PeriodRealigner {
    grid: ProfileGrid,
    ephemeris: SpinEphemeris,
    dm: f64,
    start_secs: Array1<f64>,
    logger: LogManager,
}

impl PeriodRealigner {
    /// `start_secs` holds one epoch offset (s since the first sub-integration)
    /// per grid row, in row order.
    pub fn new(
        data: Array2<f64>,
        ephemeris: SpinEphemeris,
        dm: f64,
        start_secs: Array1<f64>,
    ) -> AlignResult<Self> {
        let grid = ProfileGrid::new(data)?;
        grid.ensure_row_metadata(start_secs.len())?;
        validate_ephemeris(&ephemeris)?;

        Ok(Self {
            grid,
            ephemeris,
            dm,
            start_secs,
            logger: LogManager::new("PeriodRealigner"),
        })
    }

    pub fn grid(&self) -> &ProfileGrid {
        &self.grid
    }

    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.grid.data()
    }

    pub fn nsubint(&self) -> usize {
        self.grid.nrows()
    }

    pub fn nbin(&self) -> usize {
        self.grid.nbin()
    }

    pub fn ephemeris(&self) -> SpinEphemeris {
        self.ephemeris
    }

    pub fn dm(&self) -> f64 {
        self.dm
    }

    pub fn start_secs(&self) -> ArrayView1<'_, f64> {
        self.start_secs.view()
    }

    /// Rotate the sub-integrations so they are phased to the given period and
    /// derivatives. Omitted terms keep their current value.
    pub fn realign(
        &mut self,
        p: Option<f64>,
        pd: Option<f64>,
        pdd: Option<f64>,
    ) -> AlignResult<()> {
        let target = self.ephemeris.with_overrides(p, pd, pdd);
        self.realign_to(target)
    }

    pub fn realign_to(&mut self, target: SpinEphemeris) -> AlignResult<()> {
        validate_ephemeris(&target)?;

        let model = SpinDelay::new(self.ephemeris, target, self.start_secs.view());
        let applied = self.grid.realign(&model)?;

        self.logger.record(&format!(
            "p {:.12} -> {:.12}, pd {:e} -> {:e}, pdd {:e} -> {:e}",
            self.ephemeris.p,
            target.p,
            self.ephemeris.pd,
            target.pd,
            self.ephemeris.pdd,
            target.pdd
        ));
        self.logger.detail(&format!("sub-integration bin delays {}", applied));

        self.ephemeris = target;
        Ok(())
    }
}

fn validate_ephemeris(ephemeris: &SpinEphemeris) -> AlignResult<()> {
    ensure_positive_period(ephemeris.p)?;
    ensure_finite("period derivative", ephemeris.pd)?;
    ensure_finite("period second derivative", ephemeris.pdd)
}
