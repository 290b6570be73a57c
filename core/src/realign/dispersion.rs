use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::ephemeris::SpinEphemeris;
use crate::math::psr::delay_from_dispersion_measure;
use crate::prelude::{ensure_finite, ensure_positive_period, AlignResult, DelayModel};
use crate::realign::grid::ProfileGrid;
use crate::telemetry::log::LogManager;

/// Delay of each frequency channel caused by a change of dispersion measure,
/// relative to the channel stored last.
pub struct DispersionDelay<'a> {
    delta_dm: f64,
    period: f64,
    subfreqs: ArrayView1<'a, f64>,
}

impl<'a> DispersionDelay<'a> {
    pub fn new(delta_dm: f64, period: f64, subfreqs: ArrayView1<'a, f64>) -> Self {
        Self {
            delta_dm,
            period,
            subfreqs,
        }
    }

    /// Channel delays in seconds, pinned so the last channel is at zero.
    pub fn pinned_delays(&self) -> Array1<f64> {
        let subdelays = delay_from_dispersion_measure(self.delta_dm, self.subfreqs);
        let pivot = subdelays.iter().next_back().copied().unwrap_or(0.0);
        subdelays.mapv(|delay| delay - pivot)
    }
}

impl DelayModel for DispersionDelay<'_> {
    fn bin_delays(&self, nbin: usize) -> Array1<f64> {
        let bins_per_sec = nbin as f64 / self.period;
        self.pinned_delays().mapv(|delay| delay * bins_per_sec)
    }
}

/// Frequency channel by phase grid that can be re-dedispersed to a new
/// dispersion measure.
#[derive(Debug, Clone)]
pub struct DispersionRealigner {
    grid: ProfileGrid,
    ephemeris: SpinEphemeris,
    dm: f64,
    subfreqs: Array1<f64>,
    logger: LogManager,
}

impl DispersionRealigner {
    /// `subfreqs` holds the reference frequency (MHz) of each grid row, in
    /// row order. The spin ephemeris is only used to convert seconds to bins.
    pub fn new(
        data: Array2<f64>,
        ephemeris: SpinEphemeris,
        dm: f64,
        subfreqs: Array1<f64>,
    ) -> AlignResult<Self> {
        let grid = ProfileGrid::new(data)?;
        grid.ensure_row_metadata(subfreqs.len())?;
        ensure_positive_period(ephemeris.p)?;
        ensure_finite("dispersion measure", dm)?;

        Ok(Self {
            grid,
            ephemeris,
            dm,
            subfreqs,
            logger: LogManager::new("DispersionRealigner"),
        })
    }

    pub fn grid(&self) -> &ProfileGrid {
        &self.grid
    }

    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.grid.data()
    }

    pub fn nchan(&self) -> usize {
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

    pub fn subfreqs(&self) -> ArrayView1<'_, f64> {
        self.subfreqs.view()
    }

    /// Rotate the channels so they are dedispersed at `dm`, each channel
    /// shifted by a whole number of bins.
    pub fn dedisperse(&mut self, dm: f64) -> AlignResult<()> {
        ensure_finite("dispersion measure", dm)?;
        let model = DispersionDelay::new(dm - self.dm, self.ephemeris.p, self.subfreqs.view());
        let applied = self.grid.realign(&model)?;
        self.commit(dm, &applied);
        Ok(())
    }

    /// Like [`DispersionRealigner::dedisperse`] but shifts each channel by its
    /// fractional delay using Fourier interpolation.
    pub fn dedisperse_interpolated(&mut self, dm: f64) -> AlignResult<()> {
        ensure_finite("dispersion measure", dm)?;
        let model = DispersionDelay::new(dm - self.dm, self.ephemeris.p, self.subfreqs.view());
        let applied = self.grid.realign_interpolated(&model)?;
        self.commit(dm, &applied);
        Ok(())
    }

    fn commit(&mut self, dm: f64, applied: &Array1<f64>) {
        self.logger
            .record(&format!("dm {:.4} -> {:.4} over {} channels", self.dm, dm, self.nchan()));
        self.logger.detail(&format!("channel bin delays {}", applied));
        self.dm = dm;
    }
}
