use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::math::fft::FftHelper;
use crate::math::psr::{circular_rotate, fourier_rotate};
use crate::math::stats::StatsHelper;
use crate::prelude::{AlignError, AlignResult, DelayModel};

/// Two-dimensional folded profile data: rows are independent slices
/// (sub-integrations or frequency channels), columns are phase bins.
///
/// The shape is fixed at construction. Realignment only permutes values
/// within a row, so each row's total intensity is conserved.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileGrid {
    data: Array2<f64>,
}

impl ProfileGrid {
    pub fn new(data: Array2<f64>) -> AlignResult<Self> {
        let (rows, nbin) = data.dim();
        if rows == 0 || nbin == 0 {
            return Err(AlignError::EmptyGrid);
        }
        Ok(Self { data })
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn nbin(&self) -> usize {
        self.data.ncols()
    }

    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.data.row(index)
    }

    pub fn row_sums(&self) -> Array1<f64> {
        StatsHelper::row_sums(self.data.view())
    }

    pub fn summed_profile(&self) -> Array1<f64> {
        StatsHelper::summed_profile(self.data.view())
    }

    /// Rotate every row by the negation of its rounded delay from `model`.
    ///
    /// Returns the rounded delays (bins) that were applied. If any delay is
    /// not finite the grid is left untouched.
    pub fn realign(&mut self, model: &dyn DelayModel) -> AlignResult<Array1<f64>> {
        let delays = model.rounded_bin_delays(self.nbin());
        self.check_delays(&delays)?;

        let nbin = self.nbin() as f64;
        for (index, &delay) in delays.iter().enumerate() {
            if delay == 0.0 {
                continue;
            }
            let shift = (-delay).rem_euclid(nbin) as i64;
            let rotated = circular_rotate(self.data.row(index), shift);
            self.data.row_mut(index).assign(&rotated);
        }
        Ok(delays)
    }

    /// Like [`ProfileGrid::realign`] but rotates each row by its unrounded
    /// delay using Fourier interpolation. Returns the fractional delays.
    pub fn realign_interpolated(&mut self, model: &dyn DelayModel) -> AlignResult<Array1<f64>> {
        let delays = model.bin_delays(self.nbin());
        self.check_delays(&delays)?;

        let nbin = self.nbin() as f64;
        let mut fft = FftHelper::new(self.nbin());
        for (index, &delay) in delays.iter().enumerate() {
            let bins = (-delay).rem_euclid(nbin);
            let rotated = fourier_rotate(self.data.row(index), bins, &mut fft);
            self.data.row_mut(index).assign(&rotated);
        }
        Ok(delays)
    }

    /// Per-row metadata must pair 1:1 with grid rows.
    pub(crate) fn ensure_row_metadata(&self, len: usize) -> AlignResult<()> {
        if len == self.nrows() {
            Ok(())
        } else {
            Err(AlignError::ShapeMismatch {
                rows: self.nrows(),
                metadata: len,
            })
        }
    }

    fn check_delays(&self, delays: &Array1<f64>) -> AlignResult<()> {
        self.ensure_row_metadata(delays.len())?;
        match delays.iter().position(|d| !d.is_finite()) {
            Some(row) => Err(AlignError::NonFiniteDelay { row }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    struct FixedDelays(Array1<f64>);

    impl DelayModel for FixedDelays {
        fn bin_delays(&self, _nbin: usize) -> Array1<f64> {
            self.0.clone()
        }
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert_eq!(
            ProfileGrid::new(Array2::zeros((0, 8))).unwrap_err(),
            AlignError::EmptyGrid
        );
        assert_eq!(
            ProfileGrid::new(Array2::zeros((3, 0))).unwrap_err(),
            AlignError::EmptyGrid
        );
    }

    #[test]
    fn positive_delay_moves_content_right() {
        let mut grid = ProfileGrid::new(array![[1.0, 2.0, 3.0, 4.0], [1.0, 2.0, 3.0, 4.0]]).unwrap();
        let applied = grid.realign(&FixedDelays(array![1.0, -1.0])).unwrap();
        assert_eq!(applied, array![1.0, -1.0]);
        assert_eq!(grid.row(0), array![4.0, 1.0, 2.0, 3.0]);
        assert_eq!(grid.row(1), array![2.0, 3.0, 4.0, 1.0]);
    }

    #[test]
    fn delays_round_half_up_before_rotating() {
        let mut grid = ProfileGrid::new(array![[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]]).unwrap();
        let applied = grid.realign(&FixedDelays(array![2.5])).unwrap();
        assert_eq!(applied, array![3.0]);
        assert_eq!(grid.row(0), array![0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn non_finite_delay_leaves_grid_untouched() {
        let original = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let mut grid = ProfileGrid::new(original.clone()).unwrap();
        let err = grid
            .realign(&FixedDelays(array![1.0, f64::NAN]))
            .unwrap_err();
        assert_eq!(err, AlignError::NonFiniteDelay { row: 1 });
        assert_eq!(grid.data(), original.view());
    }

    #[test]
    fn large_delays_wrap_modulo_nbin() {
        let mut grid = ProfileGrid::new(array![[1.0, 2.0, 3.0, 4.0]]).unwrap();
        grid.realign(&FixedDelays(array![4.0e12 + 1.0])).unwrap();
        assert_eq!(grid.row(0), array![4.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn interpolated_realign_conserves_row_sums() {
        let data = array![[0.0, 1.0, 5.0, 1.0, 0.0, 0.0], [2.0, 0.0, 0.0, 0.0, 1.0, 3.0]];
        let mut grid = ProfileGrid::new(data).unwrap();
        let before = grid.row_sums();
        grid.realign_interpolated(&FixedDelays(array![0.3, -2.75]))
            .unwrap();
        for (a, b) in before.iter().zip(grid.row_sums().iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}
