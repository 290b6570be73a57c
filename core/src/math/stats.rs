use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

pub struct StatsHelper;

impl StatsHelper {
    /// Total intensity of each row.
    pub fn row_sums(grid: ArrayView2<f64>) -> Array1<f64> {
        grid.sum_axis(Axis(1))
    }

    /// Profile obtained by summing all rows bin by bin.
    pub fn summed_profile(grid: ArrayView2<f64>) -> Array1<f64> {
        grid.sum_axis(Axis(0))
    }

    /// Index of the brightest bin; the first one wins on ties. `None` for an
    /// empty profile.
    pub fn peak_bin(profile: ArrayView1<f64>) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, &value) in profile.iter().enumerate() {
            match best {
                Some((_, top)) if value <= top => {}
                _ => best = Some((idx, value)),
            }
        }
        best.map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn sums_along_each_axis() {
        let grid = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        assert_eq!(StatsHelper::row_sums(grid.view()), array![6.0, 15.0]);
        assert_eq!(StatsHelper::summed_profile(grid.view()), array![5.0, 7.0, 9.0]);
    }

    #[test]
    fn peak_bin_prefers_first_maximum() {
        assert_eq!(StatsHelper::peak_bin(array![0.0, 3.0, 1.0, 3.0].view()), Some(1));
        assert_eq!(StatsHelper::peak_bin(Array1::<f64>::zeros(0).view()), None);
    }
}
