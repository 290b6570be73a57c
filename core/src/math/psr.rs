//! Delay-model arithmetic shared by the realigners: spin period/frequency
//! conversion, polynomial phase delays, cold-plasma dispersion delays and
//! circular rotation of profiles.

use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;
use std::f64::consts::PI;

use crate::ephemeris::{SpinEphemeris, SpinFrequency};
use crate::math::fft::FftHelper;

/// Dispersion constant in MHz^-2 pc cm^-3 s^-1 (delay = DM / (K * nu^2)).
pub const DM_DELAY_CONST: f64 = 0.000241;

/// Convert period, period derivative and second derivative to spin
/// frequency and its derivatives: `f = 1/p`, `fd = -pd/p^2`,
/// `fdd = 2 pd^2/p^3 - pdd/p^2`.
///
/// A second derivative of exactly zero yields a frequency second derivative
/// of exactly zero.
pub fn period_to_frequency(p: f64, pd: f64, pdd: f64) -> SpinFrequency {
    let (f, fd, fdd) = invert_with_derivatives(p, pd, pdd);
    SpinFrequency { f, fd, fdd }
}

/// Inverse of [`period_to_frequency`]; the relation is symmetric.
pub fn frequency_to_period(f: f64, fd: f64, fdd: f64) -> SpinEphemeris {
    let (p, pd, pdd) = invert_with_derivatives(f, fd, fdd);
    SpinEphemeris { p, pd, pdd }
}

fn invert_with_derivatives(x: f64, xd: f64, xdd: f64) -> (f64, f64, f64) {
    let xdd_inv = if xdd == 0.0 {
        0.0
    } else {
        2.0 * xd * xd / x.powf(3.0) - xdd / (x * x)
    };
    (1.0 / x, -xd / (x * x), xdd_inv)
}

/// Phase delay (cycles) accumulated at each epoch `t` (s) by frequency
/// offsets `df`, `dfd`, `dfdd`: `df t + dfd t^2 / 2 + dfdd t^3 / 6`.
pub fn delay_from_frequency_offsets(
    df: f64,
    dfd: f64,
    dfdd: f64,
    times: ArrayView1<f64>,
) -> Array1<f64> {
    times.mapv(|t| df * t + dfd * (t * t) / 2.0 + dfdd * t.powf(3.0) / 6.0)
}

/// Cold-plasma dispersion delay (s) of each frequency (MHz) for `dm`
/// (pc cm^-3). Non-positive frequencies get zero delay.
pub fn delay_from_dispersion_measure(dm: f64, freqs_mhz: ArrayView1<f64>) -> Array1<f64> {
    freqs_mhz.mapv(|freq| {
        if freq > 0.0 {
            dm / (DM_DELAY_CONST * freq * freq)
        } else {
            0.0
        }
    })
}

/// Circularly shift `row` so that `result[i] = row[(i + shift) mod n]`.
///
/// Positive shifts move content toward lower indices. Any sign or magnitude
/// is accepted.
pub fn circular_rotate(row: ArrayView1<f64>, shift: i64) -> Array1<f64> {
    let n = row.len();
    if n == 0 {
        return row.to_owned();
    }
    let k = shift.rem_euclid(n as i64) as usize;
    if k == 0 {
        return row.to_owned();
    }
    row.iter()
        .skip(k)
        .chain(row.iter().take(k))
        .copied()
        .collect()
}

/// Rotate `row` by a fractional number of bins in the Fourier domain, with
/// the same sign convention as [`circular_rotate`].
///
/// `fft` must be planned for `row.len()` points.
pub fn fourier_rotate(row: ArrayView1<f64>, bins: f64, fft: &mut FftHelper) -> Array1<f64> {
    let n = row.len();
    if n == 0 {
        return row.to_owned();
    }
    debug_assert_eq!(fft.len(), n);

    let samples: Vec<f64> = row.iter().copied().collect();
    let mut spectrum = fft.forward(&samples);
    let half = n / 2;
    for (k, value) in spectrum.iter_mut().enumerate() {
        if n % 2 == 0 && k == half {
            // Nyquist harmonic of a real signal: only the real part survives.
            *value = Complex64::new(value.re * (PI * bins).cos(), 0.0);
            continue;
        }
        let harmonic = if k <= half {
            k as f64
        } else {
            k as f64 - n as f64
        };
        let phase = 2.0 * PI * harmonic * bins / n as f64;
        *value *= Complex64::from_polar(1.0, phase);
    }
    Array1::from(fft.inverse_real(spectrum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn rotate_shifts_left_for_positive_bins() {
        let row = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(circular_rotate(row.view(), 1), array![2.0, 3.0, 4.0, 1.0]);
        assert_eq!(circular_rotate(row.view(), -1), array![4.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn rotate_is_modulo_row_length() {
        let row = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(circular_rotate(row.view(), 4), row);
        assert_eq!(circular_rotate(row.view(), -8), row);
        assert_eq!(circular_rotate(row.view(), 9), circular_rotate(row.view(), 1));
        assert_eq!(circular_rotate(row.view(), -7), circular_rotate(row.view(), 1));
    }

    #[test]
    fn rotate_by_negated_shift_is_inverse() {
        let row = array![0.0, 5.0, 1.0, 0.5, 2.0];
        let there = circular_rotate(row.view(), 3);
        assert_eq!(circular_rotate(there.view(), -3), row);
    }

    #[test]
    fn period_to_frequency_propagates_derivatives() {
        let freq = period_to_frequency(0.5, 1e-12, 0.0);
        assert_eq!(freq.f, 2.0);
        assert!((freq.fd - (-4e-12)).abs() < 1e-24);
        assert_eq!(freq.fdd, 0.0);

        let with_pdd = period_to_frequency(0.5, 1e-12, 1e-20);
        let expected = (2.0 * 1e-12 * 1e-12 / 0.5 - 1e-20) * 4.0;
        assert!((with_pdd.fdd - expected).abs() < 1e-32);
    }

    #[test]
    fn period_to_frequency_is_bitwise_stable() {
        let triples = [
            (1.121944461126853, 2.93868435161561e-11, 7.1e-21),
            (0.0893, 1.2484e-13, -3.3e-24),
            (0.00575745, 1.0e-20, 4.0e-30),
            (3.7454, -8.25e-12, 1.0e-22),
        ];
        for &(p, pd, pdd) in &triples {
            let freq = period_to_frequency(p, pd, pdd);
            assert_eq!(freq.f.to_bits(), (1.0 / p).to_bits());
            assert_eq!(freq.fd.to_bits(), (-pd / (p * p)).to_bits());
            let fdd = 2.0 * pd * pd / p.powf(3.0) - pdd / (p * p);
            assert_eq!(freq.fdd.to_bits(), fdd.to_bits(), "p={} pd={} pdd={}", p, pd, pdd);
        }
    }

    #[test]
    fn frequency_offsets_follow_taylor_series() {
        let times = array![0.0, 1.0, 2.0];
        let delays = delay_from_frequency_offsets(0.5, 0.25, 6.0, times.view());
        assert_eq!(delays, array![0.0, 0.5 + 0.125 + 1.0, 1.0 + 0.5 + 8.0]);
    }

    #[test]
    fn dispersion_delay_scales_inverse_square() {
        let freqs = array![100.0, 200.0, 0.0, -5.0];
        let delays = delay_from_dispersion_measure(24.1, freqs.view());
        assert!((delays[0] - 10.0).abs() < 1e-12);
        assert!((delays[1] - 2.5).abs() < 1e-12);
        assert_eq!(delays[2], 0.0);
        assert_eq!(delays[3], 0.0);
    }

    #[test]
    fn fourier_rotate_matches_integer_rotation() {
        for &n in &[7usize, 8] {
            let row: Array1<f64> = (0..n).map(|i| (i * i) as f64 % 5.0).collect();
            let mut fft = FftHelper::new(n);
            for shift in [-3i64, 0, 2, 5] {
                let exact = circular_rotate(row.view(), shift);
                let smooth = fourier_rotate(row.view(), shift as f64, &mut fft);
                for (a, b) in exact.iter().zip(smooth.iter()) {
                    assert!((a - b).abs() < 1e-9, "n={} shift={}", n, shift);
                }
            }
        }
    }

    #[test]
    fn fourier_rotate_preserves_row_sum() {
        let row = array![0.0, 1.0, 4.0, 9.0, 4.0, 1.0, 0.0, 0.0];
        let mut fft = FftHelper::new(row.len());
        let shifted = fourier_rotate(row.view(), 1.5, &mut fft);
        assert!((shifted.sum() - row.sum()).abs() < 1e-9);
    }
}
