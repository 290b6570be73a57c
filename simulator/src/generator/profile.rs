use anyhow::{ensure, Context};
use foldalign::math::psr::{delay_from_dispersion_measure, delay_from_frequency_offsets};
use foldalign::realign::SpinDelay;
use ndarray::{Array1, Array2};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::generator::template::gaussian_profile;
use crate::workflow::config::SimulationConfig;

/// Phase at which the injected pulse sits once the grid is aligned.
pub const ALIGNED_PHASE: f64 = 0.5;

fn check_shape(rows: usize, nbin: usize, what: &str) -> anyhow::Result<()> {
    ensure!(rows > 0, "{} needs at least one row", what);
    ensure!(nbin > 0, "{} needs at least one phase bin", what);
    rows.checked_mul(nbin)
        .with_context(|| format!("overflow computing {} size", what))?;
    Ok(())
}

fn check_pulse(config: &SimulationConfig) -> anyhow::Result<()> {
    ensure!(
        config.duty > 0.0 && config.duty.is_finite(),
        "pulse duty cycle must be positive, got {}",
        config.duty
    );
    Ok(())
}

fn fill_rows(centers: &Array1<f64>, config: &SimulationConfig, rng: &mut StdRng) -> Array2<f64> {
    let nbin = config.nbin;
    let mut grid = Array2::zeros((centers.len(), nbin));
    for (mut row, &center) in grid.rows_mut().into_iter().zip(centers.iter()) {
        let pulse = gaussian_profile(nbin, center, config.duty);
        for (cell, value) in row.iter_mut().zip(pulse) {
            let jitter = if config.noise > 0.0 {
                rng.gen_range(-config.noise..config.noise)
            } else {
                0.0
            };
            *cell = 1.0 + value + jitter;
        }
    }
    grid
}

/// Sub-integration by phase grid folded at the trial ephemeris: the pulse
/// drifts by the phase the frequency error accumulates since the first
/// sub-integration.
pub fn build_time_vs_phase(config: &SimulationConfig) -> anyhow::Result<Array2<f64>> {
    check_shape(config.nsubint, config.nbin, "time-vs-phase grid")?;
    check_pulse(config)?;
    let epochs = Array1::from(config.start_secs());
    let model = SpinDelay::new(config.trial_ephemeris(), config.true_ephemeris(), epochs.view());
    let (df, dfd, dfdd) = model.frequency_offsets();
    let drift = delay_from_frequency_offsets(df, dfd, dfdd, epochs.view());
    let centers = drift.mapv(|cycles| ALIGNED_PHASE - cycles);

    let mut rng = StdRng::seed_from_u64(config.seed);
    Ok(fill_rows(&centers, config, &mut rng))
}

/// Channel by phase grid dedispersed at the trial DM; channels lag the
/// highest one by their residual dispersion delay.
pub fn build_freq_vs_phase(config: &SimulationConfig) -> anyhow::Result<Array2<f64>> {
    check_shape(config.nchan, config.nbin, "frequency-vs-phase grid")?;
    check_pulse(config)?;
    let freqs = Array1::from(config.subfreqs());
    let delays = delay_from_dispersion_measure(config.true_dm - config.dm, freqs.view());
    let pivot = delays.iter().next_back().copied().unwrap_or(0.0);
    let centers = delays.mapv(|delay| ALIGNED_PHASE - (delay - pivot) / config.period);

    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
    Ok(fill_rows(&centers, config, &mut rng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_expected_shapes() {
        let config = SimulationConfig::from_args(6, 5, 48, 3);
        assert_eq!(build_time_vs_phase(&config).unwrap().dim(), (6, 48));
        assert_eq!(build_freq_vs_phase(&config).unwrap().dim(), (5, 48));
    }

    #[test]
    fn generator_is_deterministic_for_seed() {
        let config = SimulationConfig::from_args(4, 4, 32, 11);
        assert_eq!(
            build_time_vs_phase(&config).unwrap(),
            build_time_vs_phase(&config).unwrap()
        );
    }

    #[test]
    fn noiseless_rows_at_true_model_are_aligned() {
        let config = SimulationConfig {
            nsubint: 3,
            nchan: 3,
            nbin: 20,
            noise: 0.0,
            true_period: 0.25,
            true_dm: 0.0,
            ..Default::default()
        };
        let tvph = build_time_vs_phase(&config).unwrap();
        let fvph = build_freq_vs_phase(&config).unwrap();
        for grid in [tvph, fvph] {
            for row in grid.rows() {
                assert!((row[10] - 2.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn non_positive_duty_is_an_error() {
        for duty in [0.0, -0.1, f64::NAN] {
            let config = SimulationConfig {
                duty,
                ..SimulationConfig::from_args(4, 4, 32, 0)
            };
            assert!(build_time_vs_phase(&config).is_err());
            assert!(build_freq_vs_phase(&config).is_err());
        }
    }

    #[test]
    fn empty_grid_is_an_error() {
        let config = SimulationConfig::from_args(0, 4, 32, 0);
        assert!(build_time_vs_phase(&config).is_err());
    }
}
