use std::f64::consts::LN_2;

/// Wrapped Gaussian pulse sampled at `nbin` phase bins.
///
/// `center` is in rotational phase (any real value, wrapped into [0, 1)),
/// `duty` is the full width at half maximum as a fraction of a turn.
pub fn gaussian_profile(nbin: usize, center: f64, duty: f64) -> Vec<f64> {
    let sigma = duty / (2.0 * (2.0 * LN_2).sqrt());
    (0..nbin)
        .map(|i| {
            let phase = i as f64 / nbin as f64;
            let offset = (phase - center + 0.5).rem_euclid(1.0) - 0.5;
            (-(offset * offset) / (2.0 * sigma * sigma)).exp()
        })
        .collect()
}
