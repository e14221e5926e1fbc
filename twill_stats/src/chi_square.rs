//! Chi-squared goodness-of-fit test
use special::Gamma;

/// Upper-tail probability of a chi-square variate with `df` degrees of
/// freedom.
fn chi_square_sf(stat: f64, df: f64) -> f64 {
    if stat <= 0.0 {
        1.0
    } else {
        1.0 - (stat / 2.0).inc_gamma(df / 2.0)
    }
}

/// Chi-square goodness of fit test comparing the observed (sample)
/// frequencies in `freq_obs` with the expected (true) frequencies,
/// `freq_exp`. Returns the test statistic and its p-value.
///
/// # Panics
/// Panics if the frequency slices differ in length.
pub fn chi_square_test(freq_obs: &[f64], freq_exp: &[f64]) -> (f64, f64) {
    assert_eq!(freq_obs.len(), freq_exp.len());

    let stat: f64 = freq_obs
        .iter()
        .zip(freq_exp.iter())
        .map(|(o, e)| (o - e).powi(2) / e)
        .sum();

    let df = (freq_obs.len() - 1) as f64;
    (stat, chi_square_sf(stat, df))
}
