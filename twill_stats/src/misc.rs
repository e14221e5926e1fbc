//! Vectorized score manipulation and categorical draws
use rand::Rng;

/// Convert a row of log scores into unnormalized likelihoods in place.
///
/// Subtracts the row max from every entry then exponentiates, so the largest
/// entry maps to exactly 1 and all entries are in (0, 1]. Relative weights
/// are preserved.
///
/// # Example
///
/// ```rust
/// # use twill_stats::scores_to_likelihoods;
/// let mut row = vec![0.0, 2.0_f64.ln(), 4.0_f64.ln()];
/// scores_to_likelihoods(&mut row);
///
/// assert!((row[0] - 0.25).abs() < 1E-12);
/// assert!((row[1] - 0.50).abs() < 1E-12);
/// assert!((row[2] - 1.00).abs() < 1E-12);
/// ```
pub fn scores_to_likelihoods(scores: &mut [f64]) {
    let maxval =
        scores.iter().copied().fold(f64::NEG_INFINITY, |max, x| {
            if x > max {
                x
            } else {
                max
            }
        });
    scores.iter_mut().for_each(|x| *x = (*x - maxval).exp());
}

/// Draw an index from the categorical distribution proportional to
/// `likelihoods`, whose sum the caller supplies as `total`.
///
/// The weights need not be normalized. `total` must be positive and finite;
/// the caller is expected to have checked this.
pub fn sample_from_likelihoods<R: Rng>(
    rng: &mut R,
    likelihoods: &[f64],
    total: f64,
) -> usize {
    let u: f64 = rng.gen::<f64>() * total;
    let mut cum = 0.0;
    for (ix, &p) in likelihoods.iter().enumerate() {
        cum += p;
        if u < cum {
            return ix;
        }
    }
    // u can land past the accumulated mass through rounding; return the last
    // index with nonzero weight.
    likelihoods
        .iter()
        .rposition(|&p| p > 0.0)
        .unwrap_or(likelihoods.len() - 1)
}
