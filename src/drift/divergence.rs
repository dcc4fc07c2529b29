//! Divergence measures between binned distributions.

use super::binning::Histogram;

/// Population Stability Index of `current` against `baseline`.
///
/// `PSI = Σ (c_i - b_i) · ln(c_i / b_i)` over bin fractions floored at
/// `epsilon`. Every term is non-negative, so the sum is too. Over a fixed
/// set of bins the formula is symmetric; feature-level PSI is not, because
/// the bins come from the baseline side.
///
/// | PSI | Interpretation |
/// |-----|----------------|
/// | < 0.1 | no significant shift |
/// | 0.1 - 0.25 | moderate shift |
/// | > 0.25 | significant shift |
pub fn population_stability_index(baseline: &Histogram, current: &Histogram, epsilon: f64) -> f64 {
    debug_assert_eq!(baseline.len(), current.len());

    baseline
        .fractions()
        .into_iter()
        .zip(current.fractions())
        .map(|(b, c)| {
            let b = b.max(epsilon);
            let c = c.max(epsilon);
            (c - b) * (c / b).ln()
        })
        .sum()
}

/// Jensen-Shannon divergence between two histograms, in bits.
///
/// `JSD = 0.5 · KL(P‖M) + 0.5 · KL(Q‖M)` with `M = (P + Q) / 2`. Empty
/// bins contribute nothing. The result lies in `[0, 1]` and is symmetric.
pub fn jensen_shannon_divergence(p: &Histogram, q: &Histogram) -> f64 {
    debug_assert_eq!(p.len(), q.len());

    let p = p.fractions();
    let q = q.fractions();
    let m: Vec<f64> = p
        .iter()
        .zip(&q)
        .map(|(pi, qi)| 0.5 * (pi + qi))
        .collect();

    let jsd = 0.5 * kl_divergence_bits(&p, &m) + 0.5 * kl_divergence_bits(&q, &m);
    jsd.clamp(0.0, 1.0)
}

/// KL(P‖M) in bits, with `0 · log(0 / m) = 0`.
fn kl_divergence_bits(p: &[f64], m: &[f64]) -> f64 {
    p.iter()
        .zip(m)
        .map(|(&pi, &mi)| if pi > 0.0 { pi * (pi / mi).log2() } else { 0.0 })
        .sum()
}
