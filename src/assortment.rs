//! Best-assortment search under the multinomial-logit choice model.
//!
//! Index 0 of `weights`/`revenues` is the no-purchase option (its revenue is ignored);
//! products are `1..weights.len()`. The expected revenue of assortment `S` is
//!
//! ```text
//!   R(S) = Σ_{i∈S} w_i r_i / (w_0 + Σ_{i∈S} w_i)
//! ```
//!
//! Without a cardinality bound the optimum is a revenue-ordered prefix. With a bound
//! `K` that is no longer true, so the search runs Dinkelbach iterations: for the
//! current value `λ`, the best `|S| ≤ K` under `Σ w_i (r_i − λ)` is the top-`K`
//! positive scores; its revenue becomes the next `λ`. The sequence strictly increases
//! and stops at the exact optimum after finitely many steps.

use crate::error::{config_err, Result};

/// Expected revenue of `assortment` (product indices, no-purchase excluded).
pub fn expected_revenue(weights: &[f64], revenues: &[f64], assortment: &[usize]) -> f64 {
    let mut num = 0.0;
    let mut denom = weights.first().copied().unwrap_or(1.0);
    for &i in assortment {
        num += weights[i] * revenues[i];
        denom += weights[i];
    }
    if denom > 0.0 {
        num / denom
    } else {
        0.0
    }
}

/// Find the assortment with maximal expected revenue subject to `|S| ≤ card_limit`
/// (`None` means unbounded). Returns `(revenue, assortment)` with the assortment in
/// ascending index order.
///
/// When no product carries positive `w_i · r_i`, every assortment earns zero; the
/// single most attractive product is returned so that callers always get an offer.
pub fn search_best_assortment(
    weights: &[f64],
    revenues: &[f64],
    card_limit: Option<usize>,
) -> Result<(f64, Vec<usize>)> {
    if weights.len() != revenues.len() {
        return Err(config_err(format!(
            "{} weights but {} revenues",
            weights.len(),
            revenues.len()
        )));
    }
    if weights.len() < 2 {
        return Err(config_err("at least one product is required"));
    }
    if card_limit == Some(0) {
        return Err(config_err("cardinality limit must be at least 1"));
    }
    if weights.iter().chain(revenues).any(|v| !v.is_finite()) {
        return Err(config_err("weights and revenues must be finite"));
    }

    let products = weights.len() - 1;
    let k = card_limit.unwrap_or(products).min(products);

    let mut lambda = 0.0;
    let mut best: Vec<usize> = Vec::new();
    // Each accepted step strictly increases lambda over a finite set of assortments.
    loop {
        let mut scored: Vec<(f64, usize)> = (1..=products)
            .map(|i| (weights[i] * (revenues[i] - lambda), i))
            .filter(|&(s, _)| s > 0.0)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.truncate(k);
        if scored.is_empty() {
            break;
        }
        let mut candidate: Vec<usize> = scored.into_iter().map(|(_, i)| i).collect();
        candidate.sort_unstable();
        let value = expected_revenue(weights, revenues, &candidate);
        if value <= lambda {
            break;
        }
        lambda = value;
        best = candidate;
    }

    if best.is_empty() {
        let mut top = 1;
        for i in 2..=products {
            if weights[i] > weights[top] {
                top = i;
            }
        }
        return Ok((0.0, vec![top]));
    }
    Ok((lambda, best))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn brute_force(weights: &[f64], revenues: &[f64], k: usize) -> f64 {
        let n = weights.len() - 1;
        let mut best = 0.0f64;
        for mask in 1u32..(1u32 << n) {
            if mask.count_ones() as usize > k {
                continue;
            }
            let s: Vec<usize> = (0..n).filter(|b| mask & (1 << b) != 0).map(|b| b + 1).collect();
            best = best.max(expected_revenue(weights, revenues, &s));
        }
        best
    }

    #[test]
    fn small_instance_matches_enumeration() {
        let w = [1.0, 0.8, 0.3];
        let r = [0.0, 10.0, 5.0];
        let (value, assort) = search_best_assortment(&w, &r, Some(2)).unwrap();
        assert_eq!(assort, vec![1, 2]);
        assert!((value - 9.5 / 2.1).abs() < 1e-12);
        assert!((value - brute_force(&w, &r, 2)).abs() < 1e-12);
    }

    #[test]
    fn cardinality_bound_can_beat_revenue_order() {
        // The highest-revenue product barely sells; with K=1 the revenue-ordered
        // prefix {1} is far from optimal.
        let w = [1.0, 0.01, 1.0, 1.0];
        let r = [0.0, 10.0, 9.0, 8.9];
        let (value, assort) = search_best_assortment(&w, &r, Some(1)).unwrap();
        assert_eq!(assort, vec![2]);
        assert!((value - 4.5).abs() < 1e-12);
    }

    #[test]
    fn zero_revenue_falls_back_to_most_attractive_product() {
        let (value, assort) =
            search_best_assortment(&[1.0, 0.2, 0.9, 0.5], &[0.0, 0.0, 0.0, 0.0], None).unwrap();
        assert_eq!(value, 0.0);
        assert_eq!(assort, vec![2]);
    }

    #[test]
    fn rejects_malformed_inputs() {
        assert!(search_best_assortment(&[1.0, 0.5], &[0.0], None).is_err());
        assert!(search_best_assortment(&[1.0], &[0.0], None).is_err());
        assert!(search_best_assortment(&[1.0, 0.5], &[0.0, 1.0], Some(0)).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

        #[test]
        fn matches_brute_force_enumeration(
            items in proptest::collection::vec((0.0f64..1.0, 0.0f64..20.0), 1..8),
            k in 1usize..8,
        ) {
            let mut w = vec![1.0];
            let mut r = vec![0.0];
            for (wi, ri) in items {
                w.push(wi);
                r.push(ri);
            }
            let (value, assort) = search_best_assortment(&w, &r, Some(k)).unwrap();
            prop_assert!(assort.len() <= k);
            prop_assert!(assort.iter().all(|&i| i >= 1 && i < w.len()));
            prop_assert!((value - expected_revenue(&w, &r, &assort)).abs() < 1e-9);
            let bf = brute_force(&w, &r, k);
            prop_assert!((value - bf).abs() < 1e-9, "value={} brute={}", value, bf);
        }
    }
}
