//! Ordinary MNL (multinomial-logit) bandit.
//!
//! Products are numbered from 1; index 0 is the no-purchase option, whose abstraction
//! parameter is fixed to 1. Offering assortment `S` leads to a purchase of `i ∈ S`
//! with probability `v_i / (1 + Σ_{j∈S} v_j)`, and to no purchase otherwise.

use rand::rngs::StdRng;
use rand::Rng;

use crate::error::{action_err, config_err, Error, Result};
use crate::{search_best_assortment, Bandit, BanditKind, Goal};

/// Outcome of offering one assortment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MnlFeedback {
    /// Revenue earned this round (0 on no purchase).
    pub revenue: f64,
    /// Purchased product, or 0 for no purchase.
    pub purchase: usize,
}

/// MNL assortment bandit.
#[derive(Debug, Clone)]
pub struct MnlBandit {
    name: String,
    // Index 0 is the no-purchase option.
    abspar: Vec<f64>,
    revenues: Vec<f64>,
    card_limit: Option<usize>,
    best_revenue: f64,
    best_assortment: Vec<usize>,

    rounds: u64,
    max_revenue: f64,
    revenue: f64,
}

impl MnlBandit {
    /// Build from per-product abstraction parameters (in `[0, 1]`), revenues (`≥ 0`)
    /// and an optional cardinality limit on every assortment.
    pub fn new(abspar: Vec<f64>, revenues: Vec<f64>, card_limit: Option<usize>) -> Result<Self> {
        if abspar.is_empty() {
            return Err(config_err("at least one product is required"));
        }
        if abspar.len() != revenues.len() {
            return Err(config_err(format!(
                "{} abstraction parameters but {} revenues",
                abspar.len(),
                revenues.len()
            )));
        }
        if let Some(v) = abspar.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(config_err(format!(
                "abstraction parameter {v} is outside [0, 1]"
            )));
        }
        if let Some(r) = revenues.iter().find(|r| !(r.is_finite() && **r >= 0.0)) {
            return Err(config_err(format!("product revenue {r} must be at least 0")));
        }
        if card_limit == Some(0) {
            return Err(config_err("cardinality limit must be at least 1"));
        }

        let abspar: Vec<f64> = std::iter::once(1.0).chain(abspar).collect();
        let revenues: Vec<f64> = std::iter::once(0.0).chain(revenues).collect();
        let (best_revenue, best_assortment) =
            search_best_assortment(&abspar, &revenues, card_limit)?;
        tracing::info!(
            products = abspar.len() - 1,
            ?best_assortment,
            best_revenue,
            "mnl bandit ready"
        );
        Ok(Self {
            name: "ordinary_mnl_bandit".to_string(),
            abspar,
            revenues,
            card_limit,
            best_revenue,
            best_assortment,
            rounds: 0,
            max_revenue: 0.0,
            revenue: 0.0,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of products (excluding no-purchase).
    pub fn product_num(&self) -> usize {
        self.abspar.len() - 1
    }

    pub fn card_limit(&self) -> Option<usize> {
        self.card_limit
    }

    pub fn best_assortment(&self) -> &[usize] {
        &self.best_assortment
    }

    pub fn best_revenue(&self) -> f64 {
        self.best_revenue
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    fn validate(&self, assortment: &[usize]) -> Result<Vec<usize>> {
        if assortment.is_empty() {
            return Err(action_err("empty assortment"));
        }
        let mut products = assortment.to_vec();
        products.sort_unstable();
        products.dedup();
        let n = self.product_num();
        if let Some(&p) = products.iter().find(|&&p| p < 1 || p > n) {
            return Err(action_err(format!(
                "product index {p} is outside [1, {n}]"
            )));
        }
        if let Some(k) = self.card_limit {
            if products.len() > k {
                return Err(action_err(format!(
                    "assortment has {} products, more than {k}",
                    products.len()
                )));
            }
        }
        Ok(products)
    }
}

impl Bandit for MnlBandit {
    /// Revenues indexed like products (index 0 is the no-purchase option).
    type Context = Vec<f64>;
    type Action = Vec<usize>;
    type Feedback = MnlFeedback;

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BanditKind {
        BanditKind::Mnl
    }

    fn reset(&mut self) {
        self.rounds = 0;
        self.max_revenue = 0.0;
        self.revenue = 0.0;
    }

    fn context(&self) -> Vec<f64> {
        self.revenues.clone()
    }

    fn feed(&mut self, assortment: &Vec<usize>, rng: &mut StdRng) -> Result<MnlFeedback> {
        let products = self.validate(assortment)?;

        let denom: f64 = self.abspar[0] + products.iter().map(|&p| self.abspar[p]).sum::<f64>();
        let r: f64 = rng.random::<f64>() * denom;
        let mut cdf = self.abspar[0];
        let mut purchase = 0;
        if r >= cdf {
            // Numerical fallback: the last offered product.
            purchase = products[products.len() - 1];
            for &p in &products {
                cdf += self.abspar[p];
                if r < cdf {
                    purchase = p;
                    break;
                }
            }
        }

        let feedback = MnlFeedback {
            revenue: self.revenues[purchase],
            purchase,
        };
        self.rounds += 1;
        self.max_revenue += self.best_revenue;
        self.revenue += feedback.revenue;
        Ok(feedback)
    }

    fn regret(&self, goal: &Goal) -> Result<f64> {
        match goal {
            Goal::MaxReward => Ok(self.max_revenue - self.revenue),
            Goal::BestArmId(_) => Err(Error::UnsupportedGoal(format!(
                "{} cannot evaluate best arm identification",
                self.name
            ))),
        }
    }

    fn action_count(&self, _assortment: &Vec<usize>) -> u64 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn bandit() -> MnlBandit {
        MnlBandit::new(vec![0.8, 0.3, 0.5], vec![10.0, 5.0, 3.0], Some(2)).unwrap()
    }

    #[test]
    fn rejects_malformed_parameters() {
        assert!(MnlBandit::new(vec![1.2], vec![1.0], None).is_err());
        assert!(MnlBandit::new(vec![0.5], vec![-1.0], None).is_err());
        assert!(MnlBandit::new(vec![0.5, 0.2], vec![1.0], None).is_err());
        assert!(MnlBandit::new(vec![], vec![], None).is_err());
        assert!(MnlBandit::new(vec![0.5], vec![1.0], Some(0)).is_err());
    }

    #[test]
    fn context_exposes_revenues_with_no_purchase_slot() {
        assert_eq!(bandit().context(), vec![0.0, 10.0, 5.0, 3.0]);
    }

    #[test]
    fn invalid_assortments_are_rejected() {
        let mut b = bandit();
        b.reset();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(b.feed(&vec![], &mut rng), Err(Error::InvalidAction(_))));
        assert!(b.feed(&vec![0], &mut rng).is_err());
        assert!(b.feed(&vec![4], &mut rng).is_err());
        assert!(b.feed(&vec![1, 2, 3], &mut rng).is_err());
        assert_eq!(b.rounds(), 0);
    }

    #[test]
    fn duplicates_are_removed_before_the_cardinality_check() {
        let mut b = bandit();
        b.reset();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(b.feed(&vec![1, 1, 2, 2], &mut rng).is_ok());
    }

    #[test]
    fn purchase_frequencies_follow_mnl_probabilities() {
        let mut b = bandit();
        b.reset();
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0u32; 4];
        let n = 40_000;
        for _ in 0..n {
            let fb = b.feed(&vec![1, 2], &mut rng).unwrap();
            counts[fb.purchase] += 1;
            assert!(fb.purchase == 0 || fb.purchase == 1 || fb.purchase == 2);
        }
        let denom = 1.0 + 0.8 + 0.3;
        let p0 = counts[0] as f64 / n as f64;
        let p1 = counts[1] as f64 / n as f64;
        assert!((p0 - 1.0 / denom).abs() < 0.01, "p0={p0}");
        assert!((p1 - 0.8 / denom).abs() < 0.01, "p1={p1}");
        assert_eq!(counts[3], 0);
    }

    #[test]
    fn regret_tracks_best_revenue_minus_earned() {
        let mut b = bandit();
        b.reset();
        let mut rng = StdRng::seed_from_u64(9);
        let mut earned = 0.0;
        for _ in 0..100 {
            earned += b.feed(&vec![3], &mut rng).unwrap().revenue;
        }
        let expected = 100.0 * b.best_revenue() - earned;
        assert!((b.regret(&Goal::MaxReward).unwrap() - expected).abs() < 1e-9);
        assert!(matches!(
            b.regret(&Goal::BestArmId(1)),
            Err(Error::UnsupportedGoal(_))
        ));
    }
}
