//! CUCB: UCB restricted to arms that can still be optimal in a linear model.
//!
//! After the warm-up, the most-pulled arm `k_max` pins `θ` to a slab
//! `|f_kmax · θ − mean_kmax| ≤ sqrt(α / n_kmax · ln(t − 1))` intersected with the unit
//! ball. Arms that are not the maximizer for any `θ` in that set get index `−∞`; the
//! rest are ranked by the usual UCB index.

use rand::rngs::StdRng;

use crate::error::{config_err, Error, Result};
use crate::feasibility::competitive_arms;
use crate::learner::{argmax, ensure_horizon, ensure_kind, pull_once, warm_up_arm};
use crate::{ArmPulls, ArmRecords, ArmRewards, ArmedBandit, BanditKind, Goal, Learner};

/// Configuration for [`Cucb`].
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CucbConfig {
    /// Exploration strength (must be finite and > 0).
    pub alpha: f64,
    /// Slack on the unit-ball constraint when reading the feasibility solution.
    pub feasibility_tol: f64,
}

impl Default for CucbConfig {
    fn default() -> Self {
        Self {
            alpha: 2.0,
            feasibility_tol: 1e-6,
        }
    }
}

/// Correlated UCB over a linear bandit.
#[derive(Debug, Clone)]
pub struct Cucb {
    cfg: CucbConfig,
    horizon: u64,
    features: Vec<Vec<f64>>,
    records: ArmRecords,
    competitive: Vec<bool>,
}

impl Cucb {
    pub fn new(horizon: u64, cfg: CucbConfig) -> Result<Self> {
        ensure_horizon(horizon)?;
        if !(cfg.alpha.is_finite() && cfg.alpha > 0.0) {
            return Err(config_err(format!(
                "CUCB alpha {} should be greater than 0",
                cfg.alpha
            )));
        }
        if !(cfg.feasibility_tol.is_finite() && cfg.feasibility_tol >= 0.0) {
            return Err(config_err(format!(
                "feasibility tolerance {} must be finite and non-negative",
                cfg.feasibility_tol
            )));
        }
        Ok(Self {
            cfg,
            horizon,
            features: Vec::new(),
            records: ArmRecords::default(),
            competitive: Vec::new(),
        })
    }

    pub fn records(&self) -> &ArmRecords {
        &self.records
    }

    /// Competitive set computed by the last exploiting round (empty during warm-up).
    pub fn competitive(&self) -> &[bool] {
        &self.competitive
    }
}

impl<B: ArmedBandit> Learner<B> for Cucb {
    fn name(&self) -> &str {
        "CUCB"
    }

    fn goal(&self) -> Goal {
        Goal::MaxReward
    }

    fn init(&mut self, bandit: &B) -> Result<()> {
        ensure_kind("CUCB", bandit.kind(), &[BanditKind::Linear])?;
        let Some(features) = bandit.features() else {
            return Err(Error::IncompatibleBandit {
                learner: "CUCB".to_string(),
                bandit: bandit.kind(),
            });
        };
        self.features = features.to_vec();
        self.records = ArmRecords::new(bandit.arm_num());
        self.competitive.clear();
        Ok(())
    }

    fn reset(&mut self) {
        self.records.reset();
        self.competitive.clear();
    }

    fn actions(&mut self, _context: &(), _rng: &mut StdRng) -> Option<ArmPulls> {
        if self.records.arm_num() == 0 || self.records.rounds() >= self.horizon {
            return None;
        }
        if let Some(arm) = warm_up_arm(&self.records) {
            return Some(pull_once(arm));
        }

        let t = self.records.rounds() + 1;
        let log_t = ((t - 1) as f64).ln();
        let em_arms = self.records.em_arms();
        let pulls: Vec<f64> = em_arms.iter().map(|em| em.pulls as f64).collect();
        let k_max = argmax(&pulls);
        let kmax_arm = em_arms[k_max];
        let mu_kmax = kmax_arm.em_mean().unwrap_or(0.0);
        let radius = (self.cfg.alpha / kmax_arm.pulls as f64 * log_t).sqrt();

        self.competitive = competitive_arms(
            &self.features,
            k_max,
            mu_kmax,
            radius,
            self.cfg.feasibility_tol,
        );
        let ucb: Vec<f64> = em_arms
            .iter()
            .zip(&self.competitive)
            .map(|(em, &keep)| match (keep, em.em_mean()) {
                (false, _) => f64::NEG_INFINITY,
                (true, Some(mean)) => mean + (self.cfg.alpha / em.pulls as f64 * log_t).sqrt(),
                (true, None) => f64::INFINITY,
            })
            .collect();
        Some(pull_once(argmax(&ucb)))
    }

    fn update(&mut self, actions: &ArmPulls, feedback: &ArmRewards) -> Result<()> {
        self.records.record(actions, feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bandit, LinearBandit, OrdinaryBandit};
    use rand::SeedableRng;

    fn linear() -> LinearBandit {
        LinearBandit::new(
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
            vec![0.6, 0.2],
            Some(0.25),
        )
        .unwrap()
    }

    #[test]
    fn requires_a_linear_bandit() {
        let ordinary = OrdinaryBandit::bernoulli(&[0.2, 0.4]).unwrap();
        let mut cucb = Cucb::new(10, CucbConfig::default()).unwrap();
        assert!(matches!(
            cucb.init(&ordinary),
            Err(Error::IncompatibleBandit { .. })
        ));
        assert!(cucb.init(&linear()).is_ok());
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(Cucb::new(10, CucbConfig { alpha: -1.0, ..CucbConfig::default() }).is_err());
        assert!(Cucb::new(
            10,
            CucbConfig {
                feasibility_tol: f64::NAN,
                ..CucbConfig::default()
            }
        )
        .is_err());
    }

    #[test]
    fn runs_to_horizon_and_keeps_a_competitive_arm() {
        let mut bandit = linear();
        bandit.reset();
        let mut cucb = Cucb::new(60, CucbConfig::default()).unwrap();
        cucb.init(&bandit).unwrap();
        let mut rng = StdRng::seed_from_u64(17);
        let mut arms = Vec::new();
        while let Some(a) = Learner::<LinearBandit>::actions(&mut cucb, &(), &mut rng) {
            arms.push(a[0].0);
            let fb = bandit.feed(&a, &mut rng).unwrap();
            Learner::<LinearBandit>::update(&mut cucb, &a, &fb).unwrap();
        }
        assert_eq!(arms.len(), 60);
        assert_eq!(&arms[..3], &[0, 1, 2]);
        assert!(cucb.competitive().iter().any(|&c| c));
    }
}
