//! Upper-confidence-bound index policies: UCB(α) and MOSS.
//!
//! Both pull every arm once in index order, then play the arm with the largest index.
//! UCB's bonus grows with `ln t`; MOSS uses the horizon instead and stops exploring an
//! arm once it has been pulled `T / K` times.

use rand::rngs::StdRng;

use crate::error::{config_err, Result};
use crate::learner::{argmax, ensure_horizon, ensure_kind, pull_once, warm_up_arm};
use crate::{ArmPulls, ArmRecords, ArmRewards, ArmedBandit, BanditKind, EmArm, Goal, Learner};

/// Configuration for [`Ucb`].
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UcbConfig {
    /// Exploration strength (must be finite and > 0).
    pub alpha: f64,
}

impl Default for UcbConfig {
    fn default() -> Self {
        Self { alpha: 2.0 }
    }
}

/// UCB with index `mean_i + sqrt(α / n_i · ln t)`.
#[derive(Debug, Clone)]
pub struct Ucb {
    cfg: UcbConfig,
    horizon: u64,
    records: ArmRecords,
}

impl Ucb {
    pub fn new(horizon: u64, cfg: UcbConfig) -> Result<Self> {
        ensure_horizon(horizon)?;
        if !(cfg.alpha.is_finite() && cfg.alpha > 0.0) {
            return Err(config_err(format!(
                "UCB alpha {} should be greater than 0",
                cfg.alpha
            )));
        }
        Ok(Self {
            cfg,
            horizon,
            records: ArmRecords::default(),
        })
    }

    pub fn records(&self) -> &ArmRecords {
        &self.records
    }

    fn upper_confidence_bound(&self, em: &EmArm, t: u64) -> f64 {
        let Some(mean) = em.em_mean() else {
            return f64::INFINITY;
        };
        mean + (self.cfg.alpha / em.pulls as f64 * (t as f64).ln()).sqrt()
    }
}

impl<B: ArmedBandit> Learner<B> for Ucb {
    fn name(&self) -> &str {
        "UCB"
    }

    fn goal(&self) -> Goal {
        Goal::MaxReward
    }

    fn init(&mut self, bandit: &B) -> Result<()> {
        ensure_kind("UCB", bandit.kind(), &[BanditKind::Ordinary, BanditKind::Linear])?;
        self.records = ArmRecords::new(bandit.arm_num());
        Ok(())
    }

    fn reset(&mut self) {
        self.records.reset();
    }

    fn actions(&mut self, _context: &(), _rng: &mut StdRng) -> Option<ArmPulls> {
        if self.records.arm_num() == 0 || self.records.rounds() >= self.horizon {
            return None;
        }
        if let Some(arm) = warm_up_arm(&self.records) {
            return Some(pull_once(arm));
        }
        let t = self.records.rounds() + 1;
        let ucb: Vec<f64> = self
            .records
            .em_arms()
            .iter()
            .map(|em| self.upper_confidence_bound(em, t))
            .collect();
        Some(pull_once(argmax(&ucb)))
    }

    fn update(&mut self, actions: &ArmPulls, feedback: &ArmRewards) -> Result<()> {
        self.records.record(actions, feedback)
    }
}

/// MOSS with index `mean_i + sqrt(max(0, ln(T / (K n_i))) / n_i)`.
#[derive(Debug, Clone)]
pub struct Moss {
    horizon: u64,
    records: ArmRecords,
}

impl Moss {
    pub fn new(horizon: u64) -> Result<Self> {
        ensure_horizon(horizon)?;
        Ok(Self {
            horizon,
            records: ArmRecords::default(),
        })
    }

    pub fn records(&self) -> &ArmRecords {
        &self.records
    }

    fn upper_confidence_bound(&self, em: &EmArm) -> f64 {
        let Some(mean) = em.em_mean() else {
            return f64::INFINITY;
        };
        let n = em.pulls as f64;
        let k = self.records.arm_num() as f64;
        let bonus = (self.horizon as f64 / (k * n)).ln().max(0.0);
        mean + (bonus / n).sqrt()
    }
}

impl<B: ArmedBandit> Learner<B> for Moss {
    fn name(&self) -> &str {
        "MOSS"
    }

    fn goal(&self) -> Goal {
        Goal::MaxReward
    }

    fn init(&mut self, bandit: &B) -> Result<()> {
        ensure_kind("MOSS", bandit.kind(), &[BanditKind::Ordinary, BanditKind::Linear])?;
        self.records = ArmRecords::new(bandit.arm_num());
        Ok(())
    }

    fn reset(&mut self) {
        self.records.reset();
    }

    fn actions(&mut self, _context: &(), _rng: &mut StdRng) -> Option<ArmPulls> {
        if self.records.arm_num() == 0 || self.records.rounds() >= self.horizon {
            return None;
        }
        if let Some(arm) = warm_up_arm(&self.records) {
            return Some(pull_once(arm));
        }
        let ucb: Vec<f64> = self
            .records
            .em_arms()
            .iter()
            .map(|em| self.upper_confidence_bound(em))
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
    use crate::bandit::Bandit;
    use crate::OrdinaryBandit;
    use rand::SeedableRng;

    fn drive<L: Learner<OrdinaryBandit>>(learner: &mut L, bandit: &mut OrdinaryBandit) -> Vec<usize> {
        let mut rng = StdRng::seed_from_u64(5);
        bandit.reset();
        learner.init(bandit).unwrap();
        let mut arms = Vec::new();
        while let Some(a) = learner.actions(&(), &mut rng) {
            arms.push(a[0].0);
            let fb = crate::Bandit::feed(bandit, &a, &mut rng).unwrap();
            learner.update(&a, &fb).unwrap();
        }
        arms
    }

    #[test]
    fn ucb_rejects_non_positive_alpha() {
        assert!(Ucb::new(10, UcbConfig { alpha: 0.0 }).is_err());
        assert!(Ucb::new(10, UcbConfig { alpha: f64::NAN }).is_err());
        assert!(Ucb::new(0, UcbConfig::default()).is_err());
    }

    #[test]
    fn warm_up_pulls_each_arm_once_in_order() {
        let mut bandit = OrdinaryBandit::bernoulli(&[0.2, 0.4, 0.6, 0.8]).unwrap();
        let mut ucb = Ucb::new(50, UcbConfig::default()).unwrap();
        assert_eq!(&drive(&mut ucb, &mut bandit)[..4], &[0, 1, 2, 3]);
        let mut moss = Moss::new(50).unwrap();
        assert_eq!(&drive(&mut moss, &mut bandit)[..4], &[0, 1, 2, 3]);
    }

    #[test]
    fn stops_at_horizon() {
        let mut bandit = OrdinaryBandit::bernoulli(&[0.2, 0.8]).unwrap();
        let mut ucb = Ucb::new(37, UcbConfig::default()).unwrap();
        assert_eq!(drive(&mut ucb, &mut bandit).len(), 37);
        assert_eq!(bandit.total_pulls(), 37);
    }

    #[test]
    fn ucb_concentrates_on_the_best_arm() {
        let mut bandit = OrdinaryBandit::bernoulli(&[0.1, 0.9]).unwrap();
        let mut ucb = Ucb::new(2_000, UcbConfig::default()).unwrap();
        let arms = drive(&mut ucb, &mut bandit);
        let best = arms.iter().filter(|&&a| a == 1).count();
        assert!(best > 1_800, "best={best}");
    }

    #[test]
    fn moss_index_has_no_bonus_past_horizon_share() {
        let mut moss = Moss::new(100).unwrap();
        moss.records = ArmRecords::new(2);
        let em = EmArm {
            pulls: 60,
            rewards: 30.0,
        };
        // ln(100 / (2 * 60)) < 0, clipped to zero.
        assert_eq!(moss.upper_confidence_bound(&em), 0.5);
    }
}
