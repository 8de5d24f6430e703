//! Fixed-confidence best-arm identification.
//!
//! Both learners run until their own stopping rule fires and then declare an arm that
//! is the best one with probability at least `1 − fail_prob` (under the usual
//! sub-Gaussian assumptions on rewards in `[0, 1]`).
//!
//! On an instance where the top two arms have equal means successive elimination never
//! separates them; [`SuccessiveEliminationConfig::max_rounds`] bounds such runs and
//! declares the empirical leader when reached.

use rand::rngs::StdRng;

use crate::error::{config_err, Result};
use crate::learner::{argmax, ensure_fail_prob, ensure_kind, pull_once, warm_up_arm};
use crate::{
    ArmPulls, ArmRecords, ArmRewards, ArmedBandit, BanditKind, BestArmIdentifier, Goal, Learner,
};

/// Configuration for [`SuccessiveElimination`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SuccessiveEliminationConfig {
    /// Stop after this many rounds even if several arms survive. `None` runs until a
    /// single arm is left.
    pub max_rounds: Option<u64>,
}

/// Successive elimination.
///
/// Every round pulls each surviving arm once. After `r` rounds all survivors share the
/// radius `sqrt(ln(4 K r² / δ) / (2 r))`; an arm is eliminated once its upper bound
/// drops below the leader's lower bound.
#[derive(Debug, Clone)]
pub struct SuccessiveElimination {
    cfg: SuccessiveEliminationConfig,
    fail_prob: f64,
    records: ArmRecords,
    active: Vec<usize>,
}

impl SuccessiveElimination {
    pub fn new(fail_prob: f64, cfg: SuccessiveEliminationConfig) -> Result<Self> {
        ensure_fail_prob(fail_prob)?;
        if cfg.max_rounds == Some(0) {
            return Err(config_err("successive elimination round cap must be positive"));
        }
        Ok(Self {
            cfg,
            fail_prob,
            records: ArmRecords::default(),
            active: Vec::new(),
        })
    }

    pub fn records(&self) -> &ArmRecords {
        &self.records
    }

    /// Arms not yet eliminated, in index order.
    pub fn active_arms(&self) -> &[usize] {
        &self.active
    }

    fn radius(&self) -> f64 {
        let k = self.records.arm_num() as f64;
        let r = self.records.rounds() as f64;
        ((4.0 * k * r * r / self.fail_prob).ln() / (2.0 * r)).sqrt()
    }

    fn eliminate(&mut self) {
        let means = self.records.em_means();
        let radius = self.radius();
        let Some(leader_mean) = self
            .active
            .iter()
            .map(|&i| means[i])
            .max_by(|a, b| a.total_cmp(b))
        else {
            return;
        };
        let lcb = leader_mean - radius;
        let before = self.active.len();
        self.active.retain(|&i| means[i] + radius >= lcb);
        if self.active.len() < before {
            tracing::debug!(
                round = self.records.rounds(),
                radius,
                active = ?self.active,
                "successive elimination dropped arms"
            );
        }
        if self.active.len() == 1 {
            tracing::debug!(
                round = self.records.rounds(),
                best_arm = self.active[0],
                "successive elimination finished"
            );
        }
    }
}

impl BestArmIdentifier for SuccessiveElimination {
    fn best_arm(&self) -> usize {
        let means = self.records.em_means();
        let scores: Vec<f64> = self.active.iter().map(|&i| means[i]).collect();
        self.active.get(argmax(&scores)).copied().unwrap_or(0)
    }
}

impl<B: ArmedBandit> Learner<B> for SuccessiveElimination {
    fn name(&self) -> &str {
        "Successive Elimination"
    }

    fn goal(&self) -> Goal {
        Goal::BestArmId(self.best_arm())
    }

    fn init(&mut self, bandit: &B) -> Result<()> {
        ensure_kind(
            "Successive Elimination",
            bandit.kind(),
            &[BanditKind::Ordinary, BanditKind::Linear],
        )?;
        self.records = ArmRecords::new(bandit.arm_num());
        <Self as Learner<B>>::reset(self);
        Ok(())
    }

    fn reset(&mut self) {
        self.records.reset();
        self.active = (0..self.records.arm_num()).collect();
    }

    fn actions(&mut self, _context: &(), _rng: &mut StdRng) -> Option<ArmPulls> {
        if self.active.len() <= 1 {
            return None;
        }
        if self
            .cfg
            .max_rounds
            .is_some_and(|cap| self.records.rounds() >= cap)
        {
            tracing::debug!(
                round = self.records.rounds(),
                active = ?self.active,
                "successive elimination hit its round cap"
            );
            return None;
        }
        Some(self.active.iter().map(|&i| (i, 1)).collect())
    }

    fn update(&mut self, actions: &ArmPulls, feedback: &ArmRewards) -> Result<()> {
        self.records.record(actions, feedback)?;
        self.eliminate();
        Ok(())
    }
}

/// Configuration for [`LilUcbHeuristic`].
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LilUcbConfig {
    /// Slack in the law-of-the-iterated-logarithm bound (`≥ 0`).
    pub epsilon: f64,
    /// Confidence inflation (`≥ 0`).
    pub beta: f64,
    /// Sub-Gaussian variance proxy of the rewards.
    pub sigma_sq: f64,
}

impl Default for LilUcbConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            beta: 1.0,
            sigma_sq: 0.25,
        }
    }
}

/// lil'UCB with the heuristic stopping rule: stop once some arm has been pulled at
/// least `1 + a Σ_{j≠i} n_j` times, with `a = 1 + 10 / K`, and declare it.
#[derive(Debug, Clone)]
pub struct LilUcbHeuristic {
    cfg: LilUcbConfig,
    fail_prob: f64,
    records: ArmRecords,
    declared: Option<usize>,
}

impl LilUcbHeuristic {
    pub fn new(fail_prob: f64, cfg: LilUcbConfig) -> Result<Self> {
        ensure_fail_prob(fail_prob)?;
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if !(valid(cfg.epsilon) && valid(cfg.beta)) {
            return Err(config_err("lil'UCB epsilon and beta must be finite and non-negative"));
        }
        if !(cfg.sigma_sq.is_finite() && cfg.sigma_sq > 0.0) {
            return Err(config_err(format!(
                "lil'UCB variance proxy {} must be positive",
                cfg.sigma_sq
            )));
        }
        Ok(Self {
            cfg,
            fail_prob,
            records: ArmRecords::default(),
            declared: None,
        })
    }

    pub fn records(&self) -> &ArmRecords {
        &self.records
    }

    fn delta(&self) -> f64 {
        self.fail_prob / 5.0
    }

    fn index(&self, mean: f64, pulls: u64) -> f64 {
        let LilUcbConfig {
            epsilon,
            beta,
            sigma_sq,
        } = self.cfg;
        let n = pulls as f64;
        let inner = (((1.0 + epsilon) * n + 2.0).ln() / self.delta()).ln();
        mean + (1.0 + beta)
            * (1.0 + epsilon.sqrt())
            * (2.0 * sigma_sq * (1.0 + epsilon) * inner / n).sqrt()
    }

    fn stopping_arm(&self) -> Option<usize> {
        let k = self.records.arm_num();
        let a = 1.0 + 10.0 / k as f64;
        let total = self.records.total_pulls();
        self.records.em_arms().iter().position(|em| {
            em.pulls as f64 >= 1.0 + a * (total - em.pulls) as f64
        })
    }
}

impl BestArmIdentifier for LilUcbHeuristic {
    fn best_arm(&self) -> usize {
        if let Some(arm) = self.declared {
            return arm;
        }
        let pulls: Vec<f64> = self
            .records
            .em_arms()
            .iter()
            .map(|em| em.pulls as f64)
            .collect();
        argmax(&pulls)
    }
}

impl<B: ArmedBandit> Learner<B> for LilUcbHeuristic {
    fn name(&self) -> &str {
        "lilUCB heuristic"
    }

    fn goal(&self) -> Goal {
        Goal::BestArmId(self.best_arm())
    }

    fn init(&mut self, bandit: &B) -> Result<()> {
        ensure_kind(
            "lilUCB heuristic",
            bandit.kind(),
            &[BanditKind::Ordinary, BanditKind::Linear],
        )?;
        self.records = ArmRecords::new(bandit.arm_num());
        <Self as Learner<B>>::reset(self);
        Ok(())
    }

    fn reset(&mut self) {
        self.records.reset();
        self.declared = None;
    }

    fn actions(&mut self, _context: &(), _rng: &mut StdRng) -> Option<ArmPulls> {
        if self.records.arm_num() == 0 || self.declared.is_some() {
            return None;
        }
        if let Some(arm) = warm_up_arm(&self.records) {
            return Some(pull_once(arm));
        }
        if let Some(arm) = self.stopping_arm() {
            tracing::debug!(
                best_arm = arm,
                total_pulls = self.records.total_pulls(),
                "lilUCB stopping rule met"
            );
            self.declared = Some(arm);
            return None;
        }
        let ucb: Vec<f64> = self
            .records
            .em_arms()
            .iter()
            .map(|em| match em.em_mean() {
                Some(mean) => self.index(mean, em.pulls),
                None => f64::INFINITY,
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
    use crate::{Bandit, OrdinaryBandit};
    use rand::SeedableRng;

    fn run<L: Learner<OrdinaryBandit> + BestArmIdentifier>(
        learner: &mut L,
        means: &[f64],
        seed: u64,
    ) -> (usize, u64) {
        let mut bandit = OrdinaryBandit::bernoulli(means).unwrap();
        bandit.reset();
        learner.init(&bandit).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        while let Some(a) = learner.actions(&(), &mut rng) {
            let fb = bandit.feed(&a, &mut rng).unwrap();
            learner.update(&a, &fb).unwrap();
        }
        (learner.best_arm(), bandit.total_pulls())
    }

    #[test]
    fn rejects_fail_prob_outside_unit_interval() {
        assert!(SuccessiveElimination::new(0.0, SuccessiveEliminationConfig::default()).is_err());
        assert!(SuccessiveElimination::new(1.0, SuccessiveEliminationConfig::default()).is_err());
        assert!(LilUcbHeuristic::new(1.5, LilUcbConfig::default()).is_err());
        assert!(LilUcbHeuristic::new(
            0.1,
            LilUcbConfig {
                sigma_sq: 0.0,
                ..LilUcbConfig::default()
            }
        )
        .is_err());
    }

    #[test]
    fn successive_elimination_finds_separated_best_arm() {
        let mut se = SuccessiveElimination::new(0.05, SuccessiveEliminationConfig::default()).unwrap();
        let (best, pulls) = run(&mut se, &[0.1, 0.2, 0.9], 8);
        assert_eq!(best, 2);
        assert_eq!(se.active_arms(), &[2]);
        assert!(pulls > 0);
    }

    #[test]
    fn round_cap_stops_tied_arms_and_declares_the_leader() {
        let cfg = SuccessiveEliminationConfig {
            max_rounds: Some(200),
        };
        assert!(SuccessiveElimination::new(
            0.05,
            SuccessiveEliminationConfig {
                max_rounds: Some(0)
            }
        )
        .is_err());
        let mut se = SuccessiveElimination::new(0.05, cfg).unwrap();
        let (best, pulls) = run(&mut se, &[0.5, 0.5, 0.0], 3);
        assert_eq!(se.records().rounds(), 200);
        assert!(pulls <= 600);
        assert!(se.active_arms().len() >= 2);
        assert!(best == 0 || best == 1);
        let means = se.records().em_means();
        assert!(se.active_arms().iter().all(|&i| means[i] <= means[best]));
    }

    #[test]
    fn successive_elimination_radius_shrinks() {
        let mut se = SuccessiveElimination::new(0.05, SuccessiveEliminationConfig::default()).unwrap();
        se.records = ArmRecords::new(3);
        se.records
            .record(&vec![(0, 1)], &vec![vec![1.0]])
            .unwrap();
        let r1 = se.radius();
        for _ in 0..9 {
            se.records.record(&vec![(0, 1)], &vec![vec![1.0]]).unwrap();
        }
        assert!(se.radius() < r1);
    }

    #[test]
    fn lil_ucb_finds_separated_best_arm() {
        let mut lil = LilUcbHeuristic::new(0.05, LilUcbConfig::default()).unwrap();
        let (best, _) = run(&mut lil, &[0.2, 0.9, 0.3], 4);
        assert_eq!(best, 1);
        assert_eq!(
            Learner::<OrdinaryBandit>::goal(&lil),
            Goal::BestArmId(1)
        );
    }

    #[test]
    fn lil_ucb_stopping_rule_uses_other_arms_pulls() {
        let mut lil = LilUcbHeuristic::new(0.05, LilUcbConfig::default()).unwrap();
        lil.records = ArmRecords::new(2);
        // a = 6: arm 0 needs 1 + 6 * 1 = 7 pulls against one pull of arm 1.
        lil.records.record(&vec![(0, 6), (1, 1)], &vec![vec![1.0; 6], vec![0.0]]).unwrap();
        assert_eq!(lil.stopping_arm(), None);
        lil.records.record(&vec![(0, 1)], &vec![vec![1.0]]).unwrap();
        assert_eq!(lil.stopping_arm(), Some(0));
    }
}
