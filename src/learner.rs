//! The learner side of the protocol.
//!
//! A [`Learner`] is bound to an environment with [`Learner::init`], reset at the start
//! of every trial, and then alternates between proposing actions and absorbing
//! feedback until it returns `None` from [`Learner::actions`].
//!
//! The trait is object safe, so heterogeneous learners over the same bandit type can
//! be compared side by side:
//!
//! ```rust
//! use banditsim::{Learner, Moss, OrdinaryBandit, Ucb, UcbConfig, Uniform};
//!
//! let bandit = OrdinaryBandit::bernoulli(&[0.3, 0.5, 0.7]).unwrap();
//! let mut learners: Vec<Box<dyn Learner<OrdinaryBandit>>> = vec![
//!     Box::new(Uniform::new(100).unwrap()),
//!     Box::new(Ucb::new(100, UcbConfig::default()).unwrap()),
//!     Box::new(Moss::new(100).unwrap()),
//! ];
//! for l in &mut learners {
//!     l.init(&bandit).unwrap();
//! }
//! ```

use rand::rngs::StdRng;

use crate::error::{action_err, config_err, Error, Result};
use crate::{ArmPulls, ArmRewards, Bandit, BanditKind, EmArm};

/// What a learner is trying to achieve; also the key the environment uses to
/// compute regret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Goal {
    /// Maximize cumulative reward (minimize regret).
    MaxReward,
    /// Identify the best arm; carries the learner's current declaration.
    BestArmId(usize),
}

impl Goal {
    pub fn name(&self) -> &'static str {
        match self {
            Goal::MaxReward => "max_reward",
            Goal::BestArmId(_) => "best_arm_id",
        }
    }
}

/// Learner contract driven by the trial protocol.
pub trait Learner<B: Bandit + ?Sized> {
    fn name(&self) -> &str;

    fn goal(&self) -> Goal;

    /// Bind to `bandit`: reject environments this learner does not understand, run
    /// algorithm-specific setup, then [`reset`](Learner::reset).
    fn init(&mut self, bandit: &B) -> Result<()>;

    /// Clear all empirical state.
    fn reset(&mut self);

    /// Next actions to play, or `None` once the stopping condition holds.
    fn actions(&mut self, context: &B::Context, rng: &mut StdRng) -> Option<B::Action>;

    /// Absorb the environment's answer to `actions`.
    fn update(&mut self, actions: &B::Action, feedback: &B::Feedback) -> Result<()>;
}

/// Learners that declare a best arm (fixed confidence / fixed budget).
pub trait BestArmIdentifier {
    /// Current best-arm estimate.
    fn best_arm(&self) -> usize;
}

pub(crate) fn ensure_kind(learner: &str, got: BanditKind, accepted: &[BanditKind]) -> Result<()> {
    if accepted.contains(&got) {
        Ok(())
    } else {
        Err(Error::IncompatibleBandit {
            learner: learner.to_string(),
            bandit: got,
        })
    }
}

pub(crate) fn ensure_horizon(horizon: u64) -> Result<()> {
    if horizon == 0 {
        return Err(config_err("horizon must be at least 1"));
    }
    Ok(())
}

pub(crate) fn ensure_fail_prob(fail_prob: f64) -> Result<()> {
    if !(fail_prob > 0.0 && fail_prob < 1.0) {
        return Err(config_err(format!(
            "failure probability {fail_prob} is outside (0, 1)"
        )));
    }
    Ok(())
}

/// Index of the first maximum; NaN scores never win.
pub(crate) fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (i, &s) in scores.iter().enumerate() {
        if s > best_score {
            best = i;
            best_score = s;
        }
    }
    best
}

/// Round-robin warm-up: the arm to pull while some arm has not been pulled once in
/// index order, i.e. during the first `K` rounds.
pub(crate) fn warm_up_arm(records: &ArmRecords) -> Option<usize> {
    let k = records.arm_num() as u64;
    (records.rounds() < k).then(|| records.rounds() as usize)
}

/// Single-pull action on `arm`.
pub(crate) fn pull_once(arm: usize) -> ArmPulls {
    vec![(arm, 1)]
}

/// Empirical per-arm state shared by learners over armed bandits.
#[derive(Debug, Clone, Default)]
pub struct ArmRecords {
    em_arms: Vec<EmArm>,
    rounds: u64,
    rewards: f64,
}

impl ArmRecords {
    pub fn new(arm_num: usize) -> Self {
        Self {
            em_arms: vec![EmArm::default(); arm_num],
            rounds: 0,
            rewards: 0.0,
        }
    }

    pub fn reset(&mut self) {
        for em in &mut self.em_arms {
            em.reset();
        }
        self.rounds = 0;
        self.rewards = 0.0;
    }

    pub fn arm_num(&self) -> usize {
        self.em_arms.len()
    }

    pub fn em_arms(&self) -> &[EmArm] {
        &self.em_arms
    }

    /// Completed rounds.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Cumulative observed reward.
    pub fn rewards(&self) -> f64 {
        self.rewards
    }

    pub fn total_pulls(&self) -> u64 {
        self.em_arms.iter().map(|e| e.pulls).sum()
    }

    /// Empirical means with `-∞` for arms never pulled.
    pub fn em_means(&self) -> Vec<f64> {
        self.em_arms
            .iter()
            .map(|e| e.em_mean().unwrap_or(f64::NEG_INFINITY))
            .collect()
    }

    /// Fold one round of feedback in. The shapes must line up with `actions`.
    pub fn record(&mut self, actions: &ArmPulls, feedback: &ArmRewards) -> Result<()> {
        if actions.len() != feedback.len() {
            return Err(action_err(format!(
                "{} actions but {} feedback entries",
                actions.len(),
                feedback.len()
            )));
        }
        for (&(arm, pulls), rewards) in actions.iter().zip(feedback) {
            if arm >= self.em_arms.len() {
                return Err(action_err(format!("feedback for unknown arm {arm}")));
            }
            if rewards.len() as u64 != pulls {
                return Err(action_err(format!(
                    "arm {arm}: {pulls} pulls but {} rewards",
                    rewards.len()
                )));
            }
        }
        for (&(arm, _), rewards) in actions.iter().zip(feedback) {
            self.em_arms[arm].update(rewards);
            self.rewards += rewards.iter().sum::<f64>();
        }
        self.rounds += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_maximum_and_skips_nan() {
        assert_eq!(argmax(&[0.1, 0.5, 0.5]), 1);
        assert_eq!(argmax(&[f64::NAN, 0.2]), 1);
        assert_eq!(argmax(&[f64::NEG_INFINITY, f64::NEG_INFINITY]), 0);
    }

    #[test]
    fn records_reject_mismatched_feedback() {
        let mut r = ArmRecords::new(2);
        assert!(r.record(&vec![(0, 2)], &vec![vec![1.0]]).is_err());
        assert!(r.record(&vec![(0, 1)], &vec![]).is_err());
        assert!(r.record(&vec![(3, 1)], &vec![vec![1.0]]).is_err());
        assert_eq!(r.rounds(), 0);

        r.record(&vec![(0, 2), (1, 1)], &vec![vec![1.0, 0.0], vec![1.0]])
            .unwrap();
        assert_eq!(r.rounds(), 1);
        assert_eq!(r.total_pulls(), 3);
        assert_eq!(r.em_means(), vec![0.5, 1.0]);
        r.reset();
        assert_eq!(r.total_pulls(), 0);
    }

    #[test]
    fn goal_names_are_stable() {
        assert_eq!(Goal::MaxReward.name(), "max_reward");
        assert_eq!(Goal::BestArmId(4).name(), "best_arm_id");
    }

    #[test]
    fn kind_check_reports_learner_and_bandit() {
        let e = ensure_kind("CUCB", BanditKind::Ordinary, &[BanditKind::Linear]).unwrap_err();
        assert_eq!(
            e,
            Error::IncompatibleBandit {
                learner: "CUCB".to_string(),
                bandit: BanditKind::Ordinary,
            }
        );
    }
}
