//! Ordinary stochastic bandit: each pull of arm `i` yields an i.i.d. reward from that
//! arm's distribution. Arms are indexed from 0.

use rand::rngs::StdRng;

use crate::error::{action_err, config_err, Result};
use crate::{Arm, ArmPulls, ArmRewards, ArmedBandit, Bandit, BanditKind, Goal};

/// Ordinary multi-armed bandit.
#[derive(Debug, Clone)]
pub struct OrdinaryBandit {
    name: String,
    arms: Vec<Arm>,
    best_arm: usize,
    best_mean: f64,

    total_pulls: u64,
    // Σ best_mean · pulls
    max_rewards: f64,
    rewards: f64,
    pseudo_regret: f64,
}

impl OrdinaryBandit {
    /// Build a bandit over `arms`; at least two arms are required.
    pub fn new(arms: Vec<Arm>) -> Result<Self> {
        if arms.len() < 2 {
            return Err(config_err(format!(
                "the number of arms {} is less than 2",
                arms.len()
            )));
        }
        let mut best_arm = 0;
        for (i, arm) in arms.iter().enumerate() {
            if arm.mean() > arms[best_arm].mean() {
                best_arm = i;
            }
        }
        let best_mean = arms[best_arm].mean();
        tracing::info!(arms = arms.len(), best_arm, best_mean, "ordinary bandit ready");
        Ok(Self {
            name: "ordinary_bandit".to_string(),
            arms,
            best_arm,
            best_mean,
            total_pulls: 0,
            max_rewards: 0.0,
            rewards: 0.0,
            pseudo_regret: 0.0,
        })
    }

    /// Convenience constructor for Bernoulli arms.
    pub fn bernoulli(means: &[f64]) -> Result<Self> {
        let arms = means
            .iter()
            .map(|&m| Arm::bernoulli(m))
            .collect::<Result<Vec<_>>>()?;
        Self::new(arms)
    }

    /// Replace the default name used in trial records.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn arms(&self) -> &[Arm] {
        &self.arms
    }

    pub fn best_mean(&self) -> f64 {
        self.best_mean
    }

    fn validate(&self, actions: &ArmPulls) -> Result<()> {
        if actions.is_empty() {
            return Err(action_err("empty action list"));
        }
        for &(arm, pulls) in actions {
            if arm >= self.arms.len() {
                return Err(action_err(format!(
                    "arm index {arm} is out of range [0, {})",
                    self.arms.len()
                )));
            }
            if pulls == 0 {
                return Err(action_err(format!("arm {arm} requested with zero pulls")));
            }
        }
        Ok(())
    }
}

impl Bandit for OrdinaryBandit {
    type Context = ();
    type Action = ArmPulls;
    type Feedback = ArmRewards;

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BanditKind {
        BanditKind::Ordinary
    }

    fn reset(&mut self) {
        self.total_pulls = 0;
        self.max_rewards = 0.0;
        self.rewards = 0.0;
        self.pseudo_regret = 0.0;
    }

    fn context(&self) {}

    fn feed(&mut self, actions: &ArmPulls, rng: &mut StdRng) -> Result<ArmRewards> {
        // Reject the whole round before drawing anything.
        self.validate(actions)?;
        let mut feedback = Vec::with_capacity(actions.len());
        for &(arm, pulls) in actions {
            let arm_ref = &self.arms[arm];
            let em_rewards = arm_ref.pull(rng, pulls);
            let p = pulls as f64;
            self.total_pulls = self.total_pulls.saturating_add(pulls);
            self.max_rewards += self.best_mean * p;
            self.rewards += em_rewards.iter().sum::<f64>();
            self.pseudo_regret += (self.best_mean - arm_ref.mean()) * p;
            feedback.push(em_rewards);
        }
        Ok(feedback)
    }

    fn regret(&self, goal: &Goal) -> Result<f64> {
        Ok(match *goal {
            Goal::MaxReward => self.max_rewards - self.rewards,
            Goal::BestArmId(arm) => f64::from(u8::from(arm != self.best_arm)),
        })
    }

    fn action_count(&self, actions: &ArmPulls) -> u64 {
        actions.iter().map(|&(_, pulls)| pulls).sum()
    }
}

impl ArmedBandit for OrdinaryBandit {
    fn arm_num(&self) -> usize {
        self.arms.len()
    }

    fn total_pulls(&self) -> u64 {
        self.total_pulls
    }

    fn best_arm(&self) -> usize {
        self.best_arm
    }

    fn pseudo_regret(&self) -> f64 {
        self.pseudo_regret
    }

    fn bernoulli_rewards(&self) -> bool {
        self.arms.iter().all(Arm::is_bernoulli)
    }
}
