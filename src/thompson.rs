//! Thompson sampling for Bernoulli rewards.
//!
//! Each arm carries a uniform `Beta(1, 1)` prior; after the round-robin warm-up the
//! learner samples every posterior `Beta(1 + s_i, 1 + n_i − s_i)` and plays the arm
//! with the largest draw. Draws come from the trial RNG, so a seeded trial is
//! reproducible.

use rand::rngs::StdRng;
use rand_distr::{Beta, Distribution};

use crate::error::{Error, Result};
use crate::learner::{argmax, ensure_horizon, ensure_kind, pull_once, warm_up_arm};
use crate::{ArmPulls, ArmRecords, ArmRewards, ArmedBandit, BanditKind, Goal, Learner};

/// Beta posterior parameters for one arm.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BetaStats {
    pub alpha: f64,
    pub beta: f64,
}

impl BetaStats {
    pub fn expected_value(&self) -> f64 {
        let denom = self.alpha + self.beta;
        if denom <= 0.0 {
            0.5
        } else {
            self.alpha / denom
        }
    }
}

fn sample_beta(rng: &mut StdRng, stats: BetaStats) -> f64 {
    let BetaStats { alpha, beta } = stats;
    if !(alpha.is_finite() && beta.is_finite()) || alpha <= 0.0 || beta <= 0.0 {
        return 0.5;
    }
    match Beta::new(alpha, beta) {
        Ok(dist) => dist.sample(rng),
        Err(_) => 0.5,
    }
}

/// Thompson sampling with independent Beta posteriors.
#[derive(Debug, Clone)]
pub struct ThompsonSampling {
    horizon: u64,
    records: ArmRecords,
}

impl ThompsonSampling {
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

    /// Current per-arm posteriors.
    pub fn posteriors(&self) -> Vec<BetaStats> {
        self.records
            .em_arms()
            .iter()
            .map(|em| BetaStats {
                alpha: 1.0 + em.rewards,
                beta: 1.0 + em.pulls as f64 - em.rewards,
            })
            .collect()
    }
}

impl<B: ArmedBandit> Learner<B> for ThompsonSampling {
    fn name(&self) -> &str {
        "Thompson Sampling"
    }

    fn goal(&self) -> Goal {
        Goal::MaxReward
    }

    fn init(&mut self, bandit: &B) -> Result<()> {
        ensure_kind(
            "Thompson Sampling",
            bandit.kind(),
            &[BanditKind::Ordinary, BanditKind::Linear],
        )?;
        // The conjugate update is only valid for rewards in {0, 1}.
        if !bandit.bernoulli_rewards() {
            return Err(Error::IncompatibleBandit {
                learner: "Thompson Sampling".to_string(),
                bandit: bandit.kind(),
            });
        }
        self.records = ArmRecords::new(bandit.arm_num());
        Ok(())
    }

    fn reset(&mut self) {
        self.records.reset();
    }

    fn actions(&mut self, _context: &(), rng: &mut StdRng) -> Option<ArmPulls> {
        if self.records.arm_num() == 0 || self.records.rounds() >= self.horizon {
            return None;
        }
        if let Some(arm) = warm_up_arm(&self.records) {
            return Some(pull_once(arm));
        }
        let draws: Vec<f64> = self
            .posteriors()
            .into_iter()
            .map(|s| sample_beta(rng, s))
            .collect();
        Some(pull_once(argmax(&draws)))
    }

    fn update(&mut self, actions: &ArmPulls, feedback: &ArmRewards) -> Result<()> {
        self.records.record(actions, feedback)
    }
}
