//! Naive uniform allocation: sample every arm the same number of times.

use rand::rngs::StdRng;

use crate::error::Result;
use crate::learner::{ensure_horizon, ensure_kind, pull_once};
use crate::{ArmPulls, ArmRecords, ArmRewards, ArmedBandit, BanditKind, Goal, Learner};

/// Deterministic round robin: at time `t` pull arm `(t − 1) mod K`.
#[derive(Debug, Clone)]
pub struct Uniform {
    horizon: u64,
    records: ArmRecords,
}

impl Uniform {
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
}

impl<B: ArmedBandit> Learner<B> for Uniform {
    fn name(&self) -> &str {
        "uniform"
    }

    fn goal(&self) -> Goal {
        Goal::MaxReward
    }

    fn init(&mut self, bandit: &B) -> Result<()> {
        ensure_kind("uniform", bandit.kind(), &[BanditKind::Ordinary, BanditKind::Linear])?;
        self.records = ArmRecords::new(bandit.arm_num());
        Ok(())
    }

    fn reset(&mut self) {
        self.records.reset();
    }

    fn actions(&mut self, _context: &(), _rng: &mut StdRng) -> Option<ArmPulls> {
        let k = self.records.arm_num() as u64;
        let t = self.records.rounds();
        if k == 0 || t >= self.horizon {
            return None;
        }
        Some(pull_once((t % k) as usize))
    }

    fn update(&mut self, actions: &ArmPulls, feedback: &ArmRewards) -> Result<()> {
        self.records.record(actions, feedback)
    }
}
