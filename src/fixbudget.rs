//! Fixed-budget best-arm identification: spend at most `budget` pulls, then declare.

use rand::rngs::StdRng;

use crate::error::{config_err, Result};
use crate::learner::{argmax, ensure_kind};
use crate::{
    ArmPulls, ArmRecords, ArmRewards, ArmedBandit, BanditKind, BestArmIdentifier, Goal, Learner,
};

fn ensure_budget(learner: &str, budget: u64, arm_num: usize) -> Result<()> {
    if budget < arm_num as u64 {
        return Err(config_err(format!(
            "{learner}: budget {budget} is less than the number of arms {arm_num}"
        )));
    }
    Ok(())
}

/// Splits the budget evenly in a single batched round.
#[derive(Debug, Clone)]
pub struct UniformBai {
    budget: u64,
    records: ArmRecords,
}

impl UniformBai {
    pub fn new(budget: u64) -> Self {
        Self {
            budget,
            records: ArmRecords::default(),
        }
    }

    pub fn budget(&self) -> u64 {
        self.budget
    }

    pub fn records(&self) -> &ArmRecords {
        &self.records
    }
}

impl BestArmIdentifier for UniformBai {
    fn best_arm(&self) -> usize {
        argmax(&self.records.em_means())
    }
}

impl<B: ArmedBandit> Learner<B> for UniformBai {
    fn name(&self) -> &str {
        "Uniform"
    }

    fn goal(&self) -> Goal {
        Goal::BestArmId(self.best_arm())
    }

    fn init(&mut self, bandit: &B) -> Result<()> {
        ensure_kind("Uniform", bandit.kind(), &[BanditKind::Ordinary, BanditKind::Linear])?;
        ensure_budget("Uniform", self.budget, bandit.arm_num())?;
        self.records = ArmRecords::new(bandit.arm_num());
        Ok(())
    }

    fn reset(&mut self) {
        self.records.reset();
    }

    fn actions(&mut self, _context: &(), _rng: &mut StdRng) -> Option<ArmPulls> {
        let k = self.records.arm_num() as u64;
        if k == 0 || self.records.rounds() > 0 {
            return None;
        }
        let (base, extra) = (self.budget / k, self.budget % k);
        Some(
            (0..k)
                .map(|i| (i as usize, base + u64::from(i < extra)))
                .filter(|&(_, pulls)| pulls > 0)
                .collect(),
        )
    }

    fn update(&mut self, actions: &ArmPulls, feedback: &ArmRewards) -> Result<()> {
        self.records.record(actions, feedback)
    }
}

/// Successive rejects (Audibert and Bubeck, 2010).
///
/// Phase `k = 1..K−1` tops every surviving arm up to
/// `n_k = ⌈(budget − K) / (loḡ(K) (K + 1 − k))⌉` pulls, then rejects the surviving arm
/// with the lowest empirical mean. `loḡ(K) = 1/2 + Σ_{i=2}^{K} 1/i`.
#[derive(Debug, Clone)]
pub struct SuccessiveRejects {
    budget: u64,
    records: ArmRecords,
    active: Vec<usize>,
    phase: usize,
}

impl SuccessiveRejects {
    pub fn new(budget: u64) -> Self {
        Self {
            budget,
            records: ArmRecords::default(),
            active: Vec::new(),
            phase: 1,
        }
    }

    pub fn budget(&self) -> u64 {
        self.budget
    }

    pub fn records(&self) -> &ArmRecords {
        &self.records
    }

    /// Arms not yet rejected, in index order.
    pub fn active_arms(&self) -> &[usize] {
        &self.active
    }

    /// Cumulative pull target of phase `k`. Never below one, so a budget equal to
    /// the arm count still samples every arm once.
    pub fn phase_pulls(&self, k: usize) -> u64 {
        let arms = self.records.arm_num();
        let bar_log = 0.5 + (2..=arms).map(|i| 1.0 / i as f64).sum::<f64>();
        let spare = self.budget.saturating_sub(arms as u64) as f64;
        ((spare / (bar_log * (arms + 1 - k) as f64)).ceil() as u64).max(1)
    }

    fn reject_worst(&mut self) {
        let means = self.records.em_means();
        let Some(pos) = self
            .active
            .iter()
            .enumerate()
            .min_by(|a, b| means[*a.1].total_cmp(&means[*b.1]))
            .map(|(pos, _)| pos)
        else {
            return;
        };
        let rejected = self.active.remove(pos);
        tracing::debug!(
            phase = self.phase,
            rejected,
            remaining = self.active.len(),
            "successive rejects phase done"
        );
        self.phase += 1;
    }
}

impl BestArmIdentifier for SuccessiveRejects {
    fn best_arm(&self) -> usize {
        let means = self.records.em_means();
        let scores: Vec<f64> = self.active.iter().map(|&i| means[i]).collect();
        self.active.get(argmax(&scores)).copied().unwrap_or(0)
    }
}

impl<B: ArmedBandit> Learner<B> for SuccessiveRejects {
    fn name(&self) -> &str {
        "Successive Rejects"
    }

    fn goal(&self) -> Goal {
        Goal::BestArmId(self.best_arm())
    }

    fn init(&mut self, bandit: &B) -> Result<()> {
        ensure_kind(
            "Successive Rejects",
            bandit.kind(),
            &[BanditKind::Ordinary, BanditKind::Linear],
        )?;
        ensure_budget("Successive Rejects", self.budget, bandit.arm_num())?;
        self.records = ArmRecords::new(bandit.arm_num());
        <Self as Learner<B>>::reset(self);
        Ok(())
    }

    fn reset(&mut self) {
        self.records.reset();
        self.active = (0..self.records.arm_num()).collect();
        self.phase = 1;
    }

    fn actions(&mut self, _context: &(), _rng: &mut StdRng) -> Option<ArmPulls> {
        while self.active.len() > 1 {
            let target = self.phase_pulls(self.phase);
            let em_arms = self.records.em_arms();
            let pulls: ArmPulls = self
                .active
                .iter()
                .filter(|&&i| em_arms[i].pulls < target)
                .map(|&i| (i, target - em_arms[i].pulls))
                .collect();
            if !pulls.is_empty() {
                return Some(pulls);
            }
            // Nothing to top up; the phase ends immediately.
            self.reject_worst();
        }
        None
    }

    fn update(&mut self, actions: &ArmPulls, feedback: &ArmRewards) -> Result<()> {
        self.records.record(actions, feedback)?;
        self.reject_worst();
        Ok(())
    }
}
