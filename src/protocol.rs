//! Single-player trial driver.
//!
//! One trial seeds a fresh `StdRng`, resets the bandit, binds the learner and then
//! loops: ask the learner for actions, feed them to the bandit, hand the feedback
//! back. The learner ends the trial by returning `None`.
//!
//! Records are taken at each requested intermediate round (before that round is
//! played) and once more at termination. Identical seeds replay identical records.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::error::Result;
use crate::{Bandit, Learner};

/// Snapshot of one trial at a given round.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialRecord {
    pub bandit: String,
    pub learner: String,
    /// Completed rounds.
    pub rounds: u64,
    /// Elementary actions executed by the bandit so far.
    pub total_actions: u64,
    /// Regret for the learner's current goal.
    pub regret: f64,
}

impl TrialRecord {
    /// Numeric fields keyed by name.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        out.insert("rounds".to_string(), self.rounds as f64);
        out.insert("total_actions".to_string(), self.total_actions as f64);
        out.insert("regret".to_string(), self.regret);
        out
    }
}

/// Protocol configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProtocolConfig {
    /// Rounds at which to record an intermediate snapshot.
    pub intermediate_rounds: Vec<u64>,
}

/// Drives one learner against one bandit.
#[derive(Debug, Clone, Default)]
pub struct SinglePlayerProtocol {
    cfg: ProtocolConfig,
}

impl SinglePlayerProtocol {
    pub fn new(mut cfg: ProtocolConfig) -> Self {
        cfg.intermediate_rounds.sort_unstable();
        cfg.intermediate_rounds.dedup();
        Self { cfg }
    }

    pub fn name(&self) -> &str {
        "single_player_protocol"
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.cfg
    }

    /// Run one trial, handing every record to `sink` as soon as it is taken.
    pub fn run_trial_with<B, L, F>(
        &self,
        bandit: &mut B,
        learner: &mut L,
        seed: u64,
        mut sink: F,
    ) -> Result<()>
    where
        B: Bandit,
        L: Learner<B> + ?Sized,
        F: FnMut(TrialRecord),
    {
        let mut rng = StdRng::seed_from_u64(seed);
        bandit.reset();
        learner.init(bandit)?;

        let mut rounds = 0u64;
        let mut total_actions = 0u64;

        loop {
            let context = bandit.context();
            let Some(actions) = learner.actions(&context, &mut rng) else {
                break;
            };
            if self.cfg.intermediate_rounds.binary_search(&rounds).is_ok() {
                sink(snapshot(&*bandit, &*learner, rounds, total_actions)?);
            }
            let feedback = bandit.feed(&actions, &mut rng)?;
            learner.update(&actions, &feedback)?;
            total_actions += bandit.action_count(&actions);
            rounds += 1;
        }

        let last = snapshot(&*bandit, &*learner, rounds, total_actions)?;
        tracing::info!(
            bandit = %last.bandit,
            learner = %last.learner,
            goal = learner.goal().name(),
            seed,
            rounds,
            total_actions,
            regret = last.regret,
            "trial finished"
        );
        sink(last);
        Ok(())
    }

    /// Run one trial and collect its records.
    pub fn run_trial<B, L>(
        &self,
        bandit: &mut B,
        learner: &mut L,
        seed: u64,
    ) -> Result<Vec<TrialRecord>>
    where
        B: Bandit,
        L: Learner<B> + ?Sized,
    {
        let mut out = Vec::new();
        self.run_trial_with(bandit, learner, seed, |r| out.push(r))?;
        Ok(out)
    }

    /// Run one independent trial per seed in parallel. `make` builds a fresh
    /// bandit/learner pair for each trial; results come back in seed order.
    pub fn run_trials<B, L, F>(&self, seeds: &[u64], make: F) -> Result<Vec<Vec<TrialRecord>>>
    where
        B: Bandit,
        L: Learner<B>,
        F: Fn() -> Result<(B, L)> + Sync,
    {
        seeds
            .par_iter()
            .map(|&seed| {
                let (mut bandit, mut learner) = make()?;
                self.run_trial(&mut bandit, &mut learner, seed)
            })
            .collect()
    }
}

fn snapshot<B, L>(bandit: &B, learner: &L, rounds: u64, total_actions: u64) -> Result<TrialRecord>
where
    B: Bandit,
    L: Learner<B> + ?Sized,
{
    Ok(TrialRecord {
        bandit: bandit.name().to_string(),
        learner: learner.name().to_string(),
        rounds,
        total_actions,
        regret: bandit.regret(&learner.goal())?,
    })
}
