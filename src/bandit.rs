//! The environment side of the learner/bandit protocol.
//!
//! A [`Bandit`] owns its arms (or products), answers actions with stochastic feedback
//! and keeps the bookkeeping needed to report regret. Randomness always comes from the
//! caller's seeded RNG so a trial can be replayed exactly.

use rand::rngs::StdRng;

use crate::error::Result;
use crate::Goal;

/// Which family an environment belongs to. Learners check this when they are bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BanditKind {
    /// Independent arms, one reward distribution each.
    Ordinary,
    /// Gaussian arms whose means are `feature · theta`.
    Linear,
    /// Multinomial-logit assortment bandit.
    Mnl,
}

/// One batched action for armed bandits: `(arm, pulls)` pairs.
pub type ArmPulls = Vec<(usize, u64)>;

/// Rewards answering an [`ArmPulls`] action, one vector per pair.
pub type ArmRewards = Vec<Vec<f64>>;

/// Environment contract consumed by the trial protocol.
pub trait Bandit {
    /// Side information handed to the learner before it acts.
    type Context;
    /// What a learner submits in one round.
    type Action;
    /// What the environment answers with.
    type Feedback;

    fn name(&self) -> &str;

    fn kind(&self) -> BanditKind;

    /// Zero all running counters. Must be called before every trial; arm parameters
    /// and the precomputed optimum are untouched.
    fn reset(&mut self);

    fn context(&self) -> Self::Context;

    /// Execute one round of actions and return the stochastic outcome.
    fn feed(&mut self, actions: &Self::Action, rng: &mut StdRng) -> Result<Self::Feedback>;

    /// Realized regret for the learner's declared goal.
    fn regret(&self, goal: &Goal) -> Result<f64>;

    /// Number of elementary actions contained in `actions`.
    fn action_count(&self, actions: &Self::Action) -> u64;
}

/// Bandits whose actions are arm pulls (ordinary and linear).
pub trait ArmedBandit:
    Bandit<Context = (), Action = ArmPulls, Feedback = ArmRewards>
{
    fn arm_num(&self) -> usize;

    fn total_pulls(&self) -> u64;

    /// Index of the arm with the highest mean (first one on ties).
    fn best_arm(&self) -> usize;

    /// `Σ (best_mean − mean(arm)) · pulls` over the trial so far.
    fn pseudo_regret(&self) -> f64;

    /// Whether all rewards are Bernoulli (in `{0, 1}`).
    fn bernoulli_rewards(&self) -> bool;

    /// Arm feature vectors, for environments with a linear structure.
    fn features(&self) -> Option<&[Vec<f64>]> {
        None
    }
}
