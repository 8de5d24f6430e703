//! `banditsim`: seedable multi-armed bandit simulation.
//!
//! A simulation pairs an environment (a [`Bandit`]) with a policy (a [`Learner`]) and
//! lets [`SinglePlayerProtocol`] drive them round by round:
//!
//! ```text
//!   context  = bandit.context()
//!   actions  = learner.actions(context)      // None ends the trial
//!   feedback = bandit.feed(actions)
//!   learner.update(actions, feedback)
//! ```
//!
//! The protocol records `(rounds, total_actions, regret)` at requested checkpoints and
//! at termination. Regret is computed by the environment from the learner's [`Goal`]:
//! cumulative regret for reward maximization, a `{0, 1}` indicator for best-arm
//! identification.
//!
//! **Environments:**
//! - [`OrdinaryBandit`]: independent Bernoulli or Gaussian arms.
//! - [`LinearBandit`]: Gaussian arms whose means are `feature · theta`.
//! - [`MnlBandit`]: assortment selection under the multinomial-logit choice model.
//!
//! **Regret minimization:** [`Uniform`], [`Ucb`], [`Moss`], [`ThompsonSampling`],
//! [`Cucb`] and [`LinUcb`] (linear arm sets), [`ExplorationExploitation`] (MNL).
//!
//! **Best-arm identification:**
//! - fixed confidence: [`SuccessiveElimination`], [`LilUcbHeuristic`];
//! - fixed budget: [`UniformBai`], [`SuccessiveRejects`].
//!
//! **Optimizers:**
//! - [`search_best_assortment`]: exact revenue-maximizing assortment under an optional
//!   cardinality limit.
//! - [`competitive_arms`]: which arms can still be optimal given a confidence slab on
//!   `theta` (second-order cone feasibility, solved with Clarabel).
//!
//! **Determinism:** there is no global RNG. Every trial owns a `StdRng` seeded from
//! its trial seed and passes it by `&mut` to the learner and the bandit, so the same
//! seed reproduces the same records bit for bit. [`SinglePlayerProtocol::run_trials`]
//! parallelizes across trials only.
//!
//! ```rust
//! use banditsim::{OrdinaryBandit, ProtocolConfig, SinglePlayerProtocol, Ucb, UcbConfig};
//!
//! let protocol = SinglePlayerProtocol::new(ProtocolConfig {
//!     intermediate_rounds: vec![100, 500],
//! });
//! let mut bandit = OrdinaryBandit::bernoulli(&[0.2, 0.5, 0.8]).unwrap();
//! let mut learner = Ucb::new(1_000, UcbConfig::default()).unwrap();
//! let records = protocol.run_trial(&mut bandit, &mut learner, 7).unwrap();
//! assert_eq!(records.len(), 3);
//! assert_eq!(records[2].rounds, 1_000);
//! ```
//!
//! **Non-goals:**
//! - No contextual environments beyond the fixed linear arm set.
//! - No multi-player or decentralized protocols.
//! - No plotting or result storage; records are plain data (optionally `serde`).

#![forbid(unsafe_code)]

mod error;
pub use error::{Error, Result};

mod arm;
pub use arm::*;

mod bandit;
pub use bandit::*;

mod ordinary;
pub use ordinary::*;

mod linear;
pub use linear::*;

mod assortment;
pub use assortment::*;

mod mnl;
pub use mnl::*;

pub mod feasibility;
pub use feasibility::competitive_arms;

mod learner;
pub use learner::{ArmRecords, BestArmIdentifier, Goal, Learner};

mod uniform;
pub use uniform::*;

mod ucb;
pub use ucb::*;

mod thompson;
pub use thompson::*;

mod cucb;
pub use cucb::*;

mod linucb;
pub use linucb::*;

mod mnl_learner;
pub use mnl_learner::*;

mod fixconf;
pub use fixconf::*;

mod fixbudget;
pub use fixbudget::*;

mod protocol;
pub use protocol::*;
