//! Linear (correlated) bandit: arm `i` has feature vector `x_i` and Gaussian rewards
//! with mean `x_i · theta`, where `theta` is unknown to the learner.

use rand::rngs::StdRng;

use crate::error::{config_err, Result};
use crate::{Arm, ArmPulls, ArmRewards, ArmedBandit, Bandit, BanditKind, Goal, OrdinaryBandit};

/// Noise variance assumed when none is configured.
pub const DEFAULT_NOISE_VARIANCE: f64 = 1.0;

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Linear bandit with Gaussian noise.
#[derive(Debug, Clone)]
pub struct LinearBandit {
    inner: OrdinaryBandit,
    features: Vec<Vec<f64>>,
    theta: Vec<f64>,
}

impl LinearBandit {
    /// Build from per-arm features, the hidden parameter and an optional noise
    /// variance (defaults to [`DEFAULT_NOISE_VARIANCE`]).
    pub fn new(features: Vec<Vec<f64>>, theta: Vec<f64>, variance: Option<f64>) -> Result<Self> {
        if features.len() < 2 {
            return Err(config_err(format!(
                "the number of arms {} is less than 2",
                features.len()
            )));
        }
        if theta.is_empty() {
            return Err(config_err("theta must have at least one dimension"));
        }
        if let Some(i) = features.iter().position(|f| f.len() != theta.len()) {
            return Err(config_err(format!(
                "feature {i} has dimension {} but theta has dimension {}",
                features[i].len(),
                theta.len()
            )));
        }
        let variance = match variance {
            Some(v) => v,
            None => {
                tracing::warn!(
                    variance = DEFAULT_NOISE_VARIANCE,
                    "linear bandit noise variance not given; assuming default"
                );
                DEFAULT_NOISE_VARIANCE
            }
        };
        let arms = features
            .iter()
            .map(|f| Arm::gaussian(dot(f, &theta), variance))
            .collect::<Result<Vec<_>>>()?;
        let inner = OrdinaryBandit::new(arms)?.with_name("linear_bandit");
        Ok(Self {
            inner,
            features,
            theta,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.inner = self.inner.with_name(name);
        self
    }

    pub fn theta(&self) -> &[f64] {
        &self.theta
    }

    pub fn dim(&self) -> usize {
        self.theta.len()
    }

    pub fn arms(&self) -> &[Arm] {
        self.inner.arms()
    }
}

impl Bandit for LinearBandit {
    type Context = ();
    type Action = ArmPulls;
    type Feedback = ArmRewards;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn kind(&self) -> BanditKind {
        BanditKind::Linear
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn context(&self) {}

    fn feed(&mut self, actions: &ArmPulls, rng: &mut StdRng) -> Result<ArmRewards> {
        self.inner.feed(actions, rng)
    }

    fn regret(&self, goal: &Goal) -> Result<f64> {
        self.inner.regret(goal)
    }

    fn action_count(&self, actions: &ArmPulls) -> u64 {
        self.inner.action_count(actions)
    }
}

impl ArmedBandit for LinearBandit {
    fn arm_num(&self) -> usize {
        self.inner.arm_num()
    }

    fn total_pulls(&self) -> u64 {
        self.inner.total_pulls()
    }

    fn best_arm(&self) -> usize {
        self.inner.best_arm()
    }

    fn pseudo_regret(&self) -> f64 {
        self.inner.pseudo_regret()
    }

    fn bernoulli_rewards(&self) -> bool {
        false
    }

    fn features(&self) -> Option<&[Vec<f64>]> {
        Some(&self.features)
    }
}
