//! Reward sources and the empirical statistics learners keep about them.
//!
//! An [`Arm`] is owned by an environment and only ever sampled; its mean is used for
//! regret bookkeeping and never shown to a learner. An [`EmArm`] is the learner-side
//! view: pull count and cumulative reward, zeroed at reset.

use rand::distr::{Bernoulli, Distribution};
use rand::Rng;
use rand_distr::Normal;

use crate::error::{config_err, Result};

// Upper bound on the reward buffer reserved up front; larger batches grow on demand.
const PULL_PREALLOC: u64 = 1 << 16;

#[derive(Debug, Clone)]
enum RewardDist {
    Bernoulli(Bernoulli),
    Gaussian(Normal<f64>),
}

/// A single-distribution reward source.
#[derive(Debug, Clone)]
pub struct Arm {
    mean: f64,
    variance: f64,
    dist: RewardDist,
}

impl Arm {
    /// Bernoulli arm with success probability `mean` in `[0, 1]`.
    pub fn bernoulli(mean: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&mean) {
            return Err(config_err(format!(
                "Bernoulli mean {mean} is outside [0, 1]"
            )));
        }
        let dist = Bernoulli::new(mean).map_err(|e| config_err(e.to_string()))?;
        Ok(Self {
            mean,
            variance: mean * (1.0 - mean),
            dist: RewardDist::Bernoulli(dist),
        })
    }

    /// Gaussian arm with the given mean and variance (`variance > 0`).
    pub fn gaussian(mean: f64, variance: f64) -> Result<Self> {
        if !mean.is_finite() {
            return Err(config_err(format!("Gaussian mean {mean} is not finite")));
        }
        if !(variance.is_finite() && variance > 0.0) {
            return Err(config_err(format!(
                "Gaussian variance {variance} must be finite and positive"
            )));
        }
        let dist = Normal::new(mean, variance.sqrt()).map_err(|e| config_err(e.to_string()))?;
        Ok(Self {
            mean,
            variance,
            dist: RewardDist::Gaussian(dist),
        })
    }

    /// Expected reward.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Whether every reward this arm produces lies in `{0, 1}`.
    pub fn is_bernoulli(&self) -> bool {
        matches!(self.dist, RewardDist::Bernoulli(_))
    }

    /// Draw `pulls` i.i.d. rewards.
    pub fn pull<R: Rng + ?Sized>(&self, rng: &mut R, pulls: u64) -> Vec<f64> {
        let mut out = Vec::with_capacity(pulls.min(PULL_PREALLOC) as usize);
        for _ in 0..pulls {
            let r = match &self.dist {
                RewardDist::Bernoulli(d) => f64::from(u8::from(d.sample(&mut *rng))),
                RewardDist::Gaussian(d) => d.sample(&mut *rng),
            };
            out.push(r);
        }
        out
    }
}

/// Empirical information a learner keeps for one arm.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmArm {
    pub pulls: u64,
    pub rewards: f64,
}

impl EmArm {
    /// Empirical mean, or `None` before the first pull.
    pub fn em_mean(&self) -> Option<f64> {
        if self.pulls == 0 {
            None
        } else {
            Some(self.rewards / self.pulls as f64)
        }
    }

    /// Fold a batch of observed rewards into the statistics.
    pub fn update(&mut self, rewards: &[f64]) {
        self.pulls = self.pulls.saturating_add(rewards.len() as u64);
        self.rewards += rewards.iter().sum::<f64>();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn bernoulli_rejects_out_of_range_mean() {
        assert!(Arm::bernoulli(1.2).is_err());
        assert!(Arm::bernoulli(-0.1).is_err());
        assert!(Arm::bernoulli(f64::NAN).is_err());
        assert!(Arm::bernoulli(0.0).is_ok());
    }

    #[test]
    fn gaussian_rejects_non_positive_variance() {
        assert!(Arm::gaussian(0.0, 0.0).is_err());
        assert!(Arm::gaussian(0.0, -1.0).is_err());
        assert!(Arm::gaussian(f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn pull_returns_requested_number_of_binary_rewards() {
        let arm = Arm::bernoulli(0.3).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let rewards = arm.pull(&mut rng, 50);
        assert_eq!(rewards.len(), 50);
        assert!(rewards.iter().all(|&r| r == 0.0 || r == 1.0));
        assert_eq!(arm.mean(), 0.3);
    }

    #[test]
    fn gaussian_sample_mean_is_close_to_mean() {
        let arm = Arm::gaussian(2.0, 0.25).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let rewards = arm.pull(&mut rng, 20_000);
        let m = rewards.iter().sum::<f64>() / rewards.len() as f64;
        assert!((m - 2.0).abs() < 0.02, "m={m}");
        let v = rewards.iter().map(|r| (r - m).powi(2)).sum::<f64>() / rewards.len() as f64;
        assert!((v - arm.variance()).abs() < 0.01, "v={v}");
    }

    #[test]
    fn bernoulli_variance_and_large_batches() {
        let arm = Arm::bernoulli(0.25).unwrap();
        assert_eq!(arm.variance(), 0.1875);
        let mut rng = StdRng::seed_from_u64(3);
        let n = PULL_PREALLOC + 17;
        assert_eq!(arm.pull(&mut rng, n).len() as u64, n);
    }

    #[test]
    fn em_arm_tracks_batches() {
        let mut em = EmArm::default();
        assert_eq!(em.em_mean(), None);
        em.update(&[1.0, 0.0, 1.0]);
        em.update(&[1.0]);
        assert_eq!(em.pulls, 4);
        assert_eq!(em.em_mean(), Some(0.75));
        em.reset();
        assert_eq!(em, EmArm::default());
    }
}
