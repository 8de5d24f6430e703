//! LinUCB over a fixed linear arm set.
//!
//! All arms share one ridge-regression model of `θ`: `A = λI + Σ x xᵀ` and
//! `b = Σ r x`, summed over every observed reward. The index of arm `i` with feature
//! `x_i` is `x_i · θ̂ + α sqrt(x_iᵀ A⁻¹ x_i)` where `θ̂ = A⁻¹ b`.
//!
//! `A⁻¹` is kept directly and refreshed with a Sherman–Morrison rank-1 update per
//! reward, so no matrix is ever inverted.

use rand::rngs::StdRng;

use crate::error::{config_err, Error, Result};
use crate::learner::{argmax, ensure_horizon, ensure_kind, pull_once, warm_up_arm};
use crate::linear::dot;
use crate::{ArmPulls, ArmRecords, ArmRewards, ArmedBandit, BanditKind, Goal, Learner};

/// Configuration for [`LinUcb`].
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinUcbConfig {
    /// Exploration strength (alpha, must be finite and >= 0).
    pub alpha: f64,
    /// Ridge regularization parameter (lambda, must be finite and > 0).
    pub lambda: f64,
}

impl Default for LinUcbConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            lambda: 1.0,
        }
    }
}

/// Per-arm score tuple: `(ucb, mean, bonus)`.
pub type LinUcbScore = (f64, f64, f64);

#[derive(Debug, Clone, Default)]
struct RidgeState {
    // A^{-1} (d x d, row major).
    a_inv: Vec<f64>,
    // b vector (d).
    b: Vec<f64>,
}

impl RidgeState {
    fn new(dim: usize, lambda: f64) -> Self {
        let mut a_inv = vec![0.0; dim * dim];
        for i in 0..dim {
            a_inv[i * dim + i] = 1.0 / lambda;
        }
        Self {
            a_inv,
            b: vec![0.0; dim],
        }
    }

    fn dim(&self) -> usize {
        self.b.len()
    }

    fn observe(&mut self, x: &[f64], reward: f64) {
        let d = self.dim();
        // A^{-1} <- A^{-1} - (A^{-1} x x^T A^{-1}) / (1 + x^T A^{-1} x)
        let ax = mat_vec(&self.a_inv, d, x);
        let denom = 1.0 + dot(x, &ax);
        if denom.is_finite() && denom > 1e-12 {
            for i in 0..d {
                for j in 0..d {
                    self.a_inv[i * d + j] -= (ax[i] * ax[j]) / denom;
                }
            }
        }
        for (bi, xi) in self.b.iter_mut().zip(x) {
            *bi += reward * xi;
        }
    }
}

fn mat_vec(a: &[f64], dim: usize, x: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; dim];
    for (i, o) in out.iter_mut().enumerate() {
        let row = &a[i * dim..(i + 1) * dim];
        *o = dot(row, x);
    }
    out
}

/// Shared-parameter LinUCB.
#[derive(Debug, Clone)]
pub struct LinUcb {
    cfg: LinUcbConfig,
    horizon: u64,
    features: Vec<Vec<f64>>,
    state: RidgeState,
    records: ArmRecords,
}

impl LinUcb {
    pub fn new(horizon: u64, cfg: LinUcbConfig) -> Result<Self> {
        ensure_horizon(horizon)?;
        if !(cfg.alpha.is_finite() && cfg.alpha >= 0.0) {
            return Err(config_err(format!(
                "LinUCB alpha {} must be finite and non-negative",
                cfg.alpha
            )));
        }
        if !(cfg.lambda.is_finite() && cfg.lambda > 0.0) {
            return Err(config_err(format!(
                "LinUCB lambda {} must be finite and positive",
                cfg.lambda
            )));
        }
        Ok(Self {
            cfg,
            horizon,
            features: Vec::new(),
            state: RidgeState::default(),
            records: ArmRecords::default(),
        })
    }

    pub fn records(&self) -> &ArmRecords {
        &self.records
    }

    /// Ridge estimate `A⁻¹ b`.
    pub fn theta(&self) -> Vec<f64> {
        mat_vec(&self.state.a_inv, self.state.dim(), &self.state.b)
    }

    /// Per-arm `(ucb, mean, bonus)` under the current model.
    pub fn scores(&self) -> Vec<LinUcbScore> {
        let d = self.state.dim();
        let theta = self.theta();
        self.features
            .iter()
            .map(|x| {
                let mean = dot(&theta, x);
                let var = dot(x, &mat_vec(&self.state.a_inv, d, x)).max(0.0);
                let bonus = self.cfg.alpha * var.sqrt();
                (mean + bonus, mean, bonus)
            })
            .collect()
    }
}

impl<B: ArmedBandit> Learner<B> for LinUcb {
    fn name(&self) -> &str {
        "LinUCB"
    }

    fn goal(&self) -> Goal {
        Goal::MaxReward
    }

    fn init(&mut self, bandit: &B) -> Result<()> {
        ensure_kind("LinUCB", bandit.kind(), &[BanditKind::Linear])?;
        let Some(features) = bandit.features() else {
            return Err(Error::IncompatibleBandit {
                learner: "LinUCB".to_string(),
                bandit: bandit.kind(),
            });
        };
        self.features = features.to_vec();
        self.records = ArmRecords::new(bandit.arm_num());
        <Self as Learner<B>>::reset(self);
        Ok(())
    }

    fn reset(&mut self) {
        let dim = self.features.first().map_or(0, Vec::len);
        self.state = RidgeState::new(dim, self.cfg.lambda);
        self.records.reset();
    }

    fn actions(&mut self, _context: &(), _rng: &mut StdRng) -> Option<ArmPulls> {
        if self.records.arm_num() == 0 || self.records.rounds() >= self.horizon {
            return None;
        }
        if let Some(arm) = warm_up_arm(&self.records) {
            return Some(pull_once(arm));
        }
        let ucb: Vec<f64> = self.scores().into_iter().map(|s| s.0).collect();
        Some(pull_once(argmax(&ucb)))
    }

    fn update(&mut self, actions: &ArmPulls, feedback: &ArmRewards) -> Result<()> {
        self.records.record(actions, feedback)?;
        for (&(arm, _), rewards) in actions.iter().zip(feedback) {
            for &r in rewards {
                self.state.observe(&self.features[arm], r);
            }
        }
        Ok(())
    }
}
