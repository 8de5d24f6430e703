//! Epoch-based exploration-exploitation for the MNL bandit.
//!
//! The learner offers one assortment for a whole epoch, which ends at the first
//! no-purchase. Each epoch contributes one unbiased sample of `v_i` per offered
//! product (the number of times `i` was bought in the epoch). When an epoch closes,
//! optimistic weights are refreshed and the next assortment is solved from them
//! inside `update`, so a failed solve surfaces as an error of that round.

use rand::rngs::StdRng;

use crate::error::{action_err, Result};
use crate::learner::ensure_horizon;
use crate::{search_best_assortment, Bandit, Goal, Learner, MnlBandit, MnlFeedback};

/// MNL exploration-exploitation learner.
#[derive(Debug, Clone)]
pub struct ExplorationExploitation {
    horizon: u64,
    revenues: Vec<f64>,
    card_limit: Option<usize>,

    rounds: u64,
    epoch: u64,
    v_ucb: Vec<f64>,
    purchases: Vec<f64>,
    exposures: Vec<f64>,
    assortment: Vec<usize>,
    first_offer: Vec<usize>,
}

impl ExplorationExploitation {
    pub fn new(horizon: u64) -> Result<Self> {
        ensure_horizon(horizon)?;
        Ok(Self {
            horizon,
            revenues: Vec::new(),
            card_limit: None,
            rounds: 0,
            epoch: 1,
            v_ucb: Vec::new(),
            purchases: Vec::new(),
            exposures: Vec::new(),
            assortment: Vec::new(),
            first_offer: Vec::new(),
        })
    }

    /// Current epoch index, starting at 1.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Optimistic weights; index 0 is the no-purchase option.
    pub fn v_ucb(&self) -> &[f64] {
        &self.v_ucb
    }

    /// Assortment offered during the current epoch.
    pub fn assortment(&self) -> &[usize] {
        &self.assortment
    }

    fn product_num(&self) -> usize {
        self.v_ucb.len().saturating_sub(1)
    }

    fn solve(&self) -> Result<Vec<usize>> {
        let (_, assortment) = search_best_assortment(&self.v_ucb, &self.revenues, self.card_limit)?;
        Ok(assortment)
    }

    fn refresh_weights(&mut self) {
        let n = self.product_num() as f64;
        let log_term = 48.0 * (n.sqrt() * self.epoch as f64 + 1.0).ln();
        for i in 1..self.v_ucb.len() {
            let t = self.exposures[i];
            self.v_ucb[i] = if t > 0.0 {
                let v_bar = self.purchases[i] / t;
                let tmp = log_term / t;
                v_bar + (v_bar * tmp).sqrt() + tmp
            } else {
                1.0
            };
        }
    }
}

impl Learner<MnlBandit> for ExplorationExploitation {
    fn name(&self) -> &str {
        "Exploration-Exploitation"
    }

    fn goal(&self) -> Goal {
        Goal::MaxReward
    }

    fn init(&mut self, bandit: &MnlBandit) -> Result<()> {
        self.revenues = bandit.context();
        self.card_limit = bandit.card_limit();
        self.v_ucb = vec![1.0; bandit.product_num() + 1];
        self.first_offer = self.solve()?;
        Learner::<MnlBandit>::reset(self);
        Ok(())
    }

    fn reset(&mut self) {
        let len = self.v_ucb.len();
        self.rounds = 0;
        self.epoch = 1;
        self.v_ucb = vec![1.0; len];
        self.purchases = vec![0.0; len];
        self.exposures = vec![0.0; len];
        self.assortment = self.first_offer.clone();
    }

    fn actions(&mut self, _context: &Vec<f64>, _rng: &mut StdRng) -> Option<Vec<usize>> {
        if self.v_ucb.len() < 2 || self.rounds >= self.horizon {
            return None;
        }
        Some(self.assortment.clone())
    }

    fn update(&mut self, _actions: &Vec<usize>, feedback: &MnlFeedback) -> Result<()> {
        let purchase = feedback.purchase;
        if purchase >= self.purchases.len() {
            return Err(action_err(format!(
                "purchase {purchase} is not a known product"
            )));
        }
        self.rounds += 1;
        self.purchases[purchase] += 1.0;
        if purchase == 0 {
            for &p in &self.assortment {
                self.exposures[p] += 1.0;
            }
            self.refresh_weights();
            self.epoch += 1;
            self.assortment = self.solve()?;
            tracing::debug!(
                epoch = self.epoch,
                v_ucb = ?self.v_ucb,
                assortment = ?self.assortment,
                "mnl epoch closed"
            );
        }
        Ok(())
    }
}
