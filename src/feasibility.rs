//! Competitive-arm test for correlated (linear) bandits.
//!
//! Given the most-pulled arm `k_max` with empirical mean `mu` and confidence radius
//! `rho`, arm `k` is *competitive* if some parameter `θ` satisfies
//!
//! ```text
//!   |f_kmax · θ − mu| ≤ rho,   ‖θ‖₂ ≤ 1,   f_k · θ ≥ f_j · θ  for all j ≠ k
//! ```
//!
//! Each test is posed as a second-order cone program that minimizes `‖θ‖₂` over the
//! polyhedron formed by the linear constraints and solved with Clarabel. The arm is
//! competitive iff the program is feasible with optimal norm at most `1 + tol`.
//! A solver outcome that neither proves infeasibility nor produces a solution keeps
//! the arm competitive, so a true best arm is never excluded by numerical trouble.

#![allow(non_snake_case)]

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettings, DefaultSolver, IPSolver, NonnegativeConeT, SecondOrderConeT, SolverStatus,
    SupportedConeT,
};

/// One linear constraint `g · θ ≥ h`.
#[derive(Debug, Clone, PartialEq)]
pub struct HalfSpace {
    pub g: Vec<f64>,
    pub h: f64,
}

/// Whether some `θ` with `‖θ‖₂ ≤ 1 + tol` satisfies every half-space.
pub fn unit_ball_feasible(dim: usize, constraints: &[HalfSpace], tol: f64) -> bool {
    // Decision variables: x = (θ_0, .., θ_{d-1}, t); minimize t subject to ‖θ‖₂ ≤ t.
    let n = dim + 1;
    let mut q = vec![0.0; n];
    q[dim] = 1.0;
    let P = CscMatrix::new_from_triplets(n, n, vec![], vec![], vec![]);

    // Constraints Ax + s = b, s ∈ K.
    let mut A_rows: Vec<Vec<f64>> = Vec::new();
    let mut b: Vec<f64> = Vec::new();
    let mut cones: Vec<SupportedConeT<f64>> = Vec::new();

    // s = g·θ − h ≥ 0
    for c in constraints {
        let mut row = vec![0.0; n];
        for (r, g) in row.iter_mut().zip(&c.g) {
            *r = -g;
        }
        A_rows.push(row);
        b.push(-c.h);
    }
    if !constraints.is_empty() {
        cones.push(NonnegativeConeT(constraints.len()));
    }

    // s = (t, θ) in the second-order cone.
    let mut row = vec![0.0; n];
    row[dim] = -1.0;
    A_rows.push(row);
    b.push(0.0);
    for i in 0..dim {
        let mut row = vec![0.0; n];
        row[i] = -1.0;
        A_rows.push(row);
        b.push(0.0);
    }
    cones.push(SecondOrderConeT(dim + 1));

    let A = CscMatrix::from(&A_rows);
    let settings = DefaultSettings::<f64> {
        verbose: false,
        ..Default::default()
    };
    let mut solver = match DefaultSolver::new(&P, &q, &A, &b, &cones, settings) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = ?e, "could not build feasibility program; keeping arm");
            return true;
        }
    };
    solver.solve();

    match solver.solution.status {
        SolverStatus::Solved | SolverStatus::AlmostSolved => {
            let theta = &solver.solution.x[..dim];
            let norm = theta.iter().map(|v| v * v).sum::<f64>().sqrt();
            norm <= 1.0 + tol
        }
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => false,
        status => {
            tracing::warn!(?status, "inconclusive feasibility solve; keeping arm");
            true
        }
    }
}

/// For every arm, whether it can be the best arm under some `θ` in the confidence set
/// around `k_max`.
pub fn competitive_arms(
    features: &[Vec<f64>],
    k_max: usize,
    mu_kmax: f64,
    radius: f64,
    tol: f64,
) -> Vec<bool> {
    let Some(f_max) = features.get(k_max) else {
        return vec![true; features.len()];
    };
    let dim = f_max.len();

    // |f_kmax·θ − mu| ≤ radius
    let mut base = vec![
        HalfSpace {
            g: f_max.clone(),
            h: mu_kmax - radius,
        },
        HalfSpace {
            g: f_max.iter().map(|v| -v).collect(),
            h: -mu_kmax - radius,
        },
    ];
    let base_len = base.len();

    let mut out = Vec::with_capacity(features.len());
    for (k, f_k) in features.iter().enumerate() {
        base.truncate(base_len);
        for (j, f_j) in features.iter().enumerate() {
            if j == k {
                continue;
            }
            let g: Vec<f64> = f_k.iter().zip(f_j).map(|(a, b)| a - b).collect();
            // Identical features impose nothing.
            if g.iter().all(|v| *v == 0.0) {
                continue;
            }
            base.push(HalfSpace { g, h: 0.0 });
        }
        out.push(unit_ball_feasible(dim, &base, tol));
    }
    out
}
