//! Average regret of Uniform, UCB, MOSS and Thompson sampling on a three-arm
//! Bernoulli bandit, printed every 200 rounds.
//!
//! `RUST_LOG=banditsim=info cargo run --example regret_comparison` shows per-trial logs.

use banditsim::{
    Learner, Moss, OrdinaryBandit, ProtocolConfig, Result, SinglePlayerProtocol,
    ThompsonSampling, TrialRecord, Ucb, UcbConfig, Uniform,
};
use tracing_subscriber::EnvFilter;

const MEANS: [f64; 3] = [0.3, 0.5, 0.7];
const HORIZON: u64 = 2_000;
const GAP: u64 = 200;
const TRIALS: u64 = 100;

fn average<L, F>(protocol: &SinglePlayerProtocol, make: F) -> Result<(String, Vec<f64>)>
where
    L: Learner<OrdinaryBandit>,
    F: Fn() -> Result<L> + Sync,
{
    let seeds: Vec<u64> = (0..TRIALS).collect();
    let trials: Vec<Vec<TrialRecord>> =
        protocol.run_trials(&seeds, || Ok((OrdinaryBandit::bernoulli(&MEANS)?, make()?)))?;

    let name = trials
        .first()
        .and_then(|t| t.first())
        .map(|r| r.learner.clone())
        .unwrap_or_default();
    let points = trials.first().map_or(0, Vec::len);
    let mut sums = vec![0.0; points];
    for records in &trials {
        for (s, r) in sums.iter_mut().zip(records) {
            *s += r.regret;
        }
    }
    Ok((name, sums.into_iter().map(|s| s / TRIALS as f64).collect()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let protocol = SinglePlayerProtocol::new(ProtocolConfig {
        intermediate_rounds: (1..HORIZON / GAP).map(|i| i * GAP).collect(),
    });

    let rows = vec![
        average(&protocol, || Uniform::new(HORIZON))?,
        average(&protocol, || Ucb::new(HORIZON, UcbConfig::default()))?,
        average(&protocol, || Moss::new(HORIZON))?,
        average(&protocol, || ThompsonSampling::new(HORIZON))?,
    ];

    print!("{:>8}", "round");
    for (name, _) in &rows {
        print!("{name:>20}");
    }
    println!();
    let points = rows.first().map_or(0, |(_, v)| v.len());
    for i in 0..points {
        print!("{:>8}", (i as u64 + 1) * GAP);
        for (_, regrets) in &rows {
            print!("{:>20.2}", regrets[i]);
        }
        println!();
    }
    Ok(())
}
