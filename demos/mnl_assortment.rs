//! Exploration-exploitation on an MNL assortment bandit with a cardinality limit.

use banditsim::{
    search_best_assortment, ExplorationExploitation, MnlBandit, ProtocolConfig, Result,
    SinglePlayerProtocol,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let abspar = vec![0.9, 0.8, 0.3, 0.6, 0.2, 0.7];
    let revenues = vec![1.0, 1.5, 4.0, 2.0, 5.0, 1.2];
    let card_limit = Some(3);

    let weights: Vec<f64> = std::iter::once(1.0).chain(abspar.iter().copied()).collect();
    let prices: Vec<f64> = std::iter::once(0.0).chain(revenues.iter().copied()).collect();
    let (value, assortment) = search_best_assortment(&weights, &prices, card_limit)?;
    println!("optimal assortment {assortment:?} earns {value:.4} per round");

    let horizon = 5_000;
    let protocol = SinglePlayerProtocol::new(ProtocolConfig {
        intermediate_rounds: vec![500, 1_000, 2_000, 3_000, 4_000],
    });
    let mut bandit = MnlBandit::new(abspar, revenues, card_limit)?;
    let mut learner = ExplorationExploitation::new(horizon)?;
    let records = protocol.run_trial(&mut bandit, &mut learner, 2024)?;

    println!("{:>8} {:>12} {:>16}", "round", "regret", "regret / round");
    for r in &records {
        let per_round = if r.rounds == 0 { 0.0 } else { r.regret / r.rounds as f64 };
        println!("{:>8} {:>12.2} {:>16.4}", r.rounds, r.regret, per_round);
    }
    println!("final offer {:?}", learner.assortment());
    Ok(())
}
