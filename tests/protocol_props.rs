//! Property tests for the learner/bandit protocol.

use banditsim::{
    ArmedBandit, Bandit, Goal, Learner, LilUcbConfig, LilUcbHeuristic, Moss, OrdinaryBandit,
    ProtocolConfig, SinglePlayerProtocol, SuccessiveRejects, ThompsonSampling, Ucb, UcbConfig,
    Uniform, UniformBai,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn means_strategy() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(0.0f64..=1.0, 2..7)
}

/// Drive `learner` by hand, returning the arm sequence and checking the regret
/// bookkeeping after every round.
fn drive<L: Learner<OrdinaryBandit>>(
    learner: &mut L,
    bandit: &mut OrdinaryBandit,
    seed: u64,
) -> Result<Vec<usize>, TestCaseError> {
    let mut rng = StdRng::seed_from_u64(seed);
    bandit.reset();
    learner.init(bandit).unwrap();
    let mut arms = Vec::new();
    let mut earned = 0.0;
    let mut last_pseudo = 0.0;
    while let Some(actions) = learner.actions(&(), &mut rng) {
        arms.push(actions[0].0);
        let fb = bandit.feed(&actions, &mut rng).unwrap();
        earned += fb.iter().flatten().sum::<f64>();
        learner.update(&actions, &fb).unwrap();

        let expected = bandit.best_mean() * bandit.total_pulls() as f64 - earned;
        let regret = bandit.regret(&Goal::MaxReward).unwrap();
        prop_assert!((regret - expected).abs() < 1e-9, "{regret} vs {expected}");
        let pseudo = bandit.pseudo_regret();
        prop_assert!(pseudo >= last_pseudo - 1e-12);
        last_pseudo = pseudo;
    }
    Ok(arms)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    /// Uniform plays `0, 1, .., K-1, 0, 1, ..` for exactly `horizon` rounds.
    #[test]
    fn uniform_is_round_robin(means in means_strategy(), horizon in 1u64..60, seed in any::<u64>()) {
        let mut bandit = OrdinaryBandit::bernoulli(&means).unwrap();
        let mut learner = Uniform::new(horizon).unwrap();
        let arms = drive(&mut learner, &mut bandit, seed)?;
        let k = means.len();
        let expected: Vec<usize> = (0..horizon as usize).map(|t| t % k).collect();
        prop_assert_eq!(arms, expected);
    }

    /// UCB, MOSS and TS each start with one pull per arm in index order.
    #[test]
    fn index_policies_warm_up_in_order(means in means_strategy(), seed in any::<u64>()) {
        let k = means.len();
        let horizon = 3 * k as u64;
        let warm: Vec<usize> = (0..k).collect();

        let mut bandit = OrdinaryBandit::bernoulli(&means).unwrap();
        let mut ucb = Ucb::new(horizon, UcbConfig::default()).unwrap();
        let arms = drive(&mut ucb, &mut bandit, seed)?;
        prop_assert_eq!(&arms[..k], &warm[..]);

        let mut moss = Moss::new(horizon).unwrap();
        let arms = drive(&mut moss, &mut bandit, seed)?;
        prop_assert_eq!(&arms[..k], &warm[..]);

        let mut ts = ThompsonSampling::new(horizon).unwrap();
        let arms = drive(&mut ts, &mut bandit, seed)?;
        prop_assert_eq!(&arms[..k], &warm[..]);
        prop_assert_eq!(arms.len() as u64, horizon);
    }

    /// The same seed replays the same records.
    #[test]
    fn seeded_trials_replay_exactly(means in means_strategy(), seed in any::<u64>()) {
        let protocol = SinglePlayerProtocol::new(ProtocolConfig {
            intermediate_rounds: vec![0, 10, 40],
        });
        let run = || {
            let mut bandit = OrdinaryBandit::bernoulli(&means).unwrap();
            let mut learner = ThompsonSampling::new(80).unwrap();
            protocol.run_trial(&mut bandit, &mut learner, seed).unwrap()
        };
        let first = run();
        prop_assert_eq!(first.len(), 4);
        prop_assert_eq!(first, run());
    }

    /// Best-arm identification records carry a `{0, 1}` regret.
    #[test]
    fn bai_regret_is_an_indicator(means in means_strategy(), budget in 10u64..200, seed in any::<u64>()) {
        let protocol = SinglePlayerProtocol::default();
        let mut bandit = OrdinaryBandit::bernoulli(&means).unwrap();

        let mut uniform = UniformBai::new(budget);
        let r = protocol.run_trial(&mut bandit, &mut uniform, seed).unwrap();
        prop_assert!(r[0].regret == 0.0 || r[0].regret == 1.0);
        prop_assert_eq!(r[0].total_actions, budget);

        let mut sr = SuccessiveRejects::new(budget);
        let r = protocol.run_trial(&mut bandit, &mut sr, seed).unwrap();
        prop_assert!(r[0].regret == 0.0 || r[0].regret == 1.0);
        prop_assert!(r[0].total_actions <= budget);
    }
}

#[test]
fn lil_ucb_declares_through_the_protocol() {
    let protocol = SinglePlayerProtocol::default();
    let mut bandit = OrdinaryBandit::bernoulli(&[0.1, 0.2, 0.95]).unwrap();
    let mut lil = LilUcbHeuristic::new(0.05, LilUcbConfig::default()).unwrap();
    let records = protocol.run_trial(&mut bandit, &mut lil, 2).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].regret, 0.0);
    assert_eq!(records[0].total_actions, bandit.total_pulls());
}
