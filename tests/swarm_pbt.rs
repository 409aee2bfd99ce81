use heteroswarm::adaptive::{
    AdaptiveHeterogeneousIteration, BehaviorSelector, PersonalBestStagnation, SuccessWindow,
    TournamentSelector,
};
use heteroswarm::behavior::{Behavior, BehaviorPool, BehaviorRef, ClampBoundary, ReflectBoundary};
use heteroswarm::init::{RandomFromPool, SwarmInitializer};
use heteroswarm::iteration::IterationStrategy;
use heteroswarm::problem::{Evaluator, SimpleProblem};
use heteroswarm::topology::{GlobalBest, Ring};
use ndarray::Array1;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

prop_compose! {
    fn arb_history()(
        window_size in 1usize..8,
        counts in prop::collection::vec(0usize..50, 1..40)
    ) -> (usize, Vec<usize>) {
        (window_size, counts)
    }
}

fn rastrigin(x: &Array1<f64>) -> f64 {
    10.0 * x.len() as f64
        + x.iter()
            .map(|v| v * v - 10.0 * (2.0 * std::f64::consts::PI * v).cos())
            .sum::<f64>()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_window_sum_is_last_window_size_counts((window_size, counts) in arb_history()) {
        let mut window = SuccessWindow::new(window_size).unwrap();
        for (i, &c) in counts.iter().enumerate() {
            window.record(i, c);
            let expected: usize = counts[..=i].iter().rev().take(window_size).sum();
            prop_assert_eq!(window.sum(), expected);
        }
    }

    #[test]
    fn test_personal_bests_are_monotone(seed in any::<u64>(), maximise in any::<bool>()) {
        let problem = SimpleProblem::new(rastrigin, 3, -5.12, 5.12);
        let problem = if maximise { problem.maximise() } else { problem };
        let evaluator = Evaluator::new(problem).unwrap();
        let pool = BehaviorPool::classic(Arc::new(ReflectBoundary));
        let mut engine = AdaptiveHeterogeneousIteration::new(
            pool.clone(),
            4,
            PersonalBestStagnation::new(2),
            TournamentSelector::default(),
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut topology = SwarmInitializer::new(10, RandomFromPool::new(pool))
            .initialize(&evaluator, Ring::default(), &mut rng)
            .unwrap();

        for i in 0..15 {
            let before: Vec<f64> = topology.iter().map(|p| p.best_fitness()).collect();
            let outcome = engine.iterate(&mut topology, &evaluator, i, &mut rng).unwrap();
            for ((p, old), improved) in topology.iter().zip(before).zip(outcome.improved) {
                let better = evaluator.direction().is_better(p.best_fitness(), old);
                prop_assert!(better || p.best_fitness() == old);
                prop_assert_eq!(improved, better);
                prop_assert!(p.bounds().contains(p.position()));
            }
        }
    }

    #[test]
    fn test_window_resize_zeroes_weights(seed in any::<u64>(), new_size in 1usize..12) {
        let evaluator =
            Evaluator::new(SimpleProblem::new(|x: &Array1<f64>| x.dot(x), 2, -5.0, 5.0)).unwrap();
        let pool = BehaviorPool::classic(Arc::new(ClampBoundary));
        let mut engine = AdaptiveHeterogeneousIteration::new(
            pool.clone(),
            3,
            PersonalBestStagnation::new(1),
            TournamentSelector::default(),
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut topology = SwarmInitializer::new(8, RandomFromPool::new(pool.clone()))
            .initialize(&evaluator, GlobalBest, &mut rng)
            .unwrap();
        for i in 0..5 {
            engine.iterate(&mut topology, &evaluator, i, &mut rng).unwrap();
        }

        engine.set_window_size(new_size).unwrap();
        prop_assert_eq!(engine.window_size(), new_size);
        for b in 0..pool.len() {
            prop_assert_eq!(engine.aggregated_weight(b), Some(0));
        }
        prop_assert!(engine.weights().iter().all(|w| *w == 0.0));
    }

    #[test]
    fn test_tournament_returns_pool_member(
        seed in any::<u64>(),
        weights in prop::collection::vec(0.0f64..100.0, 1..10),
        fraction in 0.05f64..=1.0
    ) {
        let behaviors: Vec<BehaviorRef> = (0..weights.len())
            .map(|i| Behavior::builder(format!("b{}", i)).build())
            .collect();
        let selector = TournamentSelector::new(fraction).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let chosen = selector.select(&behaviors, &weights, &mut rng).unwrap();
        prop_assert!(behaviors.iter().any(|b| Behavior::same(b, &chosen)));

        // a full tournament always picks the heaviest
        let full = TournamentSelector::new(1.0).unwrap();
        let chosen = full.select(&behaviors, &weights, &mut rng).unwrap();
        let heaviest = weights.iter().cloned().fold(f64::MIN, f64::max);
        let index = behaviors.iter().position(|b| Behavior::same(b, &chosen)).unwrap();
        prop_assert_eq!(weights[index], heaviest);
    }
}
