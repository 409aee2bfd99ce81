//! Behavior selectors
//!
//! Given the pool and one aggregated success weight per pool entry, pick
//! the behavior a reassigned particle switches to. Selectors are pure apart
//! from drawing on the supplied random source, and fail before drawing
//! anything when the pool is empty.

use crate::behavior::BehaviorRef;
use crate::config::validate_fraction;
use crate::error::{SwarmError, SwarmResult};
use rand::seq::index;
use rand::{Rng, RngCore};
use std::sync::Arc;
use tracing::warn;

pub trait BehaviorSelector: Send + Sync {
    fn select(
        &self,
        behaviors: &[BehaviorRef],
        weights: &[f64],
        rng: &mut dyn RngCore,
    ) -> SwarmResult<BehaviorRef>;
}

fn check_inputs(behaviors: &[BehaviorRef], weights: &[f64]) -> SwarmResult<()> {
    if behaviors.is_empty() {
        return Err(SwarmError::config("cannot select from an empty behavior pool"));
    }
    if weights.len() != behaviors.len() {
        return Err(SwarmError::DimensionMismatch {
            what: "behavior weights",
            expected: behaviors.len(),
            found: weights.len(),
        });
    }
    Ok(())
}

/// Tournament over a uniform sample without replacement of
/// `round(fraction * pool size)` behaviors (at least one). The heaviest
/// sampled behavior wins; ties go to the earliest sampled.
#[derive(Clone, Debug)]
pub struct TournamentSelector {
    fraction: f64,
}

impl TournamentSelector {
    pub fn new(fraction: f64) -> SwarmResult<Self> {
        validate_fraction("tournament_fraction", fraction)?;
        Ok(Self { fraction })
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn tournament_size(&self, pool_size: usize) -> usize {
        ((self.fraction * pool_size as f64).round() as usize).clamp(1, pool_size.max(1))
    }
}

impl Default for TournamentSelector {
    fn default() -> Self {
        Self { fraction: 0.4 }
    }
}

impl BehaviorSelector for TournamentSelector {
    fn select(
        &self,
        behaviors: &[BehaviorRef],
        weights: &[f64],
        rng: &mut dyn RngCore,
    ) -> SwarmResult<BehaviorRef> {
        check_inputs(behaviors, weights)?;
        let size = self.tournament_size(behaviors.len());
        let sample = index::sample(rng, behaviors.len(), size);

        let mut winner: Option<usize> = None;
        for i in sample.iter() {
            match winner {
                Some(w) if weights[i] <= weights[w] => {}
                _ => winner = Some(i),
            }
        }
        // the sample is never empty
        let w = winner.unwrap_or(0);
        Ok(Arc::clone(&behaviors[w]))
    }
}

/// Success-proportional (roulette wheel) selection. Falls back to a
/// uniform draw when no behavior has positive weight.
#[derive(Clone, Debug, Default)]
pub struct RouletteWheelSelector;

impl BehaviorSelector for RouletteWheelSelector {
    fn select(
        &self,
        behaviors: &[BehaviorRef],
        weights: &[f64],
        rng: &mut dyn RngCore,
    ) -> SwarmResult<BehaviorRef> {
        check_inputs(behaviors, weights)?;
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            warn!("All behavior weights are zero, selecting uniformly");
            let i = rng.gen_range(0..behaviors.len());
            return Ok(Arc::clone(&behaviors[i]));
        }

        let mut target = rng.gen::<f64>() * total;
        for (behavior, &weight) in behaviors.iter().zip(weights) {
            if weight <= 0.0 {
                continue;
            }
            if target < weight {
                return Ok(Arc::clone(behavior));
            }
            target -= weight;
        }
        // rounding left us past the end: take the last positive entry
        let last = weights.iter().rposition(|w| *w > 0.0).unwrap_or(0);
        Ok(Arc::clone(&behaviors[last]))
    }
}

/// Uniform selection, ignoring weights.
#[derive(Clone, Debug, Default)]
pub struct RandomSelector;

impl BehaviorSelector for RandomSelector {
    fn select(
        &self,
        behaviors: &[BehaviorRef],
        weights: &[f64],
        rng: &mut dyn RngCore,
    ) -> SwarmResult<BehaviorRef> {
        check_inputs(behaviors, weights)?;
        let i = rng.gen_range(0..behaviors.len());
        Ok(Arc::clone(&behaviors[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Behavior;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pool(n: usize) -> Vec<BehaviorRef> {
        (0..n)
            .map(|i| Behavior::builder(format!("B{}", i + 1)).build())
            .collect()
    }

    fn names(picks: &[BehaviorRef]) -> Vec<String> {
        picks.iter().map(|b| b.name().to_string()).collect()
    }

    #[test]
    fn test_tournament_size() {
        let s = TournamentSelector::default();
        assert_eq!(s.tournament_size(1), 1);
        assert_eq!(s.tournament_size(2), 1);
        assert_eq!(s.tournament_size(5), 2);
        assert_eq!(s.tournament_size(10), 4);
        assert_eq!(TournamentSelector::new(1.0).unwrap().tournament_size(3), 3);
        assert!(TournamentSelector::new(0.0).is_err());
        assert!(TournamentSelector::new(1.01).is_err());
    }

    #[test]
    fn test_full_tournament_picks_heaviest() {
        let behaviors = pool(3);
        let selector = TournamentSelector::new(1.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..20 {
            let pick = selector.select(&behaviors, &[1.0, 5.0, 2.0], &mut rng).unwrap();
            assert!(Behavior::same(&pick, &behaviors[1]));
        }
    }

    #[test]
    fn test_tournament_ties_go_to_first_sampled() {
        let behaviors = pool(5);
        let weights = [2.0; 5];
        let mut past_first_entry = 0;
        for fraction in [0.4, 1.0] {
            let selector = TournamentSelector::new(fraction).unwrap();
            let size = selector.tournament_size(behaviors.len());
            for seed in 0..20 {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let mut replay = rng.clone();
                let replay: &mut dyn RngCore = &mut replay;
                let first = rand::seq::index::sample(replay, behaviors.len(), size).index(0);

                let pick = selector.select(&behaviors, &weights, &mut rng).unwrap();
                assert!(Behavior::same(&pick, &behaviors[first]));
                if first != 0 {
                    past_first_entry += 1;
                }
            }
        }
        // the winner follows sample order, not pool order
        assert!(past_first_entry > 0);
    }

    #[test]
    fn test_selection_is_deterministic_under_seed() {
        let behaviors = pool(3);
        let weights = [3.0, 1.0, 2.0];
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let picks: Vec<BehaviorRef> = (0..25)
                .map(|_| {
                    TournamentSelector::default()
                        .select(&behaviors, &weights, &mut rng)
                        .unwrap()
                })
                .collect();
            names(&picks)
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_empty_pool_fails_without_drawing() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut untouched = rng.clone();
        let selectors: Vec<Box<dyn BehaviorSelector>> = vec![
            Box::new(TournamentSelector::default()),
            Box::new(RouletteWheelSelector),
            Box::new(RandomSelector),
        ];
        for selector in &selectors {
            let err = selector.select(&[], &[], &mut rng).unwrap_err();
            assert!(matches!(err, SwarmError::Configuration(_)));
        }
        assert_eq!(rng.next_u64(), untouched.next_u64());
    }

    #[test]
    fn test_weight_length_mismatch() {
        let behaviors = pool(2);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let err = TournamentSelector::default()
            .select(&behaviors, &[1.0], &mut rng)
            .unwrap_err();
        assert!(matches!(err, SwarmError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_roulette_never_picks_zero_weight() {
        let behaviors = pool(3);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            let pick = RouletteWheelSelector
                .select(&behaviors, &[0.0, 2.0, 1.0], &mut rng)
                .unwrap();
            assert!(!Behavior::same(&pick, &behaviors[0]));
        }
        // all zero still selects something
        assert!(RouletteWheelSelector
            .select(&behaviors, &[0.0, 0.0, 0.0], &mut rng)
            .is_ok());
    }
}
