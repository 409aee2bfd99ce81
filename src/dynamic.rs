//! Dynamic environments
//!
//! Sentry-based change detection and the responses applied to the swarm
//! once a change is detected. Both run between iterations, never inside one.

use crate::config::{validate_fraction, SentryConfig};
use crate::error::SwarmResult;
use crate::particle::Particle;
use crate::problem::{Evaluator, Problem};
use crate::topology::Topology;
use rand::seq::index;
use rand::RngCore;
use std::collections::HashSet;
use tracing::info;

pub trait ChangeDetection<P: Problem>: Send + Sync {
    /// `true` when the objective appears to have changed since the sampled
    /// particles were last evaluated. Does not modify the topology.
    fn detect(
        &self,
        topology: &Topology,
        evaluator: &Evaluator<P>,
        iteration: usize,
        rng: &mut dyn RngCore,
    ) -> SwarmResult<bool>;
}

pub trait EnvironmentResponse<P: Problem>: Send + Sync {
    fn respond(
        &self,
        topology: &mut Topology,
        evaluator: &Evaluator<P>,
        rng: &mut dyn RngCore,
    ) -> SwarmResult<()>;
}

/// Every `interval` iterations, re-evaluates up to `sentries` distinct
/// particles drawn uniformly and reports a change when any re-evaluated
/// fitness differs from the stored one by more than `epsilon`.
#[derive(Clone, Debug)]
pub struct RandomSentryDetection {
    config: SentryConfig,
}

impl RandomSentryDetection {
    pub fn new(config: SentryConfig) -> SwarmResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SentryConfig {
        &self.config
    }
}

impl<P: Problem> ChangeDetection<P> for RandomSentryDetection {
    fn detect(
        &self,
        topology: &Topology,
        evaluator: &Evaluator<P>,
        iteration: usize,
        rng: &mut dyn RngCore,
    ) -> SwarmResult<bool> {
        if iteration % self.config.interval != 0 || topology.is_empty() {
            return Ok(false);
        }
        let count = self.config.sentries.min(topology.len());
        for i in index::sample(rng, topology.len(), count).iter() {
            let sentry = &topology.particles()[i];
            let current = evaluator.evaluate(sentry.position());
            if (current - sentry.fitness()).abs() > self.config.epsilon {
                info!(
                    "Environment change detected at iteration {} by sentry {} ({} -> {})",
                    iteration,
                    sentry.id(),
                    sentry.fitness(),
                    current
                );
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Re-evaluates the current position and the personal best of every
/// particle, then refreshes the neighbourhood bests.
#[derive(Clone, Debug, Default)]
pub struct ReevaluationResponse;

impl<P: Problem> EnvironmentResponse<P> for ReevaluationResponse {
    fn respond(
        &self,
        topology: &mut Topology,
        evaluator: &Evaluator<P>,
        _rng: &mut dyn RngCore,
    ) -> SwarmResult<()> {
        for particle in topology.particles_mut().iter_mut() {
            reevaluate(particle, evaluator);
        }
        topology.refresh_neighbourhood_bests();
        info!("Re-evaluated {} particles", topology.len());
        Ok(())
    }
}

/// Reinitialises `round(fraction * n)` randomly chosen particles (never the
/// current best) and re-evaluates the rest.
#[derive(Clone, Debug)]
pub struct ReinitialisationResponse {
    fraction: f64,
}

impl ReinitialisationResponse {
    pub fn new(fraction: f64) -> SwarmResult<Self> {
        validate_fraction("reinitialisation fraction", fraction)?;
        Ok(Self { fraction })
    }
}

impl<P: Problem> EnvironmentResponse<P> for ReinitialisationResponse {
    fn respond(
        &self,
        topology: &mut Topology,
        evaluator: &Evaluator<P>,
        rng: &mut dyn RngCore,
    ) -> SwarmResult<()> {
        let best = match topology.best() {
            Some(best) => best.id().index(),
            None => return Ok(()),
        };
        let candidates: Vec<usize> = (0..topology.len()).filter(|&i| i != best).collect();
        let count = ((self.fraction * topology.len() as f64).round() as usize).min(candidates.len());
        let chosen: HashSet<usize> = index::sample(rng, candidates.len(), count)
            .iter()
            .map(|k| candidates[k])
            .collect();

        for (i, particle) in topology.particles_mut().iter_mut().enumerate() {
            if chosen.contains(&i) {
                particle.reinitialise(evaluator, rng);
            } else {
                reevaluate(particle, evaluator);
            }
        }
        topology.refresh_neighbourhood_bests();
        info!(
            "Reinitialised {} of {} particles, kept best {}",
            chosen.len(),
            topology.len(),
            best
        );
        Ok(())
    }
}

/// Stale memory is replaced: the personal best takes its re-evaluated
/// fitness, or the current position when that is now better.
fn reevaluate<P: Problem>(particle: &mut Particle, evaluator: &Evaluator<P>) {
    let fitness = evaluator.evaluate(particle.position());
    particle.set_fitness(fitness);
    let best_position = particle.best_position().clone();
    let best_fitness = evaluator.evaluate(&best_position);
    if particle.direction().is_better(fitness, best_fitness) {
        let position = particle.position().clone();
        particle.set_personal_best(position, fitness);
    } else {
        particle.set_personal_best(best_position, best_fitness);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Behavior;
    use crate::init::{SwarmInitializer, UniformBehavior};
    use crate::particle::ParticleId;
    use crate::problem::{Bounds, Direction, SimpleProblem};
    use crate::topology::GlobalBest;
    use ndarray::{array, Array1};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    fn two_sentries() -> Topology {
        let bounds = Arc::new(Bounds::uniform(1, 0.0, 1.0).unwrap());
        let behavior = Behavior::builder("b").build();
        let particles = (0..2)
            .map(|i| {
                let mut p = Particle::new(
                    ParticleId(i),
                    array![i as f64],
                    array![0.0],
                    bounds.clone(),
                    behavior.clone(),
                    Direction::Minimise,
                )
                .unwrap();
                p.set_initial_fitness(10.0);
                p
            })
            .collect();
        Topology::new(particles, GlobalBest).unwrap()
    }

    fn shifted(first: f64) -> impl Fn(&Array1<f64>) -> f64 + Send + Sync {
        move |x: &Array1<f64>| if x[0] < 0.5 { first } else { 10.0 }
    }

    fn detector() -> RandomSentryDetection {
        RandomSentryDetection::new(SentryConfig {
            sentries: 2,
            epsilon: 0.01,
            interval: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_sentry_detects_change_above_epsilon() {
        let topology = two_sentries();
        let evaluator = Evaluator::new(SimpleProblem::new(shifted(10.02), 1, 0.0, 1.0)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(detector().detect(&topology, &evaluator, 0, &mut rng).unwrap());
        // detection leaves the stored fitness alone
        assert_eq!(topology.get(0).unwrap().fitness(), 10.0);
    }

    #[test]
    fn test_sentry_ignores_change_within_epsilon() {
        let topology = two_sentries();
        let evaluator = Evaluator::new(SimpleProblem::new(shifted(10.005), 1, 0.0, 1.0)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(!detector().detect(&topology, &evaluator, 0, &mut rng).unwrap());
        assert_eq!(evaluator.evaluations(), 2);
    }

    #[test]
    fn test_sentry_interval() {
        let topology = two_sentries();
        let evaluator = Evaluator::new(SimpleProblem::new(shifted(99.0), 1, 0.0, 1.0)).unwrap();
        let detector = RandomSentryDetection::new(SentryConfig {
            sentries: 2,
            epsilon: 0.01,
            interval: 3,
        })
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(!detector.detect(&topology, &evaluator, 4, &mut rng).unwrap());
        assert_eq!(evaluator.evaluations(), 0);
        assert!(detector.detect(&topology, &evaluator, 6, &mut rng).unwrap());
    }

    #[test]
    fn test_invalid_sentry_config() {
        let bad = SentryConfig {
            sentries: 0,
            ..SentryConfig::default()
        };
        assert!(RandomSentryDetection::new(bad).is_err());
        assert!(ReinitialisationResponse::new(0.0).is_err());
    }

    #[test]
    fn test_reevaluation_refreshes_memory() {
        let mut topology = two_sentries();
        let evaluator = Evaluator::new(SimpleProblem::new(shifted(20.0), 1, 0.0, 1.0)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        ReevaluationResponse.respond(&mut topology, &evaluator, &mut rng).unwrap();
        assert_eq!(topology.get(0).unwrap().best_fitness(), 20.0);
        assert_eq!(topology.get(1).unwrap().best_fitness(), 10.0);
        assert_eq!(topology.get(0).unwrap().neighbourhood_best(), Some(ParticleId(1)));
    }

    #[test]
    fn test_reinitialisation_preserves_best() {
        let evaluator =
            Evaluator::new(SimpleProblem::new(|x: &Array1<f64>| x.dot(x), 2, -5.0, 5.0)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut topology = SwarmInitializer::new(10, UniformBehavior::new(Behavior::builder("b").build()))
            .initialize(&evaluator, GlobalBest, &mut rng)
            .unwrap();
        let best = topology.best().unwrap().clone();

        ReinitialisationResponse::new(1.0)
            .unwrap()
            .respond(&mut topology, &evaluator, &mut rng)
            .unwrap();

        let kept = topology.get(best.id().index()).unwrap();
        assert_eq!(kept.position(), best.position());
        assert_eq!(kept.best_position(), best.best_position());
        assert_eq!(kept.best_fitness(), best.best_fitness());
        assert!(topology.iter().all(|p| p.bounds().contains(p.position())));
    }
}
