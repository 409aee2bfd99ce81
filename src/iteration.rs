//! Iteration strategies
//!
//! One call to [`IterationStrategy::iterate`] advances the whole topology by
//! one generation.

use crate::behavior::BehaviorPool;
use crate::error::SwarmResult;
use crate::measurement::BehaviorStats;
use crate::particle::Particle;
use crate::problem::{Evaluator, Problem};
use crate::topology::Topology;
use ndarray::Array1;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::debug;

/// What happened during one iteration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IterationOutcome {
    /// Per particle, in topology order: did the personal best improve?
    pub improved: Vec<bool>,
    /// Particles that were handed a new behavior
    pub reassigned: usize,
}

impl IterationOutcome {
    pub fn improvements(&self) -> usize {
        self.improved.iter().filter(|&&i| i).count()
    }
}

pub trait IterationStrategy<P: Problem>: Send {
    fn iterate(
        &mut self,
        topology: &mut Topology,
        evaluator: &Evaluator<P>,
        iteration: usize,
        rng: &mut dyn RngCore,
    ) -> SwarmResult<IterationOutcome>;

    fn name(&self) -> &'static str;

    /// Behaviors this strategy reassigns between, if it adapts at all.
    fn behavior_pool(&self) -> Option<&BehaviorPool> {
        None
    }

    fn behavior_stats(&self) -> Vec<BehaviorStats> {
        Vec::new()
    }
}

/// Classic synchronous PSO pass.
///
/// Neighbourhood guides are snapshotted from the previous iteration's
/// personal bests before any particle moves, so no particle ever reads a
/// sibling updated earlier in the same pass. Order of phases:
/// move (velocity, position, boundary) all, evaluate all, refresh links.
#[derive(Clone, Debug, Default)]
pub struct SynchronousIteration {
    parallel: bool,
}

impl SynchronousIteration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the per-particle work on the rayon pool. Each particle draws from
    /// its own child stream, seeded from the shared source in topology order.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }
}

impl<P: Problem> IterationStrategy<P> for SynchronousIteration {
    fn iterate(
        &mut self,
        topology: &mut Topology,
        evaluator: &Evaluator<P>,
        iteration: usize,
        rng: &mut dyn RngCore,
    ) -> SwarmResult<IterationOutcome> {
        let guides = topology.neighbourhood_guides();

        let improved = if self.parallel {
            let seeds: Vec<u64> = (0..topology.len()).map(|_| rng.next_u64()).collect();
            topology
                .particles_mut()
                .par_iter_mut()
                .zip(guides.par_iter())
                .zip(seeds.par_iter())
                .map(|((particle, guide), &seed)| {
                    let mut local = ChaCha8Rng::seed_from_u64(seed);
                    move_particle(particle, guide, &mut local)?;
                    Ok(particle.calculate_fitness(evaluator))
                })
                .collect::<SwarmResult<Vec<bool>>>()?
        } else {
            for (particle, guide) in topology.particles_mut().iter_mut().zip(guides.iter()) {
                move_particle(particle, guide, rng)?;
            }
            topology
                .particles_mut()
                .iter_mut()
                .map(|particle| particle.calculate_fitness(evaluator))
                .collect()
        };

        topology.refresh_neighbourhood_bests();

        let outcome = IterationOutcome {
            improved,
            reassigned: 0,
        };
        debug!(
            "synchronous iteration {}: {} of {} particles improved",
            iteration,
            outcome.improvements(),
            topology.len()
        );
        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "synchronous"
    }
}

fn move_particle(
    particle: &mut Particle,
    guide: &Array1<f64>,
    rng: &mut dyn RngCore,
) -> SwarmResult<()> {
    particle.update_velocity(guide, rng)?;
    particle.update_position(rng)?;
    particle.enforce_bounds(rng)
}
