//! Swarm initialisation

use crate::behavior::{BehaviorPool, BehaviorRef};
use crate::error::{SwarmError, SwarmResult};
use crate::particle::{Particle, ParticleId};
use crate::problem::{Evaluator, Problem};
use crate::topology::{Neighbourhood, Topology};
use ndarray::Array1;
use rand::{Rng, RngCore};
use std::sync::Arc;
use tracing::info;

/// Chooses the behavior each particle starts with.
pub trait BehaviorInitializer: Send + Sync {
    fn assign(&self, index: usize, rng: &mut dyn RngCore) -> BehaviorRef;

    /// The single behavior every particle starts with, when there is one.
    fn prototype(&self) -> SwarmResult<BehaviorRef>;
}

/// Every particle starts on the same behavior.
#[derive(Clone, Debug)]
pub struct UniformBehavior {
    behavior: BehaviorRef,
}

impl UniformBehavior {
    pub fn new(behavior: BehaviorRef) -> Self {
        Self { behavior }
    }
}

impl BehaviorInitializer for UniformBehavior {
    fn assign(&self, _index: usize, _rng: &mut dyn RngCore) -> BehaviorRef {
        Arc::clone(&self.behavior)
    }

    fn prototype(&self) -> SwarmResult<BehaviorRef> {
        Ok(Arc::clone(&self.behavior))
    }
}

/// Each particle starts on a behavior drawn uniformly from a pool.
#[derive(Clone, Debug)]
pub struct RandomFromPool {
    pool: BehaviorPool,
}

impl RandomFromPool {
    pub fn new(pool: BehaviorPool) -> Self {
        Self { pool }
    }
}

impl BehaviorInitializer for RandomFromPool {
    fn assign(&self, _index: usize, rng: &mut dyn RngCore) -> BehaviorRef {
        let i = rng.gen_range(0..self.pool.len());
        Arc::clone(&self.pool.as_slice()[i])
    }

    fn prototype(&self) -> SwarmResult<BehaviorRef> {
        Err(SwarmError::Unsupported {
            operation: "prototype",
            entity: "RandomFromPool",
        })
    }
}

/// Builds a topology of uniformly placed, zero-velocity particles.
pub struct SwarmInitializer {
    population_size: usize,
    behaviors: Box<dyn BehaviorInitializer>,
}

impl SwarmInitializer {
    pub fn new(population_size: usize, behaviors: impl BehaviorInitializer + 'static) -> Self {
        Self {
            population_size,
            behaviors: Box::new(behaviors),
        }
    }

    pub fn behaviors(&self) -> &dyn BehaviorInitializer {
        self.behaviors.as_ref()
    }

    pub fn initialize<P: Problem>(
        &self,
        evaluator: &Evaluator<P>,
        neighbourhood: impl Neighbourhood + 'static,
        rng: &mut dyn RngCore,
    ) -> SwarmResult<Topology> {
        if self.population_size == 0 {
            return Err(SwarmError::config("population_size must be positive"));
        }
        let bounds = Arc::new(evaluator.bounds().clone());
        let direction = evaluator.direction();

        let mut particles = Vec::with_capacity(self.population_size);
        for i in 0..self.population_size {
            let position = bounds.sample(rng);
            let velocity = Array1::zeros(bounds.len());
            let behavior = self.behaviors.assign(i, rng);
            let mut particle = Particle::new(
                ParticleId(i),
                position,
                velocity,
                Arc::clone(&bounds),
                behavior,
                direction,
            )?;
            let fitness = evaluator.evaluate(particle.position());
            particle.set_initial_fitness(fitness);
            particles.push(particle);
        }

        let name = neighbourhood.name();
        let mut topology = Topology::new(particles, neighbourhood)?;
        topology.refresh_neighbourhood_bests();
        info!(
            "Initialized {} particles over {} dimensions ({} topology)",
            self.population_size,
            bounds.len(),
            name
        );
        Ok(topology)
    }
}
