//! Particle entity
//!
//! A particle owns its search state (position, velocity, personal best) and
//! holds a shared, swappable reference to the [`Behavior`] that drives its
//! updates. Cloning a particle deep-copies the vectors but shares the
//! behavior and the bounds.

use crate::behavior::BehaviorRef;
use crate::error::{SwarmError, SwarmResult};
use crate::problem::{Bounds, Direction, Evaluator, Problem};
use ndarray::Array1;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Position of a particle inside its topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ParticleId(pub usize);

impl ParticleId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticleId({})", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Particle {
    id: ParticleId,
    position: Array1<f64>,
    velocity: Array1<f64>,
    best_position: Array1<f64>,
    best_fitness: f64,
    fitness: f64,
    /// Non-owning link to the particle holding the neighbourhood best
    neighbourhood_best: Option<ParticleId>,
    behavior: BehaviorRef,
    /// Iterations since the personal best last improved
    stagnation: usize,
    bounds: Arc<Bounds>,
    direction: Direction,
}

impl Particle {
    /// Create an unevaluated particle. Fitness and personal-best fitness
    /// start at the worst value for `direction`.
    pub fn new(
        id: ParticleId,
        position: Array1<f64>,
        velocity: Array1<f64>,
        bounds: Arc<Bounds>,
        behavior: BehaviorRef,
        direction: Direction,
    ) -> SwarmResult<Self> {
        if position.len() != bounds.len() {
            return Err(SwarmError::DimensionMismatch {
                what: "position",
                expected: bounds.len(),
                found: position.len(),
            });
        }
        if velocity.len() != bounds.len() {
            return Err(SwarmError::DimensionMismatch {
                what: "velocity",
                expected: bounds.len(),
                found: velocity.len(),
            });
        }
        Ok(Self {
            id,
            best_position: position.clone(),
            position,
            velocity,
            best_fitness: direction.worst(),
            fitness: direction.worst(),
            neighbourhood_best: None,
            behavior,
            stagnation: 0,
            bounds,
            direction,
        })
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn dim(&self) -> usize {
        self.position.len()
    }

    pub fn position(&self) -> &Array1<f64> {
        &self.position
    }

    pub fn position_mut(&mut self) -> &mut Array1<f64> {
        &mut self.position
    }

    pub fn velocity(&self) -> &Array1<f64> {
        &self.velocity
    }

    pub fn velocity_mut(&mut self) -> &mut Array1<f64> {
        &mut self.velocity
    }

    pub fn best_position(&self) -> &Array1<f64> {
        &self.best_position
    }

    pub fn best_position_mut(&mut self) -> &mut Array1<f64> {
        &mut self.best_position
    }

    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn bounds_arc(&self) -> &Arc<Bounds> {
        &self.bounds
    }

    pub fn stagnation(&self) -> usize {
        self.stagnation
    }

    pub fn neighbourhood_best(&self) -> Option<ParticleId> {
        self.neighbourhood_best
    }

    pub fn set_neighbourhood_best(&mut self, id: ParticleId) {
        self.neighbourhood_best = Some(id);
    }

    pub fn behavior(&self) -> &BehaviorRef {
        &self.behavior
    }

    /// Replace the behavior reference. The previous one is dropped, not merged.
    pub fn set_behavior(&mut self, behavior: BehaviorRef) {
        self.behavior = behavior;
    }

    /// Overwrite the personal best. Callers are responsible for only doing
    /// so on improvement or after an environment change.
    pub fn set_personal_best(&mut self, position: Array1<f64>, fitness: f64) {
        self.best_position = position;
        self.best_fitness = fitness;
    }

    /// Record the first evaluation: fitness and personal best both take it.
    pub fn set_initial_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
        self.best_fitness = fitness;
        self.best_position = self.position.clone();
        self.stagnation = 0;
    }

    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Replace velocity with the behavior's velocity strategy output.
    pub fn update_velocity(
        &mut self,
        neighbourhood_best: &Array1<f64>,
        rng: &mut dyn RngCore,
    ) -> SwarmResult<()> {
        let behavior = Arc::clone(&self.behavior);
        let velocity = behavior.velocity().velocity(self, neighbourhood_best, rng);
        self.check_dim("velocity update", velocity.len())?;
        self.velocity = velocity;
        Ok(())
    }

    /// Replace position with the behavior's position strategy output.
    /// Must run after [`Particle::update_velocity`].
    pub fn update_position(&mut self, rng: &mut dyn RngCore) -> SwarmResult<()> {
        let behavior = Arc::clone(&self.behavior);
        let position = behavior.position().position(self, rng);
        self.check_dim("position update", position.len())?;
        self.position = position;
        Ok(())
    }

    pub fn enforce_bounds(&mut self, rng: &mut dyn RngCore) -> SwarmResult<()> {
        let behavior = Arc::clone(&self.behavior);
        let bounds = Arc::clone(&self.bounds);
        behavior.boundary().enforce(self, &bounds, rng)
    }

    /// Evaluate the current position, then apply the personal-best strategy.
    /// Returns whether the personal best improved.
    pub fn calculate_fitness<P: Problem>(&mut self, evaluator: &Evaluator<P>) -> bool {
        self.fitness = evaluator.evaluate(&self.position);
        let behavior = Arc::clone(&self.behavior);
        let improved = behavior.personal_best().update(self);
        if improved {
            self.stagnation = 0;
        } else {
            self.stagnation += 1;
        }
        improved
    }

    /// Reset position uniformly inside the bounds, zero the velocity and
    /// restart the personal best from the fresh evaluation.
    pub fn reinitialise<P: Problem>(&mut self, evaluator: &Evaluator<P>, rng: &mut dyn RngCore) {
        self.position = self.bounds.sample(rng);
        self.velocity = Array1::zeros(self.position.len());
        let fitness = evaluator.evaluate(&self.position);
        self.set_initial_fitness(fitness);
    }

    fn check_dim(&self, what: &'static str, found: usize) -> SwarmResult<()> {
        if found != self.bounds.len() {
            return Err(SwarmError::DimensionMismatch {
                what,
                expected: self.bounds.len(),
                found,
            });
        }
        Ok(())
    }
}
