//! Heteroswarm
//!
//! Population-based stochastic optimization with heterogeneous particle
//! swarms. Each particle follows a swappable [`Behavior`]; the
//! [`AdaptiveHeterogeneousIteration`] reassigns behaviors to stagnating
//! particles, favouring behaviors that recently improved personal bests.
//!
//! # Architecture
//!
//! - [`particle`]: search state plus a shared behavior reference
//! - [`topology`]: ordered particles and neighbourhood queries
//! - [`behavior`]: velocity, position, boundary and personal-best strategies
//! - [`adaptive`]: success windows, change detectors, selectors, the adaptive iteration
//! - [`iteration`]: the synchronous PSO pass the adaptive iteration delegates to
//! - [`dynamic`]: sentry-based change detection and responses
//! - [`algorithm`]: the run driver owning the shared random source
//!
//! ## Example Usage
//!
//! ```rust
//! use heteroswarm::{BehaviorPool, ClampBoundary, EngineConfig, GlobalBest, Pso, SimpleProblem};
//! use ndarray::Array1;
//! use std::sync::Arc;
//!
//! let mut config = EngineConfig::default();
//! config.swarm.seed = Some(42);
//! config.swarm.max_iterations = 20;
//!
//! let problem = SimpleProblem::new(|x: &Array1<f64>| x.dot(x), 2, -5.0, 5.0);
//! let pool = BehaviorPool::classic(Arc::new(ClampBoundary));
//! let mut pso = Pso::adaptive(&config, problem, pool, GlobalBest).unwrap();
//! let result = pso.run().unwrap();
//! assert_eq!(result.history.len(), 20);
//! ```

pub mod adaptive;
pub mod algorithm;
pub mod behavior;
pub mod config;
pub mod dynamic;
pub mod error;
pub mod init;
pub mod iteration;
pub mod measurement;
pub mod particle;
pub mod problem;
pub mod topology;

pub use adaptive::{
    AdaptiveHeterogeneousIteration, BehaviorChangeDetector, BehaviorSelector, PeriodicDetection,
    PersonalBestStagnation, SuccessWindow, TournamentSelector,
};
pub use algorithm::{OptimizationResult, Pso, SwarmRng};
pub use behavior::{Behavior, BehaviorPool, BehaviorRef, ClampBoundary};
pub use config::{AdaptiveConfig, EngineConfig, SentryConfig, SwarmConfig};
pub use error::{SwarmError, SwarmResult};
pub use iteration::{IterationOutcome, IterationStrategy, SynchronousIteration};
pub use particle::{Particle, ParticleId};
pub use problem::{Bounds, Direction, Evaluator, Problem, SimpleProblem};
pub use topology::{GlobalBest, Neighbourhood, Ring, Topology, VonNeumann};

/// Initialize the optimization engine
pub fn init() {
    tracing::info!("Heteroswarm Optimization Engine Initialized");
}

/// Crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
