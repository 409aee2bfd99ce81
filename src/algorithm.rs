//! Run driver
//!
//! [`Pso`] owns everything one optimization run needs: the counting
//! evaluator, the topology, the iteration strategy, the single shared random
//! source and the explicit iteration counter.

use crate::adaptive::AdaptiveHeterogeneousIteration;
use crate::behavior::BehaviorPool;
use crate::config::{EngineConfig, SwarmConfig};
use crate::dynamic::{ChangeDetection, EnvironmentResponse, RandomSentryDetection, ReevaluationResponse};
use crate::error::SwarmResult;
use crate::init::{RandomFromPool, SwarmInitializer};
use crate::iteration::{IterationOutcome, IterationStrategy, SynchronousIteration};
use crate::measurement::{behavior_profile, BehaviorStats};
use crate::particle::Particle;
use crate::problem::{Evaluator, Problem};
use crate::topology::{Neighbourhood, Topology};
use ndarray::Array1;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The shared random source threaded through every strategy.
pub type SwarmRng = ChaCha8Rng;

/// The result of an optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub best_variables: Array1<f64>,
    pub best_fitness: f64,
    /// Best personal-best fitness after each iteration
    pub history: Vec<f64>,
    pub evaluations: u64,
}

struct Environment<P: Problem> {
    detection: Box<dyn ChangeDetection<P>>,
    response: Box<dyn EnvironmentResponse<P>>,
}

pub struct Pso<P: Problem> {
    config: SwarmConfig,
    evaluator: Evaluator<P>,
    topology: Topology,
    strategy: Box<dyn IterationStrategy<P>>,
    environment: Option<Environment<P>>,
    rng: SwarmRng,
    iteration: usize,
    history: Vec<f64>,
}

impl<P: Problem> Pso<P> {
    pub fn new(
        config: SwarmConfig,
        problem: P,
        initializer: &SwarmInitializer,
        neighbourhood: impl Neighbourhood + 'static,
        strategy: impl IterationStrategy<P> + 'static,
    ) -> SwarmResult<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => SwarmRng::seed_from_u64(seed),
            None => SwarmRng::from_entropy(),
        };
        let evaluator = Evaluator::new(problem)?;
        let topology = initializer.initialize(&evaluator, neighbourhood, &mut rng)?;
        info!(
            "PSO ready: {} particles, {} iteration strategy",
            topology.len(),
            strategy.name()
        );
        Ok(Self {
            config,
            evaluator,
            topology,
            strategy: Box::new(strategy),
            environment: None,
            rng,
            iteration: 0,
            history: Vec::new(),
        })
    }

    /// Adaptive heterogeneous PSO over `pool`, configured from `config`.
    ///
    /// Particles start on behaviors drawn uniformly from the pool. When
    /// `config.sentry` is set, changes are detected by random sentries and
    /// answered by re-evaluating the swarm.
    pub fn adaptive(
        config: &EngineConfig,
        problem: P,
        pool: BehaviorPool,
        neighbourhood: impl Neighbourhood + 'static,
    ) -> SwarmResult<Self> {
        config.validate()?;
        let initializer = SwarmInitializer::new(
            config.swarm.population_size,
            RandomFromPool::new(pool.clone()),
        );
        let strategy = AdaptiveHeterogeneousIteration::from_config(pool, &config.adaptive)?
            .with_delegate(SynchronousIteration::new().parallel(config.swarm.parallel));
        let pso = Self::new(
            config.swarm.clone(),
            problem,
            &initializer,
            neighbourhood,
            strategy,
        )?;
        match &config.sentry {
            Some(sentry) => Ok(pso.with_environment(
                RandomSentryDetection::new(sentry.clone())?,
                ReevaluationResponse,
            )),
            None => Ok(pso),
        }
    }

    /// Check for environment changes before every iteration.
    pub fn with_environment(
        mut self,
        detection: impl ChangeDetection<P> + 'static,
        response: impl EnvironmentResponse<P> + 'static,
    ) -> Self {
        self.environment = Some(Environment {
            detection: Box::new(detection),
            response: Box::new(response),
        });
        self
    }

    /// Run one iteration: environment check first (when configured), then
    /// the iteration strategy.
    pub fn step(&mut self) -> SwarmResult<IterationOutcome> {
        if let Some(env) = &self.environment {
            let changed = env.detection.detect(
                &self.topology,
                &self.evaluator,
                self.iteration,
                &mut self.rng,
            )?;
            if changed {
                env.response
                    .respond(&mut self.topology, &self.evaluator, &mut self.rng)?;
            }
        }

        let outcome = self.strategy.iterate(
            &mut self.topology,
            &self.evaluator,
            self.iteration,
            &mut self.rng,
        )?;
        self.iteration += 1;

        if let Some(best) = self.topology.best() {
            self.history.push(best.best_fitness());
            debug!(
                "iteration {}: best {} ({} evaluations)",
                self.iteration,
                best.best_fitness(),
                self.evaluator.evaluations()
            );
        }
        Ok(outcome)
    }

    /// Run `max_iterations` iterations.
    pub fn run(&mut self) -> SwarmResult<OptimizationResult> {
        info!(
            "Starting {} run for {} iterations",
            self.strategy.name(),
            self.config.max_iterations
        );
        for _ in 0..self.config.max_iterations {
            self.step()?;
        }
        let result = self.result();
        info!(
            "Finished after {} iterations: best fitness {} ({} evaluations)",
            self.iteration, result.best_fitness, result.evaluations
        );
        Ok(result)
    }

    pub fn result(&self) -> OptimizationResult {
        let (best_variables, best_fitness) = match self.topology.best() {
            Some(best) => (best.best_position().clone(), best.best_fitness()),
            None => (Array1::zeros(0), self.evaluator.direction().worst()),
        };
        OptimizationResult {
            best_variables,
            best_fitness,
            history: self.history.clone(),
            evaluations: self.evaluator.evaluations(),
        }
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    /// Number of completed iterations; also the index the next one runs with.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn evaluator(&self) -> &Evaluator<P> {
        &self.evaluator
    }

    pub fn best(&self) -> Option<&Particle> {
        self.topology.best()
    }

    pub fn behavior_pool(&self) -> Option<&BehaviorPool> {
        self.strategy.behavior_pool()
    }

    /// Particles per pool behavior, when the strategy has a pool.
    pub fn behavior_profile(&self) -> Option<Vec<usize>> {
        self.strategy
            .behavior_pool()
            .map(|pool| behavior_profile(&self.topology, pool))
    }

    pub fn behavior_stats(&self) -> Vec<BehaviorStats> {
        self.strategy.behavior_stats()
    }
}
