use super::detection::{BehaviorChangeDetector, PersonalBestStagnation};
use super::selection::{BehaviorSelector, TournamentSelector};
use super::window::SuccessWindow;
use crate::behavior::BehaviorPool;
use crate::config::AdaptiveConfig;
use crate::error::{SwarmError, SwarmResult};
use crate::iteration::{IterationOutcome, IterationStrategy, SynchronousIteration};
use crate::measurement::BehaviorStats;
use crate::problem::{Evaluator, Problem};
use crate::topology::Topology;
use rand::RngCore;
use tracing::{debug, info};

/// Adaptive heterogeneous iteration.
///
/// Each call runs, in order:
/// 1. aggregate every pool behavior's success window into its weight;
/// 2. in topology order, ask the detector about each particle and hand the
///    ones it flags a behavior chosen by the selector;
/// 3. zero every pool behavior's success counter;
/// 4. run one [`SynchronousIteration`] pass;
/// 5. credit one success to the current behavior of every particle whose
///    personal best improved, when that behavior belongs to the pool;
/// 6. write every pool behavior's counter into slot `iteration % window_size`.
///
/// Weights used in step 2 therefore never include the outcome of the
/// iteration in progress.
pub struct AdaptiveHeterogeneousIteration {
    pool: BehaviorPool,
    windows: Vec<SuccessWindow>,
    weights: Vec<f64>,
    detector: Box<dyn BehaviorChangeDetector>,
    selector: Box<dyn BehaviorSelector>,
    delegate: SynchronousIteration,
}

impl AdaptiveHeterogeneousIteration {
    pub fn new(
        pool: BehaviorPool,
        window_size: usize,
        detector: impl BehaviorChangeDetector + 'static,
        selector: impl BehaviorSelector + 'static,
    ) -> SwarmResult<Self> {
        if pool.is_empty() {
            return Err(SwarmError::config("behavior pool is empty"));
        }
        let windows = new_windows(pool.len(), window_size)?;
        info!(
            "Adaptive iteration over {} behaviors, window size {}",
            pool.len(),
            window_size
        );
        Ok(Self {
            weights: vec![0.0; pool.len()],
            windows,
            pool,
            detector: Box::new(detector),
            selector: Box::new(selector),
            delegate: SynchronousIteration::new(),
        })
    }

    /// Stagnation detector and tournament selector, parameterised by `config`.
    pub fn from_config(pool: BehaviorPool, config: &AdaptiveConfig) -> SwarmResult<Self> {
        config.validate()?;
        Self::new(
            pool,
            config.window_size,
            PersonalBestStagnation::new(config.stagnation_threshold),
            TournamentSelector::new(config.tournament_fraction)?,
        )
    }

    pub fn with_delegate(mut self, delegate: SynchronousIteration) -> Self {
        self.delegate = delegate;
        self
    }

    pub fn pool(&self) -> &BehaviorPool {
        &self.pool
    }

    pub fn window_size(&self) -> usize {
        self.windows.first().map(|w| w.len()).unwrap_or(0)
    }

    /// Success window of the pool entry at `index`.
    pub fn window(&self, index: usize) -> Option<&SuccessWindow> {
        self.windows.get(index)
    }

    /// Weights as aggregated at the start of the most recent iteration.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Current sum of the success window of the pool entry at `index`.
    pub fn aggregated_weight(&self, index: usize) -> Option<usize> {
        self.windows.get(index).map(|w| w.sum())
    }

    /// Reallocate every window to `window_size` slots, discarding history.
    pub fn set_window_size(&mut self, window_size: usize) -> SwarmResult<()> {
        self.windows = new_windows(self.pool.len(), window_size)?;
        self.weights = vec![0.0; self.pool.len()];
        info!("Success windows reset to size {}", window_size);
        Ok(())
    }

    pub fn behavior_stats(&self) -> Vec<BehaviorStats> {
        self.pool
            .iter()
            .zip(&self.windows)
            .map(|(behavior, window)| BehaviorStats {
                name: behavior.name().to_string(),
                selections: behavior.selections(),
                successes: behavior.successes(),
                weight: window.sum(),
            })
            .collect()
    }

    fn aggregate_weights(&mut self) {
        for (weight, window) in self.weights.iter_mut().zip(&self.windows) {
            *weight = window.sum() as f64;
        }
    }

    fn reassign(&self, topology: &mut Topology, iteration: usize, rng: &mut dyn RngCore) -> SwarmResult<usize> {
        let mut reassigned = 0;
        for particle in topology.particles_mut().iter_mut() {
            if !self.detector.detect(particle, iteration) {
                continue;
            }
            let chosen = self.selector.select(self.pool.as_slice(), &self.weights, rng)?;
            chosen.record_selection();
            particle.set_behavior(chosen);
            reassigned += 1;
        }
        Ok(reassigned)
    }

    /// Behaviors outside the pool are never reset, so they are never credited.
    fn record_successes(&self, topology: &Topology, outcome: &IterationOutcome) {
        for (particle, &improved) in topology.iter().zip(&outcome.improved) {
            if improved && self.pool.index_of(particle.behavior()).is_some() {
                particle.behavior().record_success();
            }
        }
    }

    fn commit_windows(&mut self, iteration: usize) {
        for (behavior, window) in self.pool.iter().zip(self.windows.iter_mut()) {
            window.record(iteration, behavior.successes());
        }
    }
}

impl<P: Problem> IterationStrategy<P> for AdaptiveHeterogeneousIteration {
    fn iterate(
        &mut self,
        topology: &mut Topology,
        evaluator: &Evaluator<P>,
        iteration: usize,
        rng: &mut dyn RngCore,
    ) -> SwarmResult<IterationOutcome> {
        self.aggregate_weights();

        let reassigned = self.reassign(topology, iteration, rng)?;

        for behavior in self.pool.iter() {
            behavior.reset_successes();
        }

        let mut outcome = self.delegate.iterate(topology, evaluator, iteration, rng)?;
        outcome.reassigned = reassigned;

        self.record_successes(topology, &outcome);
        self.commit_windows(iteration);

        debug!(
            "adaptive iteration {}: {} reassigned, {} improved, weights {:?}",
            iteration,
            reassigned,
            outcome.improvements(),
            self.weights
        );
        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "adaptive-heterogeneous"
    }

    fn behavior_pool(&self) -> Option<&BehaviorPool> {
        Some(&self.pool)
    }

    fn behavior_stats(&self) -> Vec<BehaviorStats> {
        AdaptiveHeterogeneousIteration::behavior_stats(self)
    }
}

fn new_windows(count: usize, window_size: usize) -> SwarmResult<Vec<SuccessWindow>> {
    (0..count).map(|_| SuccessWindow::new(window_size)).collect()
}
