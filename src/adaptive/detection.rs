//! Behavior-change detectors
//!
//! A detector decides, per particle and iteration, whether the particle
//! should be handed a new behavior. Detectors never mutate the particle and
//! receive the iteration index explicitly.

use crate::error::{SwarmError, SwarmResult};
use crate::particle::Particle;

pub trait BehaviorChangeDetector: Send + Sync {
    fn detect(&self, particle: &Particle, iteration: usize) -> bool;
}

/// Fires once the personal best has stagnated for more than `threshold` iterations.
#[derive(Clone, Debug)]
pub struct PersonalBestStagnation {
    pub threshold: usize,
}

impl PersonalBestStagnation {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }
}

impl Default for PersonalBestStagnation {
    fn default() -> Self {
        Self { threshold: 10 }
    }
}

impl BehaviorChangeDetector for PersonalBestStagnation {
    fn detect(&self, particle: &Particle, _iteration: usize) -> bool {
        particle.stagnation() > self.threshold
    }
}

/// Fires for every particle on iterations divisible by `interval`.
#[derive(Clone, Debug)]
pub struct PeriodicDetection {
    interval: usize,
}

impl PeriodicDetection {
    pub fn new(interval: usize) -> SwarmResult<Self> {
        if interval == 0 {
            return Err(SwarmError::config("detection interval must be positive"));
        }
        Ok(Self { interval })
    }

    pub fn interval(&self) -> usize {
        self.interval
    }
}

impl BehaviorChangeDetector for PeriodicDetection {
    fn detect(&self, _particle: &Particle, iteration: usize) -> bool {
        iteration % self.interval == 0
    }
}

/// Fires when any inner detector fires.
pub struct AnyDetector {
    detectors: Vec<Box<dyn BehaviorChangeDetector>>,
}

impl AnyDetector {
    pub fn new(detectors: Vec<Box<dyn BehaviorChangeDetector>>) -> Self {
        Self { detectors }
    }
}

impl BehaviorChangeDetector for AnyDetector {
    fn detect(&self, particle: &Particle, iteration: usize) -> bool {
        self.detectors.iter().any(|d| d.detect(particle, iteration))
    }
}
