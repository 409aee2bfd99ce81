//! Boundary constraint strategies
//!
//! A constraint mutates a particle in place so that its position satisfies
//! the per-dimension bounds it is handed.

use crate::error::{SwarmError, SwarmResult};
use crate::particle::Particle;
use crate::problem::Bounds;
use ndarray::{s, Array1};
use rand::RngCore;
use std::sync::Arc;

pub trait BoundaryConstraint: Send + Sync {
    fn enforce(&self, particle: &mut Particle, bounds: &Bounds, rng: &mut dyn RngCore)
        -> SwarmResult<()>;
}

/// Leaves the particle untouched.
#[derive(Clone, Debug, Default)]
pub struct Unconstrained;

impl BoundaryConstraint for Unconstrained {
    fn enforce(&self, _: &mut Particle, _: &Bounds, _: &mut dyn RngCore) -> SwarmResult<()> {
        Ok(())
    }
}

/// Clamps every out-of-range component onto the violated bound.
#[derive(Clone, Debug, Default)]
pub struct ClampBoundary;

impl BoundaryConstraint for ClampBoundary {
    fn enforce(&self, particle: &mut Particle, bounds: &Bounds, _: &mut dyn RngCore) -> SwarmResult<()> {
        check_dim(particle, bounds)?;
        let (lower, upper) = (bounds.lower(), bounds.upper());
        for (j, x) in particle.position_mut().iter_mut().enumerate() {
            *x = x.clamp(lower[j], upper[j]);
        }
        Ok(())
    }
}

/// Resamples every out-of-range component uniformly inside its bound and
/// zeroes the matching velocity component.
#[derive(Clone, Debug, Default)]
pub struct RandomBoundary;

impl BoundaryConstraint for RandomBoundary {
    fn enforce(&self, particle: &mut Particle, bounds: &Bounds, rng: &mut dyn RngCore) -> SwarmResult<()> {
        check_dim(particle, bounds)?;
        for j in 0..bounds.len() {
            let x = particle.position()[j];
            if x < bounds.lower()[j] || x > bounds.upper()[j] || x.is_nan() {
                particle.position_mut()[j] = bounds.sample_dim(j, rng);
                particle.velocity_mut()[j] = 0.0;
            }
        }
        Ok(())
    }
}

/// Mirrors out-of-range components back inside the bound and reverses the
/// matching velocity component. Overshoots wider than the interval end on
/// the opposite bound.
#[derive(Clone, Debug, Default)]
pub struct ReflectBoundary;

impl BoundaryConstraint for ReflectBoundary {
    fn enforce(&self, particle: &mut Particle, bounds: &Bounds, _: &mut dyn RngCore) -> SwarmResult<()> {
        check_dim(particle, bounds)?;
        for j in 0..bounds.len() {
            let (l, u) = (bounds.lower()[j], bounds.upper()[j]);
            let x = particle.position()[j];
            let reflected = if x < l {
                l + (l - x)
            } else if x > u {
                u - (x - u)
            } else {
                continue;
            };
            particle.position_mut()[j] = reflected.clamp(l, u);
            let v = particle.velocity()[j];
            particle.velocity_mut()[j] = -v;
        }
        Ok(())
    }
}

/// Applies a separate constraint to each consecutive sub-vector of the
/// candidate. Position, velocity and personal best are split at the same
/// offsets and written back at the same offsets.
#[derive(Clone)]
pub struct CompositeBoundary {
    segments: Vec<(usize, Arc<dyn BoundaryConstraint>)>,
}

impl CompositeBoundary {
    /// `segments` lists `(length, constraint)` pairs in candidate order.
    pub fn new(segments: Vec<(usize, Arc<dyn BoundaryConstraint>)>) -> SwarmResult<Self> {
        if segments.is_empty() {
            return Err(SwarmError::config("composite boundary has no segments"));
        }
        if segments.iter().any(|(len, _)| *len == 0) {
            return Err(SwarmError::config("composite boundary segment of length 0"));
        }
        Ok(Self { segments })
    }

    pub fn dim(&self) -> usize {
        self.segments.iter().map(|(len, _)| len).sum()
    }
}

impl BoundaryConstraint for CompositeBoundary {
    fn enforce(&self, particle: &mut Particle, bounds: &Bounds, rng: &mut dyn RngCore) -> SwarmResult<()> {
        check_dim(particle, bounds)?;
        if self.dim() != bounds.len() {
            return Err(SwarmError::DimensionMismatch {
                what: "composite boundary segments",
                expected: bounds.len(),
                found: self.dim(),
            });
        }

        let mut start = 0;
        for (len, constraint) in &self.segments {
            let range = start..start + len;
            let segment_bounds = Arc::new(bounds.segment(start, *len)?);
            let mut part = Particle::new(
                particle.id(),
                particle.position().slice(s![range.clone()]).to_owned(),
                particle.velocity().slice(s![range.clone()]).to_owned(),
                Arc::clone(&segment_bounds),
                Arc::clone(particle.behavior()),
                particle.direction(),
            )?;
            let best: Array1<f64> = particle.best_position().slice(s![range.clone()]).to_owned();
            part.set_personal_best(best, particle.best_fitness());

            constraint.enforce(&mut part, &segment_bounds, rng)?;

            particle
                .position_mut()
                .slice_mut(s![range.clone()])
                .assign(part.position());
            particle
                .velocity_mut()
                .slice_mut(s![range.clone()])
                .assign(part.velocity());
            particle
                .best_position_mut()
                .slice_mut(s![range])
                .assign(part.best_position());
            start += len;
        }
        Ok(())
    }
}

fn check_dim(particle: &Particle, bounds: &Bounds) -> SwarmResult<()> {
    if particle.dim() != bounds.len() {
        return Err(SwarmError::DimensionMismatch {
            what: "bounds",
            expected: particle.dim(),
            found: bounds.len(),
        });
    }
    Ok(())
}
