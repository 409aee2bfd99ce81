//! Position update strategies

use crate::particle::Particle;
use ndarray::Array1;
use rand::RngCore;

/// Computes a particle's next position from its already-updated velocity.
pub trait PositionProvider: Send + Sync {
    fn position(&self, particle: &Particle, rng: &mut dyn RngCore) -> Array1<f64>;
}

/// `x = x + v`
#[derive(Clone, Debug, Default)]
pub struct LinearPosition;

impl PositionProvider for LinearPosition {
    fn position(&self, particle: &Particle, _rng: &mut dyn RngCore) -> Array1<f64> {
        particle.position() + particle.velocity()
    }
}

/// `x = v`, for strategies whose "velocity" is already a sampled position.
#[derive(Clone, Debug, Default)]
pub struct VelocityAsPosition;

impl PositionProvider for VelocityAsPosition {
    fn position(&self, particle: &Particle, _rng: &mut dyn RngCore) -> Array1<f64> {
        particle.velocity().clone()
    }
}
