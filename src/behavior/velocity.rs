//! Velocity update strategies

use crate::particle::Particle;
use ndarray::Array1;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, StandardNormal};
use std::sync::Arc;

/// Computes a particle's next velocity from its position, velocity,
/// personal best and the neighbourhood best.
pub trait VelocityProvider: Send + Sync {
    fn velocity(
        &self,
        particle: &Particle,
        neighbourhood_best: &Array1<f64>,
        rng: &mut dyn RngCore,
    ) -> Array1<f64>;
}

/// Inertia-weighted PSO velocity.
///
/// `v = w*v + c1*r1*(pbest - x) + c2*r2*(nbest - x)` with fresh `r1, r2` per dimension.
#[derive(Clone, Debug)]
pub struct StandardVelocity {
    pub inertia: f64,
    pub cognitive: f64,
    pub social: f64,
}

impl StandardVelocity {
    pub fn new(inertia: f64, cognitive: f64, social: f64) -> Self {
        Self {
            inertia,
            cognitive,
            social,
        }
    }

    /// Attraction to the personal best only.
    pub fn cognitive_only() -> Self {
        Self {
            social: 0.0,
            ..Self::default()
        }
    }

    /// Attraction to the neighbourhood best only.
    pub fn social_only() -> Self {
        Self {
            cognitive: 0.0,
            ..Self::default()
        }
    }
}

impl Default for StandardVelocity {
    fn default() -> Self {
        Self {
            inertia: 0.7,
            cognitive: 1.5,
            social: 1.5,
        }
    }
}

impl VelocityProvider for StandardVelocity {
    fn velocity(
        &self,
        particle: &Particle,
        neighbourhood_best: &Array1<f64>,
        rng: &mut dyn RngCore,
    ) -> Array1<f64> {
        let x = particle.position();
        let v = particle.velocity();
        let pbest = particle.best_position();
        Array1::from_shape_fn(x.len(), |j| {
            let r1: f64 = rng.gen();
            let r2: f64 = rng.gen();
            self.inertia * v[j]
                + self.cognitive * r1 * (pbest[j] - x[j])
                + self.social * r2 * (neighbourhood_best[j] - x[j])
        })
    }
}

/// Barebones PSO: samples `N((pbest + nbest) / 2, |pbest - nbest|)` per
/// dimension. Pair with [`VelocityAsPosition`](super::VelocityAsPosition).
#[derive(Clone, Debug, Default)]
pub struct BareBonesVelocity;

impl VelocityProvider for BareBonesVelocity {
    fn velocity(
        &self,
        particle: &Particle,
        neighbourhood_best: &Array1<f64>,
        rng: &mut dyn RngCore,
    ) -> Array1<f64> {
        let pbest = particle.best_position();
        Array1::from_shape_fn(pbest.len(), |j| {
            let mean = (pbest[j] + neighbourhood_best[j]) / 2.0;
            let sigma = (pbest[j] - neighbourhood_best[j]).abs();
            let z: f64 = StandardNormal.sample(rng);
            mean + sigma * z
        })
    }
}

/// Limits every component of the wrapped strategy's output to `[-max, max]`.
#[derive(Clone)]
pub struct ClampedVelocity {
    inner: Arc<dyn VelocityProvider>,
    max: f64,
}

impl ClampedVelocity {
    pub fn new(inner: impl VelocityProvider + 'static, max: f64) -> Self {
        Self {
            inner: Arc::new(inner),
            max: max.abs(),
        }
    }
}

impl VelocityProvider for ClampedVelocity {
    fn velocity(
        &self,
        particle: &Particle,
        neighbourhood_best: &Array1<f64>,
        rng: &mut dyn RngCore,
    ) -> Array1<f64> {
        self.inner
            .velocity(particle, neighbourhood_best, rng)
            .mapv_into(|v| v.clamp(-self.max, self.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Behavior;
    use crate::particle::ParticleId;
    use crate::problem::{Bounds, Direction};
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn particle(position: Array1<f64>, velocity: Array1<f64>) -> Particle {
        let bounds = Arc::new(Bounds::uniform(position.len(), -100.0, 100.0).unwrap());
        Particle::new(
            ParticleId(0),
            position,
            velocity,
            bounds,
            Behavior::builder("t").build(),
            Direction::Minimise,
        )
        .unwrap()
    }

    #[test]
    fn test_inertia_only_when_at_both_bests() {
        let p = particle(array![1.0, 2.0], array![10.0, -10.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let v = StandardVelocity::default().velocity(&p, &array![1.0, 2.0], &mut rng);
        assert!((v[0] - 7.0).abs() < 1e-12);
        assert!((v[1] + 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_social_only_ignores_personal_best() {
        let mut p = particle(array![0.0], array![0.0]);
        p.set_personal_best(array![50.0], 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let v = StandardVelocity::social_only().velocity(&p, &array![0.0], &mut rng);
        assert_eq!(v[0], 0.0);
    }

    #[test]
    fn test_barebones_degenerates_to_best() {
        let mut p = particle(array![9.0, 9.0], array![0.0, 0.0]);
        p.set_personal_best(array![1.0, -1.0], 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let v = BareBonesVelocity.velocity(&p, &array![1.0, -1.0], &mut rng);
        assert_eq!(v, array![1.0, -1.0]);
    }

    #[test]
    fn test_barebones_samples_around_midpoint() {
        let mut p = particle(array![0.0], array![0.0]);
        p.set_personal_best(array![0.0], 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let samples: Vec<f64> = (0..4000)
            .map(|_| BareBonesVelocity.velocity(&p, &array![2.0], &mut rng)[0])
            .collect();
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let std = (samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n).sqrt();
        assert!((mean - 1.0).abs() < 0.15, "mean {}", mean);
        assert!((std - 2.0).abs() < 0.15, "std {}", std);
    }

    #[test]
    fn test_clamped_velocity() {
        let p = particle(array![0.0], array![100.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let clamped = ClampedVelocity::new(StandardVelocity::new(1.0, 0.0, 0.0), 4.0);
        assert_eq!(clamped.velocity(&p, &array![0.0], &mut rng), array![4.0]);
    }
}
