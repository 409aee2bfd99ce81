//! Personal-best update strategies

use crate::particle::Particle;

/// Decides whether the freshly evaluated position replaces the personal
/// best. Implementations must never install a worse personal best.
pub trait PersonalBestUpdate: Send + Sync {
    /// Returns `true` when the personal best was replaced.
    fn update(&self, particle: &mut Particle) -> bool;
}

/// Replace on strict improvement.
#[derive(Clone, Debug, Default)]
pub struct StandardPersonalBest;

impl PersonalBestUpdate for StandardPersonalBest {
    fn update(&self, particle: &mut Particle) -> bool {
        if particle
            .direction()
            .is_better(particle.fitness(), particle.best_fitness())
        {
            let position = particle.position().clone();
            let fitness = particle.fitness();
            particle.set_personal_best(position, fitness);
            true
        } else {
            false
        }
    }
}

/// Replace on strict improvement, but only while the particle is inside its bounds.
#[derive(Clone, Debug, Default)]
pub struct BoundedPersonalBest;

impl PersonalBestUpdate for BoundedPersonalBest {
    fn update(&self, particle: &mut Particle) -> bool {
        if !particle.bounds().contains(particle.position()) {
            return false;
        }
        StandardPersonalBest.update(particle)
    }
}
