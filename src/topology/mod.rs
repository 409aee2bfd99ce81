//! Swarm topology
//!
//! An ordered, fixed-size container of particles plus the neighbourhood
//! structure used to derive each member's neighbourhood best.

pub mod neighbourhood;

pub use neighbourhood::{GlobalBest, Neighbourhood, Ring, VonNeumann};

use crate::error::{SwarmError, SwarmResult};
use crate::particle::{Particle, ParticleId};
use ndarray::Array1;
use std::fmt;
use std::sync::Arc;

/// Cloning deep-copies particle state but keeps sharing behaviors and the
/// neighbourhood strategy.
#[derive(Clone)]
pub struct Topology {
    particles: Vec<Particle>,
    neighbourhood: Arc<dyn Neighbourhood>,
}

impl Topology {
    /// Particles must be ordered by id, `particles[i].id() == ParticleId(i)`.
    pub fn new(
        particles: Vec<Particle>,
        neighbourhood: impl Neighbourhood + 'static,
    ) -> SwarmResult<Self> {
        for (i, particle) in particles.iter().enumerate() {
            if particle.id() != ParticleId(i) {
                return Err(SwarmError::config(format!(
                    "particle at position {} carries {}",
                    i,
                    particle.id()
                )));
            }
        }
        Ok(Self {
            particles,
            neighbourhood: Arc::new(neighbourhood),
        })
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access to members. The slice cannot grow or shrink.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn neighbourhood(&self) -> &dyn Neighbourhood {
        self.neighbourhood.as_ref()
    }

    /// Neighbours of the member at `index`, in ascending index order.
    pub fn neighbourhood_of(&self, index: usize) -> impl Iterator<Item = &Particle> + '_ {
        self.neighbourhood
            .neighbours(index, self.particles.len())
            .into_iter()
            .filter_map(move |j| self.particles.get(j))
    }

    /// Neighbour with the best personal-best fitness. Ties go to the lowest index.
    pub fn neighbourhood_best_of(&self, index: usize) -> Option<ParticleId> {
        let direction = self.particles.get(index)?.direction();
        let mut best: Option<&Particle> = None;
        for neighbour in self.neighbourhood_of(index) {
            match best {
                Some(b) if !direction.is_better(neighbour.best_fitness(), b.best_fitness()) => {}
                _ => best = Some(neighbour),
            }
        }
        best.map(|p| p.id())
    }

    /// Recompute every member's neighbourhood-best link from the current
    /// personal bests. All links are computed before any is written.
    pub fn refresh_neighbourhood_bests(&mut self) {
        let links: Vec<Option<ParticleId>> = (0..self.particles.len())
            .map(|i| self.neighbourhood_best_of(i))
            .collect();
        for (particle, link) in self.particles.iter_mut().zip(links) {
            if let Some(id) = link {
                particle.set_neighbourhood_best(id);
            }
        }
    }

    /// Personal-best positions of each member's neighbourhood best, in
    /// topology order. Members without a link guide on their own best.
    pub fn neighbourhood_guides(&self) -> Vec<Array1<f64>> {
        self.particles
            .iter()
            .map(|p| {
                let guide = p
                    .neighbourhood_best()
                    .and_then(|id| self.particles.get(id.index()))
                    .unwrap_or(p);
                guide.best_position().clone()
            })
            .collect()
    }

    /// Member with the best personal-best fitness.
    pub fn best(&self) -> Option<&Particle> {
        let mut best: Option<&Particle> = None;
        for particle in &self.particles {
            match best {
                Some(b) if !particle.direction().is_better(particle.best_fitness(), b.best_fitness()) => {}
                _ => best = Some(particle),
            }
        }
        best
    }
}

impl fmt::Debug for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topology")
            .field("neighbourhood", &self.neighbourhood.name())
            .field("particles", &self.particles.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Behavior;
    use crate::problem::{Bounds, Direction};
    use ndarray::array;

    fn swarm(fitnesses: &[f64], neighbourhood: impl Neighbourhood + 'static) -> Topology {
        let bounds = Arc::new(Bounds::uniform(1, -100.0, 100.0).unwrap());
        let behavior = Behavior::builder("b").build();
        let particles = fitnesses
            .iter()
            .enumerate()
            .map(|(i, &f)| {
                let mut p = Particle::new(
                    ParticleId(i),
                    array![i as f64],
                    array![0.0],
                    bounds.clone(),
                    behavior.clone(),
                    Direction::Minimise,
                )
                .unwrap();
                p.set_initial_fitness(f);
                p
            })
            .collect();
        Topology::new(particles, neighbourhood).unwrap()
    }

    #[test]
    fn test_ids_must_match_order() {
        let t = swarm(&[1.0, 2.0], GlobalBest);
        let mut particles = t.particles().to_vec();
        particles.swap(0, 1);
        assert!(Topology::new(particles, GlobalBest).is_err());
    }

    #[test]
    fn test_global_best_links() {
        let mut t = swarm(&[3.0, 1.0, 2.0], GlobalBest);
        t.refresh_neighbourhood_bests();
        assert!(t.iter().all(|p| p.neighbourhood_best() == Some(ParticleId(1))));
        assert_eq!(t.best().unwrap().id(), ParticleId(1));
        let guides = t.neighbourhood_guides();
        assert!(guides.iter().all(|g| g == &array![1.0]));
    }

    #[test]
    fn test_ring_links_are_local() {
        let mut t = swarm(&[5.0, 4.0, 3.0, 2.0, 1.0, 0.5], Ring { radius: 1 });
        t.refresh_neighbourhood_bests();
        assert_eq!(t.get(0).unwrap().neighbourhood_best(), Some(ParticleId(5)));
        assert_eq!(t.get(1).unwrap().neighbourhood_best(), Some(ParticleId(2)));
        assert_eq!(t.get(3).unwrap().neighbourhood_best(), Some(ParticleId(4)));
        assert_eq!(t.neighbourhood_of(2).count(), 3);
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let t = swarm(&[1.0, 1.0, 1.0], GlobalBest);
        assert_eq!(t.neighbourhood_best_of(2), Some(ParticleId(0)));
        assert_eq!(t.best().unwrap().id(), ParticleId(0));
    }

    #[test]
    fn test_clone_shares_behaviors() {
        let t = swarm(&[1.0, 2.0], GlobalBest);
        let copy = t.clone();
        for (a, b) in t.iter().zip(copy.iter()) {
            assert!(Behavior::same(a.behavior(), b.behavior()));
        }
    }
}
