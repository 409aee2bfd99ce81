//! Read-only measurements over a swarm

use crate::behavior::BehaviorPool;
use crate::topology::Topology;
use serde::{Deserialize, Serialize};

/// Snapshot of one pool behavior's adaptive bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorStats {
    pub name: String,
    /// Lifetime selection count
    pub selections: usize,
    /// Successes credited in the last completed iteration
    pub successes: usize,
    /// Sum of the success window
    pub weight: usize,
}

/// Number of particles currently following each pool behavior, in pool
/// order. Particles on behaviors outside the pool are not counted.
pub fn behavior_profile(topology: &Topology, pool: &BehaviorPool) -> Vec<usize> {
    let mut counts = vec![0; pool.len()];
    for particle in topology.iter() {
        if let Some(i) = pool.index_of(particle.behavior()) {
            counts[i] += 1;
        }
    }
    counts
}

/// Mean Euclidean distance of the particles from the swarm centroid.
pub fn diversity(topology: &Topology) -> f64 {
    let n = topology.len();
    if n == 0 {
        return 0.0;
    }
    let dim = topology.particles()[0].dim();
    let mut centroid = ndarray::Array1::<f64>::zeros(dim);
    for p in topology.iter() {
        centroid += p.position();
    }
    centroid /= n as f64;
    topology
        .iter()
        .map(|p| {
            let d = p.position() - &centroid;
            d.dot(&d).sqrt()
        })
        .sum::<f64>()
        / n as f64
}
