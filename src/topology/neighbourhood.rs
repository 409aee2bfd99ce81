//! Neighbourhood structures
//!
//! A neighbourhood maps a member index to the indices of its neighbours,
//! given only the population size. Every implementation is deterministic.

use std::collections::BTreeSet;

pub trait Neighbourhood: Send + Sync {
    /// Indices of the neighbours of `index` in a population of `size`,
    /// ascending, possibly including `index` itself.
    fn neighbours(&self, index: usize, size: usize) -> Vec<usize>;

    fn name(&self) -> &'static str;
}

/// Every member sees every member (star / gbest).
#[derive(Clone, Debug, Default)]
pub struct GlobalBest;

impl Neighbourhood for GlobalBest {
    fn neighbours(&self, _index: usize, size: usize) -> Vec<usize> {
        (0..size).collect()
    }

    fn name(&self) -> &'static str {
        "gbest"
    }
}

/// Ring lattice (lbest): the member plus `radius` members on each side.
#[derive(Clone, Debug)]
pub struct Ring {
    pub radius: usize,
}

impl Default for Ring {
    fn default() -> Self {
        Self { radius: 1 }
    }
}

impl Neighbourhood for Ring {
    fn neighbours(&self, index: usize, size: usize) -> Vec<usize> {
        if size == 0 {
            return Vec::new();
        }
        let radius = self.radius.min(size / 2);
        let set: BTreeSet<usize> = (0..=2 * radius)
            .map(|offset| (index + size + offset - radius) % size)
            .collect();
        set.into_iter().collect()
    }

    fn name(&self) -> &'static str {
        "lbest"
    }
}

/// Von Neumann grid: the member plus its north, south, east and west
/// neighbours on a wrapping grid with `ceil(sqrt(size))` columns. Moves that
/// land on the missing cells of a ragged last row wrap around.
#[derive(Clone, Debug, Default)]
pub struct VonNeumann;

impl Neighbourhood for VonNeumann {
    fn neighbours(&self, index: usize, size: usize) -> Vec<usize> {
        if size == 0 {
            return Vec::new();
        }
        let cols = (size as f64).sqrt().ceil() as usize;
        let rows = size.div_ceil(cols);
        let (row, col) = (index / cols, index % cols);
        let cell = |r: usize, c: usize| r * cols + c;

        let mut set = BTreeSet::new();
        set.insert(index);

        // north
        let mut r = (row + rows - 1) % rows;
        while cell(r, col) >= size {
            r = (r + rows - 1) % rows;
        }
        set.insert(cell(r, col));

        // south
        let mut r = (row + 1) % rows;
        while cell(r, col) >= size {
            r = (r + 1) % rows;
        }
        set.insert(cell(r, col));

        // east
        let east = cell(row, (col + 1) % cols);
        set.insert(if east >= size { cell(row, 0) } else { east });

        // west
        let west = cell(row, (col + cols - 1) % cols);
        set.insert(if west >= size { size - 1 } else { west });

        set.into_iter().collect()
    }

    fn name(&self) -> &'static str {
        "von-neumann"
    }
}
