use crate::error::{SwarmError, SwarmResult};
use serde::{Deserialize, Serialize};

/// Fixed-length circular history of per-iteration success counts.
///
/// Iteration `i` writes slot `i % len`; the aggregated weight is the sum
/// of all slots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct SuccessWindow {
    entries: Vec<usize>,
}

#[derive(Deserialize)]
struct RawWindow {
    entries: Vec<usize>,
}

impl TryFrom<RawWindow> for SuccessWindow {
    type Error = SwarmError;

    fn try_from(raw: RawWindow) -> SwarmResult<Self> {
        let mut window = Self::new(raw.entries.len())?;
        window.entries = raw.entries;
        Ok(window)
    }
}

impl SuccessWindow {
    pub fn new(size: usize) -> SwarmResult<Self> {
        if size == 0 {
            return Err(SwarmError::config("window_size must be positive"));
        }
        Ok(Self {
            entries: vec![0; size],
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(&mut self, iteration: usize, successes: usize) {
        let slot = iteration % self.entries.len();
        self.entries[slot] = successes;
    }

    pub fn sum(&self) -> usize {
        self.entries.iter().sum()
    }

    pub fn get(&self, slot: usize) -> Option<usize> {
        self.entries.get(slot).copied()
    }

    pub fn entries(&self) -> &[usize] {
        &self.entries
    }
}
