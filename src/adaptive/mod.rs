//! Adaptive behavior reassignment
//!
//! Success windows, change detectors, selectors and the iteration that ties
//! them together.

pub mod detection;
pub mod engine;
pub mod selection;
pub mod window;

pub use detection::{AnyDetector, BehaviorChangeDetector, PeriodicDetection, PersonalBestStagnation};
pub use engine::AdaptiveHeterogeneousIteration;
pub use selection::{BehaviorSelector, RandomSelector, RouletteWheelSelector, TournamentSelector};
pub use window::SuccessWindow;
