//! Particle behaviors
//!
//! A [`Behavior`] bundles the four capability strategies that drive one
//! particle update (velocity, position, boundary, personal best) together
//! with the adaptive-selection counters. Behaviors are created once and
//! shared through [`BehaviorRef`]; two references denote the same behavior
//! only when they point at the same allocation.

pub mod boundary;
pub mod personal_best;
pub mod position;
pub mod velocity;

pub use boundary::{
    BoundaryConstraint, ClampBoundary, CompositeBoundary, RandomBoundary, ReflectBoundary,
    Unconstrained,
};
pub use personal_best::{BoundedPersonalBest, PersonalBestUpdate, StandardPersonalBest};
pub use position::{LinearPosition, PositionProvider, VelocityAsPosition};
pub use velocity::{BareBonesVelocity, ClampedVelocity, StandardVelocity, VelocityProvider};

use crate::error::{SwarmError, SwarmResult};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared handle to a behavior. Identity is pointer identity.
pub type BehaviorRef = Arc<Behavior>;

pub struct Behavior {
    name: String,
    velocity: Arc<dyn VelocityProvider>,
    position: Arc<dyn PositionProvider>,
    boundary: Arc<dyn BoundaryConstraint>,
    personal_best: Arc<dyn PersonalBestUpdate>,
    /// Personal-best improvements attributed to this behavior in the current iteration
    successes: AtomicUsize,
    /// Times the selector picked this behavior, over the whole run
    selections: AtomicUsize,
}

impl Behavior {
    pub fn builder(name: impl Into<String>) -> BehaviorBuilder {
        BehaviorBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn velocity(&self) -> &dyn VelocityProvider {
        self.velocity.as_ref()
    }

    pub fn position(&self) -> &dyn PositionProvider {
        self.position.as_ref()
    }

    pub fn boundary(&self) -> &dyn BoundaryConstraint {
        self.boundary.as_ref()
    }

    pub fn personal_best(&self) -> &dyn PersonalBestUpdate {
        self.personal_best.as_ref()
    }

    pub fn successes(&self) -> usize {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn selections(&self) -> usize {
        self.selections.load(Ordering::Relaxed)
    }

    pub(crate) fn reset_successes(&self) {
        self.successes.store(0, Ordering::Relaxed);
    }

    pub(crate) fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_selection(&self) {
        self.selections.fetch_add(1, Ordering::Relaxed);
    }

    /// Pointer identity between two behavior handles.
    pub fn same(a: &BehaviorRef, b: &BehaviorRef) -> bool {
        Arc::ptr_eq(a, b)
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("name", &self.name)
            .field("successes", &self.successes())
            .field("selections", &self.selections())
            .finish()
    }
}

/// Builder for [`Behavior`]. Unset strategies fall back to the classic
/// inertia PSO pieces with no boundary handling.
pub struct BehaviorBuilder {
    name: String,
    velocity: Option<Arc<dyn VelocityProvider>>,
    position: Option<Arc<dyn PositionProvider>>,
    boundary: Option<Arc<dyn BoundaryConstraint>>,
    personal_best: Option<Arc<dyn PersonalBestUpdate>>,
}

impl BehaviorBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            velocity: None,
            position: None,
            boundary: None,
            personal_best: None,
        }
    }

    pub fn velocity(mut self, velocity: impl VelocityProvider + 'static) -> Self {
        self.velocity = Some(Arc::new(velocity));
        self
    }

    pub fn position(mut self, position: impl PositionProvider + 'static) -> Self {
        self.position = Some(Arc::new(position));
        self
    }

    pub fn boundary(mut self, boundary: impl BoundaryConstraint + 'static) -> Self {
        self.boundary = Some(Arc::new(boundary));
        self
    }

    /// Share an existing boundary strategy between several behaviors.
    pub fn shared_boundary(mut self, boundary: Arc<dyn BoundaryConstraint>) -> Self {
        self.boundary = Some(boundary);
        self
    }

    pub fn personal_best(mut self, personal_best: impl PersonalBestUpdate + 'static) -> Self {
        self.personal_best = Some(Arc::new(personal_best));
        self
    }

    pub fn build(self) -> BehaviorRef {
        Arc::new(Behavior {
            name: self.name,
            velocity: self
                .velocity
                .unwrap_or_else(|| Arc::new(StandardVelocity::default())),
            position: self.position.unwrap_or_else(|| Arc::new(LinearPosition)),
            boundary: self.boundary.unwrap_or_else(|| Arc::new(Unconstrained)),
            personal_best: self
                .personal_best
                .unwrap_or_else(|| Arc::new(StandardPersonalBest)),
            successes: AtomicUsize::new(0),
            selections: AtomicUsize::new(0),
        })
    }
}

/// Ordered, non-empty set of behaviors available for reassignment.
#[derive(Clone, Debug)]
pub struct BehaviorPool {
    behaviors: Vec<BehaviorRef>,
}

impl BehaviorPool {
    pub fn new(behaviors: Vec<BehaviorRef>) -> SwarmResult<Self> {
        if behaviors.is_empty() {
            return Err(SwarmError::config("behavior pool is empty"));
        }
        Ok(Self { behaviors })
    }

    /// The classic heterogeneous PSO pool: standard, cognitive-only,
    /// social-only and barebones, all sharing one boundary strategy.
    pub fn classic(boundary: Arc<dyn BoundaryConstraint>) -> Self {
        let behaviors = vec![
            Behavior::builder("standard")
                .velocity(StandardVelocity::default())
                .shared_boundary(boundary.clone())
                .build(),
            Behavior::builder("cognitive-only")
                .velocity(StandardVelocity::cognitive_only())
                .shared_boundary(boundary.clone())
                .build(),
            Behavior::builder("social-only")
                .velocity(StandardVelocity::social_only())
                .shared_boundary(boundary.clone())
                .build(),
            Behavior::builder("barebones")
                .velocity(BareBonesVelocity)
                .position(VelocityAsPosition)
                .shared_boundary(boundary)
                .build(),
        ];
        Self { behaviors }
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BehaviorRef> {
        self.behaviors.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BehaviorRef> {
        self.behaviors.iter()
    }

    pub fn as_slice(&self) -> &[BehaviorRef] {
        &self.behaviors
    }

    /// Pool position of `behavior`, by identity.
    pub fn index_of(&self, behavior: &BehaviorRef) -> Option<usize> {
        self.behaviors.iter().position(|b| Behavior::same(b, behavior))
    }
}
