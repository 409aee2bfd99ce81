use crate::error::{SwarmError, SwarmResult};
use ndarray::Array1;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Optimization direction, fixed at problem setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Direction {
    #[default]
    Minimise,
    Maximise,
}

impl Direction {
    /// `true` when `candidate` is strictly better than `incumbent`.
    /// NaN is never better than anything.
    pub fn is_better(&self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Direction::Minimise => candidate < incumbent,
            Direction::Maximise => candidate > incumbent,
        }
    }

    /// The fitness every real value improves upon.
    pub fn worst(&self) -> f64 {
        match self {
            Direction::Minimise => f64::INFINITY,
            Direction::Maximise => f64::NEG_INFINITY,
        }
    }
}

/// Per-dimension closed interval `[lower[i], upper[i]]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBounds", into = "RawBounds")]
pub struct Bounds {
    lower: Array1<f64>,
    upper: Array1<f64>,
}

/// Serialized form of [`Bounds`]; deserializing goes through [`Bounds::new`].
#[derive(Serialize, Deserialize)]
struct RawBounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl TryFrom<RawBounds> for Bounds {
    type Error = SwarmError;

    fn try_from(raw: RawBounds) -> SwarmResult<Self> {
        Bounds::new(Array1::from(raw.lower), Array1::from(raw.upper))
    }
}

impl From<Bounds> for RawBounds {
    fn from(bounds: Bounds) -> Self {
        RawBounds {
            lower: bounds.lower.to_vec(),
            upper: bounds.upper.to_vec(),
        }
    }
}

impl Bounds {
    pub fn new(lower: Array1<f64>, upper: Array1<f64>) -> SwarmResult<Self> {
        if lower.len() != upper.len() {
            return Err(SwarmError::DimensionMismatch {
                what: "upper bounds",
                expected: lower.len(),
                found: upper.len(),
            });
        }
        for (i, (l, u)) in lower.iter().zip(upper.iter()).enumerate() {
            if l.is_nan() || u.is_nan() || l > u {
                return Err(SwarmError::config(format!(
                    "bound {} is empty: [{}, {}]",
                    i, l, u
                )));
            }
        }
        Ok(Self { lower, upper })
    }

    /// Same interval repeated over `dim` dimensions.
    pub fn uniform(dim: usize, lower: f64, upper: f64) -> SwarmResult<Self> {
        Self::new(Array1::from_elem(dim, lower), Array1::from_elem(dim, upper))
    }

    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    pub fn lower(&self) -> &Array1<f64> {
        &self.lower
    }

    pub fn upper(&self) -> &Array1<f64> {
        &self.upper
    }

    pub fn contains(&self, position: &Array1<f64>) -> bool {
        position.len() == self.len()
            && position
                .iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(x, (l, u))| x >= l && x <= u)
    }

    /// Uniform sample of one dimension.
    pub fn sample_dim(&self, j: usize, rng: &mut dyn RngCore) -> f64 {
        let (l, u) = (self.lower[j], self.upper[j]);
        l + rng.gen::<f64>() * (u - l)
    }

    /// Uniform sample of the whole box.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Array1<f64> {
        Array1::from_shape_fn(self.len(), |j| self.sample_dim(j, rng))
    }

    /// Bounds of the sub-vector `[start, start + len)`.
    pub fn segment(&self, start: usize, len: usize) -> SwarmResult<Bounds> {
        if start + len > self.len() {
            return Err(SwarmError::DimensionMismatch {
                what: "bounds segment",
                expected: self.len(),
                found: start + len,
            });
        }
        let range = start..start + len;
        Ok(Bounds {
            lower: self.lower.slice(ndarray::s![range.clone()]).to_owned(),
            upper: self.upper.slice(ndarray::s![range]).to_owned(),
        })
    }
}

/// Defines the optimization problem.
pub trait Problem: Send + Sync {
    /// The objective function.
    fn objective(&self, variables: &Array1<f64>) -> f64;

    /// Optional constraints. Returns a penalty score (0 if all satisfied).
    fn penalty(&self, _variables: &Array1<f64>) -> f64 {
        0.0
    }

    /// Combined fitness (objective + penalty).
    fn fitness(&self, variables: &Array1<f64>) -> f64 {
        self.objective(variables) + self.penalty(variables)
    }

    /// Number of variables.
    fn dim(&self) -> usize;

    /// Lower and upper bounds for each variable.
    fn bounds(&self) -> (Array1<f64>, Array1<f64>);

    fn direction(&self) -> Direction {
        Direction::Minimise
    }
}

/// A simple problem defined by a closure.
pub struct SimpleProblem<F>
where
    F: Fn(&Array1<f64>) -> f64 + Send + Sync,
{
    pub objective_func: F,
    pub dim: usize,
    pub lower: Array1<f64>,
    pub upper: Array1<f64>,
    pub direction: Direction,
}

impl<F> SimpleProblem<F>
where
    F: Fn(&Array1<f64>) -> f64 + Send + Sync,
{
    /// Minimisation problem over `[lower, upper]^dim`.
    pub fn new(objective_func: F, dim: usize, lower: f64, upper: f64) -> Self {
        Self {
            objective_func,
            dim,
            lower: Array1::from_elem(dim, lower),
            upper: Array1::from_elem(dim, upper),
            direction: Direction::Minimise,
        }
    }

    pub fn maximise(mut self) -> Self {
        self.direction = Direction::Maximise;
        self
    }
}

impl<F> Problem for SimpleProblem<F>
where
    F: Fn(&Array1<f64>) -> f64 + Send + Sync,
{
    fn objective(&self, variables: &Array1<f64>) -> f64 {
        (self.objective_func)(variables)
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn bounds(&self) -> (Array1<f64>, Array1<f64>) {
        (self.lower.clone(), self.upper.clone())
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

/// Counting wrapper around a [`Problem`].
///
/// Every call to [`Evaluator::evaluate`] bumps the evaluation counter, which
/// measurement code reads through [`Evaluator::evaluations`].
pub struct Evaluator<P: Problem> {
    problem: P,
    bounds: Bounds,
    direction: Direction,
    evaluations: AtomicU64,
}

impl<P: Problem> Evaluator<P> {
    pub fn new(problem: P) -> SwarmResult<Self> {
        let (lower, upper) = problem.bounds();
        let bounds = Bounds::new(lower, upper)?;
        if bounds.len() != problem.dim() {
            return Err(SwarmError::DimensionMismatch {
                what: "problem bounds",
                expected: problem.dim(),
                found: bounds.len(),
            });
        }
        let direction = problem.direction();
        Ok(Self {
            problem,
            bounds,
            direction,
            evaluations: AtomicU64::new(0),
        })
    }

    pub fn evaluate(&self, position: &Array1<f64>) -> f64 {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        self.problem.fitness(position)
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn dim(&self) -> usize {
        self.bounds.len()
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }
}
