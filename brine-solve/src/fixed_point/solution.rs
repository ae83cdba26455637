use brine_core::model::Snapshot;

/// Indicates whether the solver converged or stopped for another reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Converged according to the configured tolerances.
    Converged,
    /// Reached the iteration limit without converging.
    MaxIters,
    /// Stopped early due to an observer decision.
    StoppedByObserver,
}

/// Largest componentwise change between an iterate and its update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Change {
    /// Largest `|g(x) - x| / max(|g(x)|, floor)` across components.
    pub max_relative: f64,
    /// Largest `|g(x) - x|` across components.
    pub max_absolute: f64,
}

impl Change {
    /// Measures the change from `x` to `next`.
    ///
    /// Both slices must have the same length.
    #[must_use]
    pub fn between(x: &[f64], next: &[f64], rel_floor: f64) -> Self {
        x.iter().zip(next).fold(
            Self {
                max_relative: 0.0,
                max_absolute: 0.0,
            },
            |acc, (&old, &new)| {
                let absolute = (new - old).abs();
                let relative = absolute / new.abs().max(rel_floor);
                Self {
                    max_relative: acc.max_relative.max(relative),
                    max_absolute: acc.max_absolute.max(absolute),
                }
            },
        )
    }

    /// Returns `true` if both changes are within their tolerances.
    #[must_use]
    pub fn is_within(&self, rel_tol: f64, abs_tol: f64) -> bool {
        self.max_relative <= rel_tol && self.max_absolute <= abs_tol
    }
}

/// The result of a fixed-point solve.
///
/// The snapshot always belongs to the last evaluated iterate `x`, so a caller
/// inspecting a non-converged solution sees a self-consistent model call.
#[derive(Debug, Clone)]
pub struct Solution<I, O> {
    /// Final solver status.
    pub status: Status,
    /// Last evaluated iterate.
    pub x: Vec<f64>,
    /// Update `g(x)` produced by the last evaluation.
    pub update: Vec<f64>,
    /// Change between `x` and `update`.
    pub change: Change,
    /// Model input and output at `x`.
    pub snapshot: Snapshot<I, O>,
    /// Number of model evaluations performed.
    pub iters: usize,
}
