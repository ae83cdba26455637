/// Configuration for the fixed-point solver.
///
/// Convergence uses a hybrid test: an iteration converges only when both the
/// largest relative change and the largest absolute change across all
/// components are within tolerance. Relative change is measured against
/// `max(|x_next|, rel_floor)` so components near zero cannot blow it up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Maximum number of model evaluations.
    pub max_iters: usize,
    /// Tolerance on the largest relative change.
    pub rel_tol: f64,
    /// Tolerance on the largest absolute change.
    pub abs_tol: f64,
    /// Floor applied to the relative-change denominator.
    pub rel_floor: f64,
    /// Under-relaxation factor in `(0, 1]`; `1` is plain substitution.
    pub relaxation: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iters: 100,
            rel_tol: 1e-9,
            abs_tol: 1e-9,
            rel_floor: 1e-12,
            relaxation: 1.0,
        }
    }
}

impl Config {
    /// Validates iteration limits, tolerances, and the relaxation factor.
    ///
    /// # Errors
    ///
    /// Returns a static reason if any setting is out of range.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_iters == 0 {
            return Err("max_iters must be at least 1");
        }
        if !self.rel_tol.is_finite() || self.rel_tol < 0.0 {
            return Err("rel_tol must be finite and non-negative");
        }
        if !self.abs_tol.is_finite() || self.abs_tol < 0.0 {
            return Err("abs_tol must be finite and non-negative");
        }
        if !self.rel_floor.is_finite() || self.rel_floor <= 0.0 {
            return Err("rel_floor must be finite and positive");
        }
        if !self.relaxation.is_finite() || self.relaxation <= 0.0 || self.relaxation > 1.0 {
            return Err("relaxation must be in (0, 1]");
        }
        Ok(())
    }
}
