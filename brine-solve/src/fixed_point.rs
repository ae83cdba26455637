//! Bounded fixed-point iteration.
//!
//! Solves `x = g(x)` by repeated substitution, where `g` is a model call
//! wrapped by a [`FixedPointProblem`]. The loop always terminates: either the
//! hybrid relative/absolute tolerance is met, an observer stops it, or the
//! iteration budget runs out. Exhaustion returns the last iterate tagged with
//! [`Status::MaxIters`] rather than an error.

mod config;
mod error;
mod problem;
mod solution;

pub use config::Config;
pub use error::Error;
pub use problem::FixedPointProblem;
pub use solution::{Change, Solution, Status};

use brine_core::model::{Model, Snapshot};

use crate::Observer;

/// Control actions supported by the fixed-point solver.
pub enum Action {
    /// Stop the solver early, keeping the current evaluation.
    StopEarly,
}

/// Iteration event emitted by the fixed-point solver.
pub struct Event<'a, I, O> {
    /// Iteration counter (1-based).
    pub iter: usize,
    /// Iterate that was evaluated.
    pub x: &'a [f64],
    /// Update `g(x)` produced by the evaluation.
    pub update: &'a [f64],
    /// Change between `x` and the update.
    pub change: Change,
    /// Model input and output at `x`.
    pub snapshot: &'a Snapshot<I, O>,
}

/// Iterates `x ← x + ω·(g(x) − x)` from `x0` until convergence.
///
/// Observers see every evaluation before the convergence decision.
///
/// # Errors
///
/// Returns an error if the config or initial guess is invalid, an update is
/// non-finite or has the wrong length, or the model or problem fails.
pub fn solve<M, P, Obs>(
    model: &M,
    problem: &P,
    x0: Vec<f64>,
    config: &Config,
    mut observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: FixedPointProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a, M::Input, M::Output>, Action>,
{
    config
        .validate()
        .map_err(|reason| Error::InvalidConfig { reason })?;

    if let Some((index, &value)) = x0.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(Error::NonFiniteGuess { index, value });
    }

    let mut x = x0;
    let mut iter = 0;

    loop {
        iter += 1;

        let input = problem
            .input(&x)
            .map_err(|err| Error::Input(Box::new(err)))?;
        let output = model
            .call(&input)
            .map_err(|err| Error::Model(Box::new(err)))?;
        let update = problem
            .update(&input, &output)
            .map_err(|err| Error::Update(Box::new(err)))?;

        if update.len() != x.len() {
            return Err(Error::DimensionMismatch {
                expected: x.len(),
                found: update.len(),
            });
        }
        if let Some((index, &value)) = update.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(Error::NonFiniteUpdate { iter, index, value });
        }

        let change = Change::between(&x, &update, config.rel_floor);
        let snapshot = Snapshot::new(input, output);

        let event = Event {
            iter,
            x: &x,
            update: &update,
            change,
            snapshot: &snapshot,
        };

        let status = match observer.observe(&event) {
            Some(Action::StopEarly) => Some(Status::StoppedByObserver),
            None if change.is_within(config.rel_tol, config.abs_tol) => Some(Status::Converged),
            None if iter >= config.max_iters => Some(Status::MaxIters),
            None => None,
        };

        if let Some(status) = status {
            return Ok(Solution {
                status,
                x,
                update,
                change,
                snapshot,
                iters: iter,
            });
        }

        x = relax(&x, &update, config.relaxation);
    }
}

/// Runs the solver without observation.
///
/// # Errors
///
/// Returns the same errors as [`solve`].
pub fn solve_unobserved<M, P>(
    model: &M,
    problem: &P,
    x0: Vec<f64>,
    config: &Config,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: FixedPointProblem<Input = M::Input, Output = M::Output>,
{
    solve(model, problem, x0, config, ())
}

/// Blends the current iterate toward its update by `omega`.
fn relax(x: &[f64], update: &[f64], omega: f64) -> Vec<f64> {
    if omega >= 1.0 {
        return update.to_vec();
    }
    x.iter()
        .zip(update)
        .map(|(old, new)| old + omega * (new - old))
        .collect()
}
