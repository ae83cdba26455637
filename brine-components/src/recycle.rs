//! Recycle convergence.
//!
//! When part of the final concentrate is sent back to the feed, the train's
//! feed composition depends on its own output. The recycle composition is
//! found by fixed-point iteration on its per-ion concentrations: blend fresh
//! feed with the current recycle estimate, run the train, and take the final
//! reject as the next estimate.

use std::convert::Infallible;

use brine_solve::fixed_point::{self, Action, Event, FixedPointProblem, Status};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uom::si::f64::VolumeRate;

use crate::{
    ConfigError, IonComposition, SimulationError,
    train::{Train, TrainResult},
};

/// Iteration controls for the recycle loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecycleSettings {
    pub max_iterations: usize,
    /// Largest allowed per-ion change relative to the new concentration.
    pub relative_tolerance: f64,
    /// Largest allowed per-ion change in mg/L.
    pub absolute_tolerance_mg_l: f64,
    /// Concentration floor in the relative-change denominator, in mg/L.
    pub concentration_floor_mg_l: f64,
    /// Initial recycle composition as a multiple of the fresh feed.
    pub seed_factor: f64,
    /// Under-relaxation factor in `(0, 1]`; 1 is plain substitution.
    pub relaxation: f64,
    /// Smallest disposal flow accepted, in m³/h.
    pub min_disposal_flow_m3h: f64,
}

impl Default for RecycleSettings {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            relative_tolerance: 1e-3,
            absolute_tolerance_mg_l: 1.0,
            concentration_floor_mg_l: 0.1,
            seed_factor: 3.0,
            relaxation: 1.0,
            min_disposal_flow_m3h: 0.1,
        }
    }
}

impl RecycleSettings {
    /// # Errors
    ///
    /// Returns an error for a zero iteration budget, negative tolerances, a
    /// non-positive floor, a negative seed, or relaxation outside `(0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let reason = if self.max_iterations == 0 {
            "max_iterations must be at least 1"
        } else if !non_negative(self.relative_tolerance) || !non_negative(self.absolute_tolerance_mg_l)
        {
            "tolerances must be finite and non-negative"
        } else if !(self.concentration_floor_mg_l.is_finite() && self.concentration_floor_mg_l > 0.0)
        {
            "concentration floor must be strictly positive"
        } else if !non_negative(self.seed_factor) {
            "seed factor must be finite and non-negative"
        } else if !(self.relaxation > 0.0 && self.relaxation <= 1.0) {
            "relaxation must lie in (0, 1]"
        } else if !non_negative(self.min_disposal_flow_m3h) {
            "minimum disposal flow must be finite and non-negative"
        } else {
            return Ok(());
        };
        Err(ConfigError::InvalidRecycleSettings { reason })
    }

    fn solver_config(&self) -> fixed_point::Config {
        fixed_point::Config {
            max_iters: self.max_iterations,
            rel_tol: self.relative_tolerance,
            abs_tol: self.absolute_tolerance_mg_l,
            rel_floor: self.concentration_floor_mg_l,
            relaxation: self.relaxation,
        }
    }
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Diagnostics of a finished recycle loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecycleConvergence {
    /// Train evaluations performed.
    pub iterations: usize,
    pub max_relative_change: f64,
    /// Largest per-ion change in mg/L.
    pub max_absolute_change: f64,
    pub converged: bool,
    /// TDS of the blended feed of the reported iterate, in mg/L.
    pub blended_feed_tds_mg_l: f64,
}

impl RecycleConvergence {
    /// Returns a warning if the loop stopped without converging.
    #[must_use]
    pub fn warning(&self) -> Option<ConvergenceWarning> {
        (!self.converged).then_some(ConvergenceWarning {
            iterations: self.iterations,
            max_relative_change: self.max_relative_change,
            max_absolute_change: self.max_absolute_change,
        })
    }
}

/// The recycle loop ran out of iterations.
///
/// This is not fatal: the last iterate is still returned so it can be
/// inspected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error(
    "recycle loop did not converge in {iterations} iterations \
     (max relative change {max_relative_change:.3e}, max absolute change \
     {max_absolute_change:.3} mg/L)"
)]
pub struct ConvergenceWarning {
    pub iterations: usize,
    pub max_relative_change: f64,
    pub max_absolute_change: f64,
}

/// Fresh and recycle streams entering the first stage.
#[derive(Debug, Clone, Copy)]
pub struct RecycleStreams<'a> {
    pub fresh: &'a IonComposition,
    pub fresh_flow: VolumeRate,
    pub recycle_flow: VolumeRate,
}

/// Maps recycle concentrations to a blended feed and the train's final
/// reject back to recycle concentrations.
struct RecycleProblem<'a> {
    streams: RecycleStreams<'a>,
    ions: Vec<String>,
}

impl RecycleProblem<'_> {
    fn recycle_composition(&self, x: &[f64]) -> Result<IonComposition, SimulationError> {
        Ok(IonComposition::new(
            self.ions.iter().map(String::as_str).zip(x.iter().copied()),
        )?)
    }
}

impl FixedPointProblem for RecycleProblem<'_> {
    type Input = IonComposition;
    type Output = TrainResult;
    type InputError = SimulationError;
    type UpdateError = Infallible;

    fn input(&self, x: &[f64]) -> Result<Self::Input, Self::InputError> {
        let recycle = self.recycle_composition(x)?;
        Ok(IonComposition::blend(&[
            (self.streams.fresh, self.streams.fresh_flow),
            (&recycle, self.streams.recycle_flow),
        ])?)
    }

    fn update(
        &self,
        _input: &Self::Input,
        output: &Self::Output,
    ) -> Result<Vec<f64>, Self::UpdateError> {
        let reject = output.final_stage().map(|stage| &stage.reject);
        Ok(self
            .ions
            .iter()
            .map(|ion| reject.map_or(0.0, |r| r.get(ion)))
            .collect())
    }
}

/// Result of a converged (or exhausted) recycle loop.
#[derive(Debug, Clone, PartialEq)]
pub struct RecycleOutcome {
    pub train: TrainResult,
    /// Feed entering the first stage on the reported iterate.
    pub blended_feed: IonComposition,
    pub convergence: RecycleConvergence,
}

/// Iterates the train until the recycle composition settles.
///
/// Exhausting the iteration budget is not an error. The last iterate is
/// returned with `converged == false` and a warning is logged.
///
/// # Errors
///
/// Returns an error if the settings are invalid or any train evaluation
/// fails.
pub fn converge(
    train: &Train<'_>,
    streams: RecycleStreams<'_>,
    settings: &RecycleSettings,
) -> Result<RecycleOutcome, SimulationError> {
    settings.validate()?;

    let problem = RecycleProblem {
        streams,
        ions: streams.fresh.ions().map(str::to_owned).collect(),
    };
    let seed: Vec<f64> = streams
        .fresh
        .iter()
        .map(|(_, value)| value * settings.seed_factor)
        .collect();

    let observer = |event: &Event<'_, IonComposition, TrainResult>| -> Option<Action> {
        log::debug!(
            "recycle iteration {}: blended feed {:.1} mg/L, max change {:.3e} rel / {:.3} mg/L",
            event.iter,
            event.snapshot.input.tds(),
            event.change.max_relative,
            event.change.max_absolute,
        );
        None
    };

    let solution = fixed_point::solve(train, &problem, seed, &settings.solver_config(), observer)
        .map_err(from_solver_error)?;

    let convergence = RecycleConvergence {
        iterations: solution.iters,
        max_relative_change: solution.change.max_relative,
        max_absolute_change: solution.change.max_absolute,
        converged: solution.status == Status::Converged,
        blended_feed_tds_mg_l: solution.snapshot.input.tds(),
    };
    if let Some(warning) = convergence.warning() {
        log::warn!("{warning}");
    }

    Ok(RecycleOutcome {
        train: solution.snapshot.output,
        blended_feed: solution.snapshot.input,
        convergence,
    })
}

/// Recovers simulation errors that passed through the solver boxed.
fn from_solver_error(err: fixed_point::Error) -> SimulationError {
    match err {
        fixed_point::Error::Input(source) => match source.downcast::<SimulationError>() {
            Ok(inner) => *inner,
            Err(source) => SimulationError::RecycleSolver(fixed_point::Error::Input(source)),
        },
        fixed_point::Error::Model(source) => match source.downcast::<SimulationError>() {
            Ok(inner) => *inner,
            Err(source) => SimulationError::RecycleSolver(fixed_point::Error::Model(source)),
        },
        other => SimulationError::RecycleSolver(other),
    }
}
