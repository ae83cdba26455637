//! Numerical solvers for the Brine workspace.
//!
//! Solvers drive a [`brine_core::model::Model`] and report a tagged status
//! instead of treating iteration exhaustion as an error.

pub mod fixed_point;
mod observe;

pub use observe::Observer;
