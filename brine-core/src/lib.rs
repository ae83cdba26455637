//! Core types for the Brine workspace.
//!
//! This crate holds the pieces shared by the solver and component crates:
//! type-level numeric constraints and the [`Model`](model::Model) seam that
//! lets interchangeable simulation backends be called the same way.

pub mod constraint;
pub mod model;
