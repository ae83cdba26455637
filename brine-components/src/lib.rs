//! Reverse-osmosis train models.
//!
//! The building blocks, leaf to root:
//!
//! - [`osmotic`]: osmotic pressure, temperature correction, and the
//!   solution-diffusion flux law.
//! - [`stage`]: per-stage quality, pressure sizing, and hydraulics.
//! - [`train`]: the stage sequencer that chains rejects into feeds.
//! - [`recycle`]: the fixed-point loop resolving a recycled concentrate.
//! - [`system`]: configuration, aggregation, and the [`HybridSimulator`].
//!
//! Every call is a pure function of its arguments. Nothing is cached between
//! simulations, so independent runs may execute in parallel freely.

pub mod composition;
pub mod conditions;
pub mod correlations;
pub mod membrane;
pub mod osmotic;
pub mod pump;
pub mod recycle;
pub mod stage;
pub mod system;
pub mod train;
pub mod units;

mod error;

pub use composition::IonComposition;
pub use error::{ConfigError, InputError, SimulationError};
pub use system::{HybridSimulator, SystemConfiguration, SystemResult};
