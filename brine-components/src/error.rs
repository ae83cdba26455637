use brine_solve::fixed_point;
use thiserror::Error;

/// Errors that abort a simulation call.
///
/// Configuration and input problems are always reported before any stage
/// computation starts, so a failed call never leaves partial results behind.
/// Non-convergence of the recycle loop is not an error; see
/// [`ConvergenceWarning`](crate::recycle::ConvergenceWarning).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("unknown membrane `{id}`")]
    UnknownMembrane { id: String },

    /// The recycle solver failed for a reason other than a model error.
    #[error("recycle solver failed")]
    RecycleSolver(#[source] fixed_point::Error),
}

/// A configuration that is physically inconsistent or infeasible.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("recovery must lie strictly between 0 and 1, got {value}")]
    RecoveryOutOfRange { value: f64 },

    #[error("{stream} flow must be strictly positive, got {value_m3h} m³/h")]
    NonPositiveFlow { stream: &'static str, value_m3h: f64 },

    #[error(
        "feed flow {feed_m3h} m³/h does not equal permeate {permeate_m3h} m³/h \
         plus concentrate {concentrate_m3h} m³/h"
    )]
    FlowImbalance {
        feed_m3h: f64,
        permeate_m3h: f64,
        concentrate_m3h: f64,
    },

    #[error("a stage needs at least one pressure vessel")]
    NoVessels,

    #[error("{elements} elements cannot fill {vessels} vessels")]
    TooFewElements { vessels: usize, elements: usize },

    #[error("target flux must be strictly positive and finite, got {value_lmh} LMH")]
    NonPositiveFlux { value_lmh: f64 },

    #[error("expected stage index {expected}, found {found}")]
    InvalidStageIndex { expected: usize, found: usize },

    #[error("a train needs at least one stage")]
    EmptyTrain,

    #[error(
        "stage {stage} feed ({feed_m3h} m³/h) does not match the previous \
         concentrate ({concentrate_m3h} m³/h)"
    )]
    StageChainMismatch {
        stage: usize,
        feed_m3h: f64,
        concentrate_m3h: f64,
    },

    #[error("recycle split ratio must lie in [0, 1), got {value}")]
    SplitRatioOutOfRange { value: f64 },

    #[error("recycle flow must not be negative, got {value_m3h} m³/h")]
    NegativeRecycleFlow { value_m3h: f64 },

    #[error("disposal flow {disposal_m3h} m³/h is below the minimum of {minimum_m3h} m³/h")]
    DisposalFlowTooLow { disposal_m3h: f64, minimum_m3h: f64 },

    #[error(
        "first stage feed ({stage_feed_m3h} m³/h) does not equal fresh feed \
         ({fresh_m3h} m³/h) plus recycle ({recycle_m3h} m³/h)"
    )]
    FreshFeedMismatch {
        stage_feed_m3h: f64,
        fresh_m3h: f64,
        recycle_m3h: f64,
    },

    #[error("invalid correlation constant: {context}")]
    InvalidCorrelation { context: &'static str },

    #[error("invalid recycle settings: {reason}")]
    InvalidRecycleSettings { reason: &'static str },
}

/// Input data that a correlation cannot evaluate.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum InputError {
    #[error("concentration of `{ion}` must not be negative, got {value} mg/L")]
    NegativeConcentration { ion: String, value: f64 },

    #[error("concentration of `{ion}` is not finite")]
    NonFiniteConcentration { ion: String },

    #[error("temperature must be finite and within (0, 100] °C, got {celsius} °C")]
    InvalidTemperature { celsius: f64 },

    #[error("{context} pressure must be finite and non-negative, got {bar} bar")]
    InvalidPressure { context: &'static str, bar: f64 },

    #[error("ion `{ion}` has no {data} data")]
    MissingIonData { ion: String, data: &'static str },

    #[error("no pressure-drop correlation for {diameter} elements with {spacer} spacers")]
    MissingCorrelation {
        diameter: &'static str,
        spacer: &'static str,
    },

    #[error("water permeability must be strictly positive and finite, got {value} m/s/Pa")]
    InvalidPermeability { value: f64 },

    #[error("rejection of `{ion}` must lie strictly between 0 and 1, got {value}")]
    InvalidRejection { ion: String, value: f64 },

    #[error("computed {quantity} is non-physical: {value}")]
    NonPhysicalResult { quantity: &'static str, value: f64 },
}
