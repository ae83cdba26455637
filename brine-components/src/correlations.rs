//! Empirical constants, gathered so they can be recalibrated as data.

use serde::{Deserialize, Serialize};

use crate::{
    ConfigError,
    osmotic::{OsmoticModel, TemperatureCorrection},
    pump::PumpEfficiencyTiers,
    stage::hydraulics::PressureDropTable,
};

/// All literature-sourced correlation constants used by a simulation.
///
/// Missing sections deserialize to their defaults, so a TOML file only needs
/// to name what it overrides:
///
/// ```
/// use brine_components::correlations::Correlations;
///
/// let c: Correlations = toml::from_str(
///     r#"
///     [pump_efficiency]
///     high = 0.85
///     "#,
/// )
/// .unwrap();
/// assert_eq!(c.pump_efficiency.high, 0.85);
/// assert_eq!(c.pump_efficiency.low, 0.70);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Correlations {
    pub osmotic: OsmoticModel,
    pub temperature_correction: TemperatureCorrection,
    pub pump_efficiency: PumpEfficiencyTiers,
    pub pressure_drop: PressureDropTable,
}

impl Correlations {
    /// Checks every constant.
    ///
    /// # Errors
    ///
    /// Returns the first invalid constant found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.osmotic.validate()?;
        self.temperature_correction.validate()?;
        self.pump_efficiency.validate()?;
        self.pressure_drop.validate()
    }
}
