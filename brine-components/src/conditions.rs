use brine_core::constraint::NonNegative;
use serde::{Deserialize, Serialize};
use uom::si::{
    f64::{Pressure, ThermodynamicTemperature},
    pressure::{atmosphere, bar},
    thermodynamic_temperature::degree_celsius,
};

use crate::{InputError, osmotic::absolute_temperature};

/// Site conditions shared by every stage of a train.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatingConditions {
    /// Feed water temperature.
    pub temperature: ThermodynamicTemperature,
    /// Permeate-side back pressure.
    pub permeate_pressure: Pressure,
    /// Pressure of the fresh feed arriving at the first pump.
    pub feed_supply_pressure: Pressure,
}

impl Default for OperatingConditions {
    fn default() -> Self {
        Self {
            temperature: ThermodynamicTemperature::new::<degree_celsius>(25.0),
            permeate_pressure: Pressure::new::<atmosphere>(1.0),
            feed_supply_pressure: Pressure::new::<atmosphere>(1.0),
        }
    }
}

impl OperatingConditions {
    /// Checks temperature and pressures.
    ///
    /// # Errors
    ///
    /// Returns an error if the temperature is outside (0, 100] °C or either
    /// pressure is negative or non-finite.
    pub fn validate(&self) -> Result<(), InputError> {
        absolute_temperature(self.temperature)?;
        check_pressure("permeate", self.permeate_pressure)?;
        check_pressure("feed supply", self.feed_supply_pressure)
    }
}

fn check_pressure(context: &'static str, pressure: Pressure) -> Result<(), InputError> {
    let value = pressure.get::<bar>();
    let invalid = InputError::InvalidPressure {
        context,
        bar: value,
    };
    if !value.is_finite() {
        return Err(invalid);
    }
    NonNegative::new(pressure).map(|_| ()).map_err(|_| invalid)
}
