//! Osmotic pressure, temperature correction, and the solution-diffusion flux law.
//!
//! Water flux through the membrane follows `J = A · TCF · NDP`, where `A` is
//! the water permeability at the reference temperature, `TCF` the Arrhenius
//! temperature correction factor, and `NDP` the net driving pressure.

use serde::{Deserialize, Serialize};
use uom::si::{
    f64::{Pressure, ThermodynamicTemperature, Velocity},
    pressure::{bar, pascal},
    thermodynamic_temperature::{degree_celsius, kelvin},
    velocity::meter_per_second,
};

use crate::{
    ConfigError, InputError, IonComposition, composition::ion, membrane::WaterPermeability,
};

/// Universal gas constant in J/(mol·K).
const GAS_CONSTANT: f64 = 8.314_462_618;

/// Correlation used to estimate osmotic pressure from a composition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum OsmoticModel {
    /// `π[bar] = k · TDS[g/L] · T / T_ref`.
    Empirical {
        bar_per_g_per_l: f64,
        reference_temperature_k: f64,
    },
    /// `π = φ · R · T · Σ cᵢ / Mᵢ`, using catalog molar masses.
    VantHoff { osmotic_coefficient: f64 },
}

impl Default for OsmoticModel {
    fn default() -> Self {
        Self::Empirical {
            bar_per_g_per_l: 0.76,
            reference_temperature_k: 298.15,
        }
    }
}

impl OsmoticModel {
    /// Checks that the model constants are usable.
    ///
    /// # Errors
    ///
    /// Returns an error if any constant is non-finite or not strictly positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = match *self {
            Self::Empirical {
                bar_per_g_per_l,
                reference_temperature_k,
            } => is_positive(bar_per_g_per_l) && is_positive(reference_temperature_k),
            Self::VantHoff {
                osmotic_coefficient,
            } => is_positive(osmotic_coefficient),
        };
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidCorrelation {
                context: "osmotic model",
            })
        }
    }

    /// Estimates the osmotic pressure of `composition` at `temperature`.
    ///
    /// # Errors
    ///
    /// Returns an error if the temperature is out of range, or if the
    /// van 't Hoff model meets an ion with no known molar mass.
    pub fn osmotic_pressure(
        &self,
        composition: &IonComposition,
        temperature: ThermodynamicTemperature,
    ) -> Result<Pressure, InputError> {
        let t = absolute_temperature(temperature)?;

        let pressure = match *self {
            Self::Empirical {
                bar_per_g_per_l,
                reference_temperature_k,
            } => {
                let tds_g_per_l = composition.tds() / 1000.0;
                Pressure::new::<bar>(bar_per_g_per_l * tds_g_per_l * t / reference_temperature_k)
            }
            Self::VantHoff {
                osmotic_coefficient,
            } => {
                // mg/L is g/m³, so c/M is mol/m³ and the product is in Pa.
                let mut molarity = 0.0;
                for (tag, concentration) in composition.iter() {
                    if concentration == 0.0 {
                        continue;
                    }
                    let info = ion::lookup(tag).ok_or_else(|| InputError::MissingIonData {
                        ion: tag.to_owned(),
                        data: "molar mass",
                    })?;
                    molarity += concentration / info.molar_mass;
                }
                Pressure::new::<pascal>(osmotic_coefficient * GAS_CONSTANT * t * molarity)
            }
        };

        finite_pressure("osmotic pressure", pressure)
    }
}

/// Estimates osmotic pressure with the given model.
///
/// # Errors
///
/// See [`OsmoticModel::osmotic_pressure`].
pub fn osmotic_pressure(
    composition: &IonComposition,
    temperature: ThermodynamicTemperature,
    model: &OsmoticModel,
) -> Result<Pressure, InputError> {
    model.osmotic_pressure(composition, temperature)
}

/// Arrhenius-type correction of water permeability for temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureCorrection {
    /// Membrane-family constant `K` in kelvin.
    pub arrhenius_constant: f64,
    pub reference_temperature_k: f64,
}

impl Default for TemperatureCorrection {
    fn default() -> Self {
        Self {
            arrhenius_constant: 2640.0,
            reference_temperature_k: 298.0,
        }
    }
}

impl TemperatureCorrection {
    /// # Errors
    ///
    /// Returns an error if the constants are non-finite or the reference
    /// temperature is not strictly positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arrhenius_constant.is_finite() && is_positive(self.reference_temperature_k) {
            Ok(())
        } else {
            Err(ConfigError::InvalidCorrelation {
                context: "temperature correction",
            })
        }
    }

    /// Returns `exp(K · (1/T_ref − 1/T))`.
    ///
    /// # Errors
    ///
    /// Returns an error if the temperature is out of range.
    pub fn factor(&self, temperature: ThermodynamicTemperature) -> Result<f64, InputError> {
        let t = absolute_temperature(temperature)?;
        let tcf = (self.arrhenius_constant * (1.0 / self.reference_temperature_k - 1.0 / t)).exp();
        if tcf.is_finite() && tcf > 0.0 {
            Ok(tcf)
        } else {
            Err(InputError::NonPhysicalResult {
                quantity: "temperature correction factor",
                value: tcf,
            })
        }
    }
}

/// Temperature correction factor for permeability.
///
/// # Errors
///
/// Returns an error if the temperature is out of range.
pub fn temperature_correction_factor(
    temperature: ThermodynamicTemperature,
    correction: &TemperatureCorrection,
) -> Result<f64, InputError> {
    correction.factor(temperature)
}

/// Net driving pressure needed to push `flux` through a membrane.
///
/// Inverts `J = A · TCF · NDP`.
///
/// # Errors
///
/// Returns an error if the flux is negative or non-finite, or the
/// temperature is out of range.
pub fn required_net_driving_pressure(
    flux: Velocity,
    permeability: WaterPermeability,
    temperature: ThermodynamicTemperature,
    correction: &TemperatureCorrection,
) -> Result<Pressure, InputError> {
    let j = flux.get::<meter_per_second>();
    if !j.is_finite() || j < 0.0 {
        return Err(InputError::NonPhysicalResult {
            quantity: "flux",
            value: j,
        });
    }

    let tcf = correction.factor(temperature)?;
    let ndp = Pressure::new::<pascal>(j / (permeability.get() * tcf));

    finite_pressure("net driving pressure", ndp)
}

/// Returns the temperature in kelvin if it describes liquid water.
pub(crate) fn absolute_temperature(temperature: ThermodynamicTemperature) -> Result<f64, InputError> {
    let celsius = temperature.get::<degree_celsius>();
    if celsius.is_finite() && celsius > 0.0 && celsius <= 100.0 {
        Ok(temperature.get::<kelvin>())
    } else {
        Err(InputError::InvalidTemperature { celsius })
    }
}

fn finite_pressure(quantity: &'static str, pressure: Pressure) -> Result<Pressure, InputError> {
    let value = pressure.get::<bar>();
    if value.is_finite() && value >= 0.0 {
        Ok(pressure)
    } else {
        Err(InputError::NonPhysicalResult { quantity, value })
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
