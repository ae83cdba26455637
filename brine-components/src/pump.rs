//! Feed and booster pumps.
//!
//! Efficiency is a coarse step function of discharge pressure: small
//! low-pressure pumps are less efficient than the large multistage pumps
//! used at high pressure.

use serde::{Deserialize, Serialize};
use uom::si::{
    f64::{Power, Pressure, VolumeRate},
    pressure::bar,
};

use crate::ConfigError;

/// Pump size class selected by discharge pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyTier {
    Low,
    Medium,
    High,
}

/// Discharge pressure limits and efficiency of each tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PumpEfficiencyTiers {
    /// Discharge pressures below this use the low tier.
    pub low_limit_bar: f64,
    /// Discharge pressures at or above this use the high tier.
    pub high_limit_bar: f64,
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for PumpEfficiencyTiers {
    fn default() -> Self {
        Self {
            low_limit_bar: 10.0,
            high_limit_bar: 40.0,
            low: 0.70,
            medium: 0.78,
            high: 0.83,
        }
    }
}

impl PumpEfficiencyTiers {
    /// # Errors
    ///
    /// Returns an error unless `0 < low_limit < high_limit` and every
    /// efficiency lies in `(0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits_ok = self.low_limit_bar.is_finite()
            && self.high_limit_bar.is_finite()
            && 0.0 < self.low_limit_bar
            && self.low_limit_bar < self.high_limit_bar;
        let efficiencies_ok = [self.low, self.medium, self.high]
            .iter()
            .all(|&eta| eta > 0.0 && eta <= 1.0);

        if !limits_ok {
            return Err(ConfigError::InvalidCorrelation {
                context: "pump tier pressure limits",
            });
        }
        if !efficiencies_ok {
            return Err(ConfigError::InvalidCorrelation {
                context: "pump efficiency",
            });
        }
        Ok(())
    }

    /// Selects the tier for a pump discharging at `discharge`.
    #[must_use]
    pub fn tier(&self, discharge: Pressure) -> EfficiencyTier {
        let p = discharge.get::<bar>();
        if p < self.low_limit_bar {
            EfficiencyTier::Low
        } else if p < self.high_limit_bar {
            EfficiencyTier::Medium
        } else {
            EfficiencyTier::High
        }
    }

    #[must_use]
    pub fn efficiency(&self, tier: EfficiencyTier) -> f64 {
        match tier {
            EfficiencyTier::Low => self.low,
            EfficiencyTier::Medium => self.medium,
            EfficiencyTier::High => self.high,
        }
    }
}

/// Operating point of one stage pump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PumpResult {
    pub suction: Pressure,
    pub discharge: Pressure,
    /// Pressure added by the pump, zero when none is needed.
    pub pressure_rise: Pressure,
    pub tier: EfficiencyTier,
    pub efficiency: f64,
    /// Shaft power drawn.
    pub power: Power,
}

impl PumpResult {
    /// Returns `true` if the stage actually needs a pump.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.pressure_rise.get::<bar>() > 0.0
    }
}

/// Sizes the pump that raises `flow` from `suction` to `discharge`.
///
/// If the suction pressure already covers the discharge pressure no pump is
/// needed and the rise and power are zero. A throttling valve is assumed to
/// take up any excess.
#[must_use]
pub fn pump(
    flow: VolumeRate,
    suction: Pressure,
    discharge: Pressure,
    tiers: &PumpEfficiencyTiers,
) -> PumpResult {
    let tier = tiers.tier(discharge);
    let efficiency = tiers.efficiency(tier);

    let pressure_rise = if discharge > suction {
        discharge - suction
    } else {
        Pressure::new::<bar>(0.0)
    };
    let power: Power = flow * pressure_rise / efficiency;

    PumpResult {
        suction,
        discharge,
        pressure_rise,
        tier,
        efficiency,
        power,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{power::kilowatt, volume_rate::cubic_meter_per_hour};

    #[test]
    fn tiers_follow_discharge_pressure() {
        let tiers = PumpEfficiencyTiers::default();
        assert_eq!(tiers.tier(Pressure::new::<bar>(9.99)), EfficiencyTier::Low);
        assert_eq!(tiers.tier(Pressure::new::<bar>(10.0)), EfficiencyTier::Medium);
        assert_eq!(tiers.tier(Pressure::new::<bar>(39.9)), EfficiencyTier::Medium);
        assert_eq!(tiers.tier(Pressure::new::<bar>(40.0)), EfficiencyTier::High);
    }

    #[test]
    fn power_is_flow_times_rise_over_efficiency() {
        let result = pump(
            VolumeRate::new::<cubic_meter_per_hour>(36.0),
            Pressure::new::<bar>(1.0),
            Pressure::new::<bar>(15.0),
            &PumpEfficiencyTiers::default(),
        );

        // 0.01 m³/s × 14e5 Pa / 0.78
        assert_eq!(result.tier, EfficiencyTier::Medium);
        assert_relative_eq!(result.pressure_rise.get::<bar>(), 14.0, epsilon = 1e-12);
        assert_relative_eq!(result.power.get::<kilowatt>(), 14.0 / 0.78, epsilon = 1e-9);
        assert!(result.is_running());
    }

    #[test]
    fn no_booster_when_suction_suffices() {
        let result = pump(
            VolumeRate::new::<cubic_meter_per_hour>(50.0),
            Pressure::new::<bar>(12.0),
            Pressure::new::<bar>(11.0),
            &PumpEfficiencyTiers::default(),
        );

        assert!(!result.is_running());
        assert_relative_eq!(result.power.get::<kilowatt>(), 0.0);
    }

    #[test]
    fn validation_catches_bad_tiers() {
        let tiers = PumpEfficiencyTiers {
            medium: 1.2,
            ..PumpEfficiencyTiers::default()
        };
        assert!(tiers.validate().is_err());

        let tiers = PumpEfficiencyTiers {
            low_limit_bar: 50.0,
            ..PumpEfficiencyTiers::default()
        };
        assert!(tiers.validate().is_err());
        assert!(PumpEfficiencyTiers::default().validate().is_ok());
    }
}
