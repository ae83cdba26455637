//! Feed-channel pressure drop.
//!
//! A quick-estimate correlation: the average of feed and reject flow per
//! vessel sets the per-element drop `ΔP = k · Qⁿ`, and elements in series add
//! up. The constants are only trustworthy inside each entry's flow envelope.

use serde::{Deserialize, Serialize};
use uom::si::{
    f64::{Pressure, VolumeRate},
    pressure::bar,
    volume_rate::cubic_meter_per_hour,
};

use crate::{ConfigError, InputError};

use super::{StageFlows, StageLayout};

/// Nominal element diameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementDiameter {
    FourInch,
    EightInch,
}

impl ElementDiameter {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::FourInch => "4-inch",
            Self::EightInch => "8-inch",
        }
    }
}

/// Feed spacer thickness in mil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpacerThickness {
    Mil28,
    Mil31,
    Mil34,
}

impl SpacerThickness {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Mil28 => "28 mil",
            Self::Mil31 => "31 mil",
            Self::Mil34 => "34 mil",
        }
    }
}

/// Correlation constants for one geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureDropEntry {
    pub diameter: ElementDiameter,
    pub spacer: SpacerThickness,
    /// `k` in bar per element at unit flow (m³/h).
    pub coefficient: f64,
    /// `n`.
    pub exponent: f64,
    /// Lower edge of the calibrated average vessel flow, in m³/h.
    pub min_vessel_flow_m3h: f64,
    /// Upper edge of the calibrated average vessel flow, in m³/h.
    pub max_vessel_flow_m3h: f64,
}

impl PressureDropEntry {
    /// Pressure drop across one element at an average flow in m³/h.
    #[must_use]
    pub fn element_drop_bar(&self, flow_m3h: f64) -> f64 {
        self.coefficient * flow_m3h.powf(self.exponent)
    }

    #[must_use]
    pub fn contains(&self, flow_m3h: f64) -> bool {
        (self.min_vessel_flow_m3h..=self.max_vessel_flow_m3h).contains(&flow_m3h)
    }
}

/// Pressure-drop constants by geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureDropTable {
    pub entries: Vec<PressureDropEntry>,
}

impl Default for PressureDropTable {
    fn default() -> Self {
        use ElementDiameter::{EightInch, FourInch};
        use SpacerThickness::{Mil28, Mil31, Mil34};

        let entry = |diameter, spacer, coefficient, min, max| PressureDropEntry {
            diameter,
            spacer,
            coefficient,
            exponent: 1.7,
            min_vessel_flow_m3h: min,
            max_vessel_flow_m3h: max,
        };

        Self {
            entries: vec![
                entry(EightInch, Mil28, 0.0052, 3.0, 16.0),
                entry(EightInch, Mil31, 0.0046, 3.0, 16.0),
                entry(EightInch, Mil34, 0.0040, 3.0, 16.0),
                entry(FourInch, Mil28, 0.040, 0.7, 3.6),
                entry(FourInch, Mil31, 0.035, 0.7, 3.6),
                entry(FourInch, Mil34, 0.031, 0.7, 3.6),
            ],
        }
    }
}

impl PressureDropTable {
    /// Finds the entry for a geometry.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::MissingCorrelation`] if no entry matches.
    pub fn entry(
        &self,
        diameter: ElementDiameter,
        spacer: SpacerThickness,
    ) -> Result<&PressureDropEntry, InputError> {
        self.entries
            .iter()
            .find(|e| e.diameter == diameter && e.spacer == spacer)
            .ok_or(InputError::MissingCorrelation {
                diameter: diameter.label(),
                spacer: spacer.label(),
            })
    }

    /// # Errors
    ///
    /// Returns an error if any entry has non-positive constants or an empty
    /// flow envelope.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid = self.entries.iter().all(|e| {
            e.coefficient.is_finite()
                && e.coefficient > 0.0
                && e.exponent.is_finite()
                && e.exponent > 0.0
                && e.min_vessel_flow_m3h >= 0.0
                && e.min_vessel_flow_m3h < e.max_vessel_flow_m3h
        });
        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidCorrelation {
                context: "pressure-drop table",
            })
        }
    }
}

/// Hydraulic state of one stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HydraulicResult {
    /// Arithmetic mean of feed and reject flow, per vessel.
    pub average_vessel_flow: VolumeRate,
    pub element_drop: Pressure,
    /// Average elements in series per vessel.
    pub elements_per_vessel: f64,
    /// Feed-to-reject drop across the stage.
    pub stage_drop: Pressure,
    /// Set when the average flow falls outside the calibrated envelope.
    pub outside_envelope: bool,
}

/// Estimates the feed-to-reject pressure drop of a stage.
///
/// # Errors
///
/// Returns an error if the table has no entry for the layout's geometry.
pub fn stage_pressure_drop(
    stage: usize,
    flows: &StageFlows,
    layout: &StageLayout,
    table: &PressureDropTable,
) -> Result<HydraulicResult, InputError> {
    let entry = table.entry(layout.diameter(), layout.spacer())?;

    let average = (flows.feed() + flows.concentrate()) / 2.0 / layout.vessels() as f64;
    let q = average.get::<cubic_meter_per_hour>();

    let outside_envelope = !entry.contains(q);
    if outside_envelope {
        log::warn!(
            "stage {stage}: average vessel flow {q:.2} m³/h is outside the {} {} \
             envelope [{}, {}] m³/h",
            layout.diameter().label(),
            layout.spacer().label(),
            entry.min_vessel_flow_m3h,
            entry.max_vessel_flow_m3h,
        );
    }

    let element_drop = entry.element_drop_bar(q);
    let elements_per_vessel = layout.elements_per_vessel();
    let stage_drop = element_drop * elements_per_vessel;
    if !stage_drop.is_finite() {
        return Err(InputError::NonPhysicalResult {
            quantity: "stage pressure drop",
            value: stage_drop,
        });
    }

    Ok(HydraulicResult {
        average_vessel_flow: average,
        element_drop: Pressure::new::<bar>(element_drop),
        elements_per_vessel,
        stage_drop: Pressure::new::<bar>(stage_drop),
        outside_envelope,
    })
}
