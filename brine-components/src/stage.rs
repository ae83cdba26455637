//! Single-stage models.
//!
//! A stage is sized first, from an estimated reject, and only then is its
//! quality refined. [`simulate_stage`] runs both steps and the stage pump.

mod config;
pub mod hydraulics;
pub mod pressure;
pub mod quality;
mod result;

pub use config::{Recovery, StageConfig, StageFlows, StageLayout};
pub use result::StageResult;

pub(crate) use config::FLOW_BALANCE_TOLERANCE;

use uom::si::{f64::Pressure, pressure::bar};

use crate::{
    InputError, IonComposition, conditions::OperatingConditions, correlations::Correlations,
    membrane::MembraneProperties, pump::pump,
};

/// Shared, read-only inputs every stage needs.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub membrane: &'a MembraneProperties,
    pub correlations: &'a Correlations,
    pub conditions: &'a OperatingConditions,
}

/// Sizes a stage, computes its quality, and sizes its pump.
///
/// `suction` is the pressure the stage's feed arrives at.
///
/// # Errors
///
/// Returns an error if a correlation cannot be evaluated for these inputs.
pub fn simulate_stage(
    stage: &StageConfig,
    feed: &IonComposition,
    suction: Pressure,
    context: &StageContext<'_>,
) -> Result<StageResult, InputError> {
    let sizing = pressure::size_stage(stage, feed, context)?;
    let quality = quality::stage_quality(feed, stage.recovery(), &context.membrane.rejection)?;
    let pump = pump(
        stage.flows().feed(),
        suction,
        sizing.breakdown.total,
        &context.correlations.pump_efficiency,
    );

    log::debug!(
        "stage {}: feed {:.1} mg/L at {:.2} bar, permeate {:.1} mg/L, reject {:.1} mg/L",
        stage.index(),
        feed.tds(),
        sizing.breakdown.total.get::<bar>(),
        quality.permeate.tds(),
        quality.reject.tds(),
    );

    Ok(StageResult {
        index: stage.index(),
        flows: *stage.flows(),
        feed: feed.clone(),
        permeate: quality.permeate,
        reject: quality.reject,
        pressure: sizing.breakdown,
        hydraulics: sizing.hydraulics,
        pump,
        fallback_ions: quality.fallback_ions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{f64::VolumeRate, power::kilowatt, volume_rate::cubic_meter_per_hour};

    use crate::{
        membrane::{RejectionTable, WaterPermeability},
        stage::hydraulics::{ElementDiameter, SpacerThickness},
        units::flux_from_lmh,
    };

    #[test]
    fn stage_closes_mass_balance_and_pays_for_pressure() {
        let membrane = MembraneProperties::new(
            WaterPermeability::from_lmh_per_bar(3.0).unwrap(),
            RejectionTable::default(),
        );
        let correlations = Correlations::default();
        let conditions = OperatingConditions::default();
        let context = StageContext {
            membrane: &membrane,
            correlations: &correlations,
            conditions: &conditions,
        };

        let flows = StageFlows::from_recovery(
            VolumeRate::new::<cubic_meter_per_hour>(100.0),
            Recovery::new(0.5).unwrap(),
        )
        .unwrap();
        let layout =
            StageLayout::new(12, 72, ElementDiameter::EightInch, SpacerThickness::Mil31).unwrap();
        let stage = StageConfig::new(1, flows, layout, flux_from_lmh(18.0)).unwrap();
        let feed = IonComposition::new([("Na", 700.0), ("Cl", 1100.0), ("Mg", 60.0)]).unwrap();

        let result = simulate_stage(&stage, &feed, conditions.feed_supply_pressure, &context)
            .unwrap();

        assert!(result.max_mass_imbalance() < 1e-9);
        assert!(result.pump.is_running());
        assert_relative_eq!(
            result.pump.discharge.get::<bar>(),
            result.pressure.total.get::<bar>()
        );
        assert!(result.pump.power.get::<kilowatt>() > 0.0);
        assert_eq!(result.feed, feed);
    }
}
