//! Feed pressure sizing.
//!
//! The membrane has to overcome the highest osmotic pressure in the stage,
//! which sits at the reject end. Sizing therefore uses reject-side osmotic
//! pressure, computed from the concentration-factor estimate because the
//! refined reject is not known until quality has been solved.

use serde::Serialize;
use uom::si::f64::Pressure;

use crate::{
    InputError, IonComposition,
    osmotic::required_net_driving_pressure,
};

use super::{
    StageConfig, StageContext,
    hydraulics::{HydraulicResult, stage_pressure_drop},
    quality::estimate_reject,
};

/// Additive components of a stage's required feed pressure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PressureBreakdown {
    /// Reject-side osmotic pressure.
    pub osmotic: Pressure,
    pub net_driving: Pressure,
    /// Feed-to-reject hydraulic drop.
    pub pressure_drop: Pressure,
    /// Permeate-side pressure.
    pub back_pressure: Pressure,
    pub total: Pressure,
}

impl PressureBreakdown {
    fn new(
        osmotic: Pressure,
        net_driving: Pressure,
        pressure_drop: Pressure,
        back_pressure: Pressure,
    ) -> Self {
        Self {
            osmotic,
            net_driving,
            pressure_drop,
            back_pressure,
            total: osmotic + net_driving + pressure_drop + back_pressure,
        }
    }

    /// Pressure the membrane itself needs at the reject end, leaving out the
    /// feed-channel drop.
    ///
    /// At a fixed feed flow this always rises with recovery. The total may
    /// not: a higher recovery also lowers the concentrate flow, and at low
    /// salinity and high flow the smaller drop can outweigh the osmotic rise.
    #[must_use]
    pub fn membrane_demand(&self) -> Pressure {
        self.osmotic + self.net_driving + self.back_pressure
    }
}

/// Result of sizing one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Sizing {
    pub breakdown: PressureBreakdown,
    pub hydraulics: HydraulicResult,
    /// Reject composition assumed for the osmotic term.
    pub reject_estimate: IonComposition,
}

/// Computes the feed pressure a stage needs to reach its target flux.
///
/// # Errors
///
/// Returns an error if a correlation cannot be evaluated for these inputs.
pub fn size_stage(
    stage: &StageConfig,
    feed: &IonComposition,
    context: &StageContext<'_>,
) -> Result<Sizing, InputError> {
    let StageContext {
        membrane,
        correlations,
        conditions,
    } = *context;

    let reject_estimate = estimate_reject(feed, stage.recovery())?;
    let osmotic = correlations
        .osmotic
        .osmotic_pressure(&reject_estimate, conditions.temperature)?;

    let net_driving = required_net_driving_pressure(
        stage.target_flux(),
        membrane.permeability,
        conditions.temperature,
        &correlations.temperature_correction,
    )?;

    let hydraulics = stage_pressure_drop(
        stage.index(),
        stage.flows(),
        stage.layout(),
        &correlations.pressure_drop,
    )?;

    Ok(Sizing {
        breakdown: PressureBreakdown::new(
            osmotic,
            net_driving,
            hydraulics.stage_drop,
            conditions.permeate_pressure,
        ),
        hydraulics,
        reject_estimate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{
        f64::VolumeRate, pressure::bar, thermodynamic_temperature::kelvin,
        volume_rate::cubic_meter_per_hour,
    };

    use crate::{
        conditions::OperatingConditions,
        correlations::Correlations,
        membrane::{MembraneProperties, RejectionTable, WaterPermeability},
        stage::{
            Recovery, StageFlows, StageLayout,
            hydraulics::{ElementDiameter, SpacerThickness},
        },
        units::flux_from_lmh,
    };

    fn stage(recovery: f64) -> StageConfig {
        let flows = StageFlows::from_recovery(
            VolumeRate::new::<cubic_meter_per_hour>(150.0),
            Recovery::new(recovery).unwrap(),
        )
        .unwrap();
        let layout =
            StageLayout::new(20, 120, ElementDiameter::EightInch, SpacerThickness::Mil34).unwrap();
        StageConfig::new(1, flows, layout, flux_from_lmh(20.0)).unwrap()
    }

    fn membrane() -> MembraneProperties {
        MembraneProperties::new(
            WaterPermeability::from_lmh_per_bar(3.0).unwrap(),
            RejectionTable::default(),
        )
    }

    fn feed() -> IonComposition {
        IonComposition::new([("Na", 1000.0), ("Cl", 1500.0), ("SO4", 500.0)]).unwrap()
    }

    #[test]
    fn breakdown_adds_up() {
        let membrane = membrane();
        let correlations = Correlations::default();
        let conditions = OperatingConditions {
            temperature: uom::si::f64::ThermodynamicTemperature::new::<kelvin>(298.15),
            ..OperatingConditions::default()
        };
        let context = StageContext {
            membrane: &membrane,
            correlations: &correlations,
            conditions: &conditions,
        };

        let sizing = size_stage(&stage(0.5), &feed(), &context).unwrap();
        let b = sizing.breakdown;

        // Reject estimate is 6 g/L at the empirical reference temperature.
        assert_relative_eq!(b.osmotic.get::<bar>(), 0.76 * 6.0, epsilon = 1e-9);
        assert_relative_eq!(b.back_pressure.get::<bar>(), 1.01325, epsilon = 1e-12);
        assert_relative_eq!(
            b.total.get::<bar>(),
            (b.osmotic + b.net_driving + b.pressure_drop + b.back_pressure).get::<bar>(),
            epsilon = 1e-12
        );
        assert!(b.total > b.osmotic + b.back_pressure);
        assert_relative_eq!(sizing.reject_estimate.tds(), 6000.0, epsilon = 1e-9);
    }

    fn context_parts() -> (MembraneProperties, Correlations, OperatingConditions) {
        (membrane(), Correlations::default(), OperatingConditions::default())
    }

    /// One vessel of six 8" elements at 18 LMH.
    fn vessel(feed_m3h: f64, recovery: f64) -> StageConfig {
        let flows = StageFlows::from_recovery(
            VolumeRate::new::<cubic_meter_per_hour>(feed_m3h),
            Recovery::new(recovery).unwrap(),
        )
        .unwrap();
        let layout =
            StageLayout::new(1, 6, ElementDiameter::EightInch, SpacerThickness::Mil34).unwrap();
        StageConfig::new(1, flows, layout, flux_from_lmh(18.0)).unwrap()
    }

    #[test]
    fn higher_recovery_needs_more_pressure() {
        let (membrane, correlations, conditions) = context_parts();
        let context = StageContext {
            membrane: &membrane,
            correlations: &correlations,
            conditions: &conditions,
        };

        let low = size_stage(&stage(0.4), &feed(), &context).unwrap();
        let high = size_stage(&stage(0.6), &feed(), &context).unwrap();

        assert!(high.breakdown.total > low.breakdown.total);
        assert!(high.breakdown.membrane_demand() > low.breakdown.membrane_demand());
    }

    #[test]
    fn dilute_high_flow_feed_can_need_less_total_pressure_at_higher_recovery() {
        let (membrane, correlations, conditions) = context_parts();
        let context = StageContext {
            membrane: &membrane,
            correlations: &correlations,
            conditions: &conditions,
        };
        let dilute = IonComposition::new([("Na", 200.0), ("Cl", 300.0)]).unwrap();

        let low = size_stage(&vessel(16.0, 0.20), &dilute, &context)
            .unwrap()
            .breakdown;
        let high = size_stage(&vessel(16.0, 0.21), &dilute, &context)
            .unwrap()
            .breakdown;

        // The drop falls by about 0.021 bar, the osmotic term rises by 0.006.
        assert!(high.osmotic > low.osmotic);
        assert!(high.pressure_drop < low.pressure_drop);
        assert!(high.membrane_demand() > low.membrane_demand());
        assert!(high.total < low.total);
        assert_relative_eq!(
            (high.total - low.total).get::<bar>(),
            (high.osmotic - low.osmotic + high.pressure_drop - low.pressure_drop).get::<bar>(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn total_rises_with_recovery_at_fixed_concentrate_flow() {
        let (membrane, correlations, conditions) = context_parts();
        let context = StageContext {
            membrane: &membrane,
            correlations: &correlations,
            conditions: &conditions,
        };
        let dilute = IonComposition::new([("Na", 200.0), ("Cl", 300.0)]).unwrap();
        let concentrate = 12.8;

        let low = size_stage(&vessel(concentrate / 0.80, 0.20), &dilute, &context)
            .unwrap()
            .breakdown;
        let high = size_stage(&vessel(concentrate / 0.79, 0.21), &dilute, &context)
            .unwrap()
            .breakdown;

        assert!(high.pressure_drop > low.pressure_drop);
        assert!(high.total > low.total);
    }
}
