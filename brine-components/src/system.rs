//! System configuration, the hybrid simulator, and result aggregation.

mod config;
mod result;

pub use config::{RecycleConfig, StageDesign, SystemConfiguration};
pub use result::SystemResult;

use brine_core::model::Model;
use serde::{Deserialize, Serialize};
use uom::si::{power::kilowatt, volume_rate::cubic_meter_per_hour};

use crate::{
    ConfigError, IonComposition, SimulationError,
    conditions::OperatingConditions,
    correlations::Correlations,
    membrane::{MembraneCatalog, MembraneProperties},
    recycle::{self, RecycleOutcome, RecycleSettings, RecycleStreams},
    stage::StageContext,
    train::{Train, validate_chain},
};

/// Closed-form multi-stage RO simulator.
///
/// Every stage is sized from its reject-side osmotic pressure and its quality
/// from a log-mean driving force. When the configuration recycles part of
/// the final concentrate, the feed composition is resolved by fixed-point
/// iteration.
///
/// The simulator holds only calibration data. It keeps no state between
/// calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridSimulator {
    pub correlations: Correlations,
    pub conditions: OperatingConditions,
    pub recycle: RecycleSettings,
}

impl HybridSimulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks everything that can be checked without running a stage.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid calibration data, operating conditions,
    /// stage chain, or a disposal flow below the configured minimum.
    pub fn preflight(&self, configuration: &SystemConfiguration) -> Result<(), SimulationError> {
        self.correlations.validate()?;
        self.recycle.validate()?;
        self.conditions.validate()?;
        validate_chain(configuration.stages())?;

        let disposal = configuration.disposal_flow().get::<cubic_meter_per_hour>();
        if disposal < self.recycle.min_disposal_flow_m3h {
            return Err(ConfigError::DisposalFlowTooLow {
                disposal_m3h: disposal,
                minimum_m3h: self.recycle.min_disposal_flow_m3h,
            }
            .into());
        }

        Ok(())
    }

    /// Simulates `configuration` on `feed` with the given membrane.
    ///
    /// # Errors
    ///
    /// Returns an error if preflight fails or any stage cannot be evaluated.
    /// A recycle loop that runs out of iterations is not an error; check
    /// [`SystemResult::converged`].
    pub fn simulate(
        &self,
        configuration: &SystemConfiguration,
        feed: &IonComposition,
        membrane: &MembraneProperties,
    ) -> Result<SystemResult, SimulationError> {
        self.preflight(configuration)?;

        let context = StageContext {
            membrane,
            correlations: &self.correlations,
            conditions: &self.conditions,
        };
        let train = Train::new(configuration.stages(), context)?;

        let (blended_feed, train_result, convergence) = match configuration.active_recycle() {
            Some(recycle) => {
                let streams = RecycleStreams {
                    fresh: feed,
                    fresh_flow: recycle.fresh_feed(),
                    recycle_flow: recycle.recycle_flow(),
                };
                let RecycleOutcome {
                    train,
                    blended_feed,
                    convergence,
                } = recycle::converge(&train, streams, &self.recycle)?;
                (blended_feed, train, Some(convergence))
            }
            None => (feed.clone(), train.run(feed)?, None),
        };

        let result =
            SystemResult::aggregate(configuration, feed, blended_feed, train_result, convergence)?;

        log::info!(
            "simulated {} stage(s): recovery {:.3}, permeate {:.1} mg/L, {:.1} kW, {:.3} kWh/m³",
            result.stages.len(),
            result.overall_recovery,
            result.permeate.tds(),
            result.total_pump_power.get::<kilowatt>(),
            result.specific_energy_kwh_per_m3,
        );

        Ok(result)
    }

    /// Like [`simulate`](Self::simulate), looking the membrane up by the
    /// configuration's membrane identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownMembrane`] if the catalog lacks the
    /// membrane, or any error from [`simulate`](Self::simulate).
    pub fn simulate_with_catalog(
        &self,
        configuration: &SystemConfiguration,
        feed: &IonComposition,
        catalog: &impl MembraneCatalog,
    ) -> Result<SystemResult, SimulationError> {
        let membrane = catalog.require(configuration.membrane_id())?;
        self.simulate(configuration, feed, membrane)
    }
}

/// Everything a simulation backend needs for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub configuration: SystemConfiguration,
    pub feed: IonComposition,
    pub membrane: MembraneProperties,
}

impl Model for HybridSimulator {
    type Input = SimulationRequest;
    type Output = SystemResult;
    type Error = SimulationError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        self.simulate(&input.configuration, &input.feed, &input.membrane)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use approx::assert_relative_eq;
    use uom::si::f64::VolumeRate;

    use crate::{
        membrane::{RejectionTable, WaterPermeability},
        stage::{
            StageLayout,
            hydraulics::{ElementDiameter, SpacerThickness},
        },
        units::flux_from_lmh,
    };

    fn m3h(value: f64) -> VolumeRate {
        VolumeRate::new::<cubic_meter_per_hour>(value)
    }

    fn membrane() -> MembraneProperties {
        MembraneProperties::new(
            WaterPermeability::from_lmh_per_bar(3.0).unwrap(),
            RejectionTable::default(),
        )
    }

    fn feed() -> IonComposition {
        IonComposition::new([("Na", 600.0), ("Cl", 900.0), ("Mg", 40.0)]).unwrap()
    }

    fn design(recovery: f64, vessels: usize) -> StageDesign {
        StageDesign {
            recovery,
            layout: StageLayout::new(
                vessels,
                vessels * 6,
                ElementDiameter::EightInch,
                SpacerThickness::Mil34,
            )
            .unwrap(),
            target_flux: flux_from_lmh(18.0),
        }
    }

    #[test]
    fn single_pass_rollup() {
        let config = SystemConfiguration::design("bw", m3h(100.0), &[design(0.5, 12)], 0.0).unwrap();

        let result = HybridSimulator::new()
            .simulate(&config, &feed(), &membrane())
            .unwrap();

        assert!(result.recycle.is_none());
        assert!(result.converged());
        assert_relative_eq!(result.overall_recovery, 0.5, epsilon = 1e-12);
        assert_relative_eq!(result.permeate_flow.get::<cubic_meter_per_hour>(), 50.0);
        assert_eq!(result.permeate, result.stages[0].permeate);
        assert_eq!(result.blended_feed, feed());
        assert_relative_eq!(
            result.specific_energy_kwh_per_m3,
            result.total_pump_power.get::<kilowatt>() / 50.0
        );
        assert!(result.salt_rejection().unwrap() > 0.95);
    }

    #[test]
    fn recycle_recovery_is_measured_against_fresh_feed() {
        let config =
            SystemConfiguration::design("bw", m3h(100.0), &[design(0.5, 12), design(0.5, 6)], 0.5)
                .unwrap();

        let result = HybridSimulator::new()
            .simulate(&config, &feed(), &membrane())
            .unwrap();

        // Permeate is 0.75 of the stage-1 feed; disposal carries the rest.
        assert!(result.converged());
        assert_relative_eq!(result.overall_recovery, 0.75 / 0.875, epsilon = 1e-9);
        assert_relative_eq!(
            result.permeate_flow.get::<cubic_meter_per_hour>()
                + result.disposal_flow.get::<cubic_meter_per_hour>(),
            100.0,
            epsilon = 1e-9
        );
        assert!(result.blended_feed.tds() > feed().tds());
    }

    #[test]
    fn small_disposal_fails_before_any_stage_runs() {
        let config = SystemConfiguration::design("bw", m3h(1.0), &[design(0.5, 1)], 0.9).unwrap();
        let mut simulator = HybridSimulator::new();
        // An unusable correlation would fail at the first stage; preflight must win.
        simulator.correlations.pressure_drop.entries.clear();

        assert!(matches!(
            simulator.simulate(&config, &feed(), &membrane()),
            Err(SimulationError::InvalidConfiguration(
                ConfigError::DisposalFlowTooLow { .. }
            ))
        ));
    }

    #[test]
    fn catalog_lookup_and_model_seam_agree() {
        let config = SystemConfiguration::design("bw", m3h(100.0), &[design(0.5, 12)], 0.0).unwrap();
        let mut catalog = BTreeMap::new();
        catalog.insert("bw".to_string(), membrane());
        let simulator = HybridSimulator::new();

        let via_catalog = simulator
            .simulate_with_catalog(&config, &feed(), &catalog)
            .unwrap();
        let via_model = simulator
            .call(&SimulationRequest {
                configuration: config.clone(),
                feed: feed(),
                membrane: membrane(),
            })
            .unwrap();
        assert_eq!(via_catalog, via_model);

        let other = SystemConfiguration::design("sw", m3h(100.0), &[design(0.5, 12)], 0.0).unwrap();
        assert!(matches!(
            simulator.simulate_with_catalog(&other, &feed(), &catalog),
            Err(SimulationError::UnknownMembrane { .. })
        ));
    }
}
