//! Shared fixtures for the integration tests.

pub mod plants {
    use std::collections::BTreeMap;

    use brine_components::{
        IonComposition, SimulationError, SystemConfiguration,
        membrane::{MembraneProperties, RejectionTable, WaterPermeability},
        stage::{
            StageLayout,
            hydraulics::{ElementDiameter, SpacerThickness},
        },
        system::StageDesign,
        units::flux_from_lmh,
    };
    use serde::{Deserialize, Serialize};
    use uom::si::{f64::VolumeRate, volume_rate::cubic_meter_per_hour};

    pub const MEMBRANE_ID: &str = "bw-440";

    /// Brackish feed at 2700 mg/L TDS.
    pub fn brackish_2700() -> IonComposition {
        IonComposition::new([
            ("Na", 800.0),
            ("Cl", 1200.0),
            ("Ca", 150.0),
            ("Mg", 50.0),
            ("SO4", 300.0),
            ("HCO3", 200.0),
        ])
        .expect("fixture concentrations are valid")
    }

    /// Brackish feed at 2000 mg/L TDS.
    pub fn brackish_2000() -> IonComposition {
        IonComposition::new([
            ("Na", 600.0),
            ("Cl", 900.0),
            ("Ca", 100.0),
            ("Mg", 40.0),
            ("SO4", 210.0),
            ("HCO3", 150.0),
        ])
        .expect("fixture concentrations are valid")
    }

    /// A brackish-water membrane at 3 LMH/bar with literature rejections.
    pub fn membrane() -> MembraneProperties {
        MembraneProperties::new(
            WaterPermeability::from_lmh_per_bar(3.0).expect("fixture permeability is valid"),
            RejectionTable::default(),
        )
    }

    pub fn catalog() -> BTreeMap<String, MembraneProperties> {
        BTreeMap::from([(MEMBRANE_ID.to_string(), membrane())])
    }

    pub fn eight_inch(vessels: usize, elements_per_vessel: usize) -> StageLayout {
        StageLayout::new(
            vessels,
            vessels * elements_per_vessel,
            ElementDiameter::EightInch,
            SpacerThickness::Mil34,
        )
        .expect("fixture layout is valid")
    }

    pub fn m3h(value: f64) -> VolumeRate {
        VolumeRate::new::<cubic_meter_per_hour>(value)
    }

    /// 150 m³/h through one stage at 50% recovery.
    pub fn single_stage() -> SystemConfiguration {
        PlantSpec {
            fresh_feed_m3h: 150.0,
            recycle_split: 0.0,
            stages: vec![StageSpec::new(0.5, 20, 6, 20.0)],
        }
        .configuration()
        .expect("fixture plant is valid")
    }

    /// 100 m³/h fresh feed, two stages at 50%, half the final reject recycled.
    pub fn two_stage_recycle() -> SystemConfiguration {
        PlantSpec {
            fresh_feed_m3h: 100.0,
            recycle_split: 0.5,
            stages: vec![StageSpec::new(0.5, 12, 6, 18.0), StageSpec::new(0.5, 6, 6, 16.0)],
        }
        .configuration()
        .expect("fixture plant is valid")
    }

    /// A plant described as plain data, the way an outer layer would load it.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PlantSpec {
        pub fresh_feed_m3h: f64,
        #[serde(default)]
        pub recycle_split: f64,
        pub stages: Vec<StageSpec>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct StageSpec {
        pub recovery: f64,
        pub vessels: usize,
        pub elements_per_vessel: usize,
        pub flux_lmh: f64,
    }

    impl StageSpec {
        pub fn new(recovery: f64, vessels: usize, elements_per_vessel: usize, flux_lmh: f64) -> Self {
            Self {
                recovery,
                vessels,
                elements_per_vessel,
                flux_lmh,
            }
        }
    }

    impl PlantSpec {
        /// Builds a validated configuration from the plain description.
        pub fn configuration(&self) -> Result<SystemConfiguration, SimulationError> {
            let designs = self
                .stages
                .iter()
                .map(|s| -> Result<StageDesign, SimulationError> {
                    Ok(StageDesign {
                        recovery: s.recovery,
                        layout: StageLayout::new(
                            s.vessels,
                            s.vessels * s.elements_per_vessel,
                            ElementDiameter::EightInch,
                            SpacerThickness::Mil34,
                        )?,
                        target_flux: flux_from_lmh(s.flux_lmh),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(SystemConfiguration::design(
                MEMBRANE_ID,
                m3h(self.fresh_feed_m3h),
                &designs,
                self.recycle_split,
            )?)
        }
    }
}
