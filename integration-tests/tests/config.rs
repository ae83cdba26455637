use brine_components::{
    ConfigError, HybridSimulator, IonComposition, SimulationError,
    correlations::Correlations,
    osmotic::OsmoticModel,
    recycle::RecycleSettings,
};
use integration_tests::plants::{self, PlantSpec};
use uom::si::{pressure::bar, thermodynamic_temperature::degree_celsius};

#[test]
fn simulator_round_trips_through_toml() {
    let mut simulator = HybridSimulator::new();
    simulator.recycle.max_iterations = 35;
    simulator.correlations.osmotic = OsmoticModel::VantHoff {
        osmotic_coefficient: 0.93,
    };

    let text = toml::to_string(&simulator).unwrap();
    let parsed: HybridSimulator = toml::from_str(&text).unwrap();

    assert_eq!(parsed, simulator);
}

#[test]
fn partial_toml_keeps_defaults() {
    let parsed: HybridSimulator = toml::from_str(
        r#"
        [recycle]
        max_iterations = 40
        relaxation = 0.8

        [correlations.osmotic]
        model = "vant_hoff"
        osmotic_coefficient = 0.93
        "#,
    )
    .unwrap();

    assert_eq!(parsed.recycle.max_iterations, 40);
    assert_eq!(parsed.recycle.relaxation, 0.8);
    assert_eq!(
        parsed.recycle.relative_tolerance,
        RecycleSettings::default().relative_tolerance
    );
    assert_eq!(
        parsed.correlations.osmotic,
        OsmoticModel::VantHoff {
            osmotic_coefficient: 0.93
        }
    );
    assert_eq!(
        parsed.correlations.pressure_drop,
        Correlations::default().pressure_drop
    );
    assert_eq!(parsed.conditions, HybridSimulator::default().conditions);
    assert!((parsed.conditions.temperature.get::<degree_celsius>() - 25.0).abs() < 1e-9);
}

#[test]
fn correlations_round_trip_through_json() {
    let correlations = Correlations::default();
    let text = serde_json::to_string_pretty(&correlations).unwrap();
    let parsed: Correlations = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, correlations);
}

#[test]
fn invalid_settings_load_but_fail_preflight() {
    let simulator: HybridSimulator = toml::from_str(
        r#"
        [recycle]
        relaxation = 1.5
        "#,
    )
    .unwrap();

    let result = simulator.simulate_with_catalog(
        &plants::single_stage(),
        &plants::brackish_2700(),
        &plants::catalog(),
    );
    assert!(matches!(
        result,
        Err(SimulationError::InvalidConfiguration(
            ConfigError::InvalidRecycleSettings { .. }
        ))
    ));
}

#[test]
fn plant_description_loads_from_toml() {
    let plant: PlantSpec = toml::from_str(
        r#"
        fresh_feed_m3h = 100.0
        recycle_split = 0.5

        [[stages]]
        recovery = 0.5
        vessels = 12
        elements_per_vessel = 6
        flux_lmh = 18.0

        [[stages]]
        recovery = 0.5
        vessels = 6
        elements_per_vessel = 6
        flux_lmh = 16.0
        "#,
    )
    .unwrap();

    assert_eq!(plant.configuration().unwrap(), plants::two_stage_recycle());

    let round_trip: PlantSpec = toml::from_str(&toml::to_string(&plant).unwrap()).unwrap();
    assert_eq!(round_trip, plant);
}

#[test]
fn out_of_range_recovery_is_rejected() {
    let plant: PlantSpec = toml::from_str(
        r#"
        fresh_feed_m3h = 50.0

        [[stages]]
        recovery = 1.0
        vessels = 4
        elements_per_vessel = 6
        flux_lmh = 18.0
        "#,
    )
    .unwrap();

    assert_eq!(plant.recycle_split, 0.0);
    assert!(matches!(
        plant.configuration(),
        Err(SimulationError::InvalidConfiguration(
            ConfigError::RecoveryOutOfRange { .. }
        ))
    ));
}

#[test]
fn feed_composition_loads_from_json() {
    let feed: IonComposition =
        serde_json::from_str(r#"{"Na": 800.0, "Cl": 1200.0, "Ca": 150.0}"#).unwrap();
    assert_eq!(feed.tds(), 2150.0);
    assert_eq!(feed.ions().collect::<Vec<_>>(), ["Ca", "Cl", "Na"]);

    let nan: Result<IonComposition, _> = toml::from_str("Na = nan");
    assert!(nan.is_err());
}

#[test]
fn system_result_serializes_to_json() {
    let result = HybridSimulator::new()
        .simulate_with_catalog(
            &plants::single_stage(),
            &plants::brackish_2700(),
            &plants::catalog(),
        )
        .unwrap();

    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["stages"].as_array().map(Vec::len), Some(1));
    assert!(value["recycle"].is_null());
    assert_eq!(value["overall_recovery"].as_f64(), Some(result.overall_recovery));
    assert!(value["permeate"]["Na"].as_f64().is_some_and(|c| c > 0.0));

    // Quantities serialize in SI base units.
    let total_pa = value["stages"][0]["pressure"]["total"].as_f64().unwrap();
    assert!((total_pa / 1e5 - result.stages[0].pressure.total.get::<bar>()).abs() < 1e-9);
    assert_eq!(
        value["stages"][0]["pump"]["tier"],
        serde_json::to_value(result.stages[0].pump.tier).unwrap()
    );
}
