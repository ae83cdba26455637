use serde::Serialize;
use uom::si::{
    f64::{Power, VolumeRate},
    power::kilowatt,
    volume_rate::cubic_meter_per_hour,
};

use crate::{
    IonComposition, SimulationError,
    recycle::{ConvergenceWarning, RecycleConvergence},
    stage::StageResult,
    train::TrainResult,
};

use super::SystemConfiguration;

/// System-level performance of one simulation.
///
/// This is the whole contract with downstream consumers such as cost
/// models, and it is the same whichever backend produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemResult {
    pub stages: Vec<StageResult>,
    /// Fresh feed supplied to the system.
    pub feed: IonComposition,
    /// Feed entering the first stage, including any recycle.
    pub blended_feed: IonComposition,
    /// Flow-weighted mix of every stage's permeate.
    pub permeate: IonComposition,
    pub permeate_flow: VolumeRate,
    /// Fresh feed when recycling, otherwise the first stage feed.
    pub reference_feed_flow: VolumeRate,
    pub overall_recovery: f64,
    pub final_reject: IonComposition,
    pub final_reject_flow: VolumeRate,
    pub recycle_flow: VolumeRate,
    pub disposal_flow: VolumeRate,
    pub total_pump_power: Power,
    pub specific_energy_kwh_per_m3: f64,
    /// Present when a recycle loop ran.
    pub recycle: Option<RecycleConvergence>,
}

impl SystemResult {
    /// Rolls a train result up to system totals.
    pub(crate) fn aggregate(
        configuration: &SystemConfiguration,
        feed: &IonComposition,
        blended_feed: IonComposition,
        train: TrainResult,
        recycle: Option<RecycleConvergence>,
    ) -> Result<Self, SimulationError> {
        let TrainResult {
            stages,
            total_pump_power,
        } = train;

        let streams: Vec<_> = stages
            .iter()
            .map(|s| (&s.permeate, s.flows.permeate()))
            .collect();
        let permeate = IonComposition::blend(&streams)?;

        let permeate_flow = stages
            .iter()
            .fold(VolumeRate::new::<cubic_meter_per_hour>(0.0), |total, s| {
                total + s.flows.permeate()
            });

        let final_reject = stages
            .last()
            .map(|s| s.reject.clone())
            .unwrap_or_default();

        let reference_feed_flow = configuration.reference_feed_flow();
        let recycle_flow = configuration
            .active_recycle()
            .map_or(VolumeRate::new::<cubic_meter_per_hour>(0.0), |r| {
                r.recycle_flow()
            });

        let specific_energy_kwh_per_m3 =
            total_pump_power.get::<kilowatt>() / permeate_flow.get::<cubic_meter_per_hour>();

        Ok(Self {
            stages,
            feed: feed.clone(),
            blended_feed,
            permeate,
            permeate_flow,
            reference_feed_flow,
            overall_recovery: permeate_flow.get::<cubic_meter_per_hour>()
                / reference_feed_flow.get::<cubic_meter_per_hour>(),
            final_reject,
            final_reject_flow: configuration.final_concentrate(),
            recycle_flow,
            disposal_flow: configuration.disposal_flow(),
            total_pump_power,
            specific_energy_kwh_per_m3,
            recycle,
        })
    }

    /// Fraction of fresh-feed TDS kept out of the permeate.
    ///
    /// Returns `None` for a feed with no dissolved solids.
    #[must_use]
    pub fn salt_rejection(&self) -> Option<f64> {
        let feed = self.feed.tds();
        (feed > 0.0).then(|| 1.0 - self.permeate.tds() / feed)
    }

    /// `false` only if a recycle loop ran out of iterations.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.recycle.is_none_or(|r| r.converged)
    }

    #[must_use]
    pub fn convergence_warning(&self) -> Option<ConvergenceWarning> {
        self.recycle.and_then(|r| r.warning())
    }
}
