use serde::Serialize;
use uom::si::volume_rate::cubic_meter_per_hour;

use crate::{IonComposition, pump::PumpResult};

use super::{StageFlows, hydraulics::HydraulicResult, pressure::PressureBreakdown};

/// Everything computed for one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageResult {
    /// 1-based stage index.
    pub index: usize,
    pub flows: StageFlows,
    pub feed: IonComposition,
    pub permeate: IonComposition,
    pub reject: IonComposition,
    pub pressure: PressureBreakdown,
    pub hydraulics: HydraulicResult,
    pub pump: PumpResult,
    /// Ions whose rejection came from the fallback coefficient.
    pub fallback_ions: Vec<String>,
}

impl StageResult {
    /// Per-ion mass imbalance `|Q_f·c_f − Q_p·c_p − Q_r·c_r|`, relative to
    /// the feed mass flow, maximized over ions.
    #[must_use]
    pub fn max_mass_imbalance(&self) -> f64 {
        let f = self.flows.feed().get::<cubic_meter_per_hour>();
        let p = self.flows.permeate().get::<cubic_meter_per_hour>();
        let r = self.flows.concentrate().get::<cubic_meter_per_hour>();

        self.feed
            .iter()
            .map(|(ion, c_feed)| {
                let inflow = f * c_feed;
                let outflow = p * self.permeate.get(ion) + r * self.reject.get(ion);
                if inflow > 0.0 {
                    (inflow - outflow).abs() / inflow
                } else {
                    outflow.abs()
                }
            })
            .fold(0.0, f64::max)
    }
}
