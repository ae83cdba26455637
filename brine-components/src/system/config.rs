use brine_core::constraint::{Constrained, ConstraintError, UnitIntervalRightOpen};
use serde::Serialize;
use uom::si::{
    f64::{Velocity, VolumeRate},
    volume_rate::cubic_meter_per_hour,
};

use crate::{
    ConfigError,
    stage::{FLOW_BALANCE_TOLERANCE, Recovery, StageConfig, StageFlows, StageLayout},
    train::validate_chain,
};

/// Recycle of part of the final concentrate back to the first stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecycleConfig {
    #[serde(serialize_with = "serialize_split")]
    split: Constrained<f64, UnitIntervalRightOpen>,
    fresh_feed: VolumeRate,
    recycle_flow: VolumeRate,
    disposal_flow: VolumeRate,
}

fn serialize_split<S: serde::Serializer>(
    split: &Constrained<f64, UnitIntervalRightOpen>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(split.get())
}

impl RecycleConfig {
    /// Splits `final_reject` into recycle and disposal.
    ///
    /// # Errors
    ///
    /// Returns an error if `split` is negative, not below 1, or the fresh
    /// feed is not strictly positive.
    pub fn new(
        split: f64,
        fresh_feed: VolumeRate,
        final_reject: VolumeRate,
    ) -> Result<Self, ConfigError> {
        let split = UnitIntervalRightOpen::new(split).map_err(|err| match err {
            ConstraintError::BelowMinimum => ConfigError::NegativeRecycleFlow {
                value_m3h: split * final_reject.get::<cubic_meter_per_hour>(),
            },
            _ => ConfigError::SplitRatioOutOfRange { value: split },
        })?;

        let fresh = fresh_feed.get::<cubic_meter_per_hour>();
        if !fresh.is_finite() || fresh <= 0.0 {
            return Err(ConfigError::NonPositiveFlow {
                stream: "fresh feed",
                value_m3h: fresh,
            });
        }

        let recycle_flow = final_reject * split.get();
        Ok(Self {
            split,
            fresh_feed,
            recycle_flow,
            disposal_flow: final_reject - recycle_flow,
        })
    }

    /// Fraction of the final reject sent back to the feed.
    #[must_use]
    pub fn split(&self) -> f64 {
        self.split.get()
    }

    #[must_use]
    pub fn fresh_feed(&self) -> VolumeRate {
        self.fresh_feed
    }

    #[must_use]
    pub fn recycle_flow(&self) -> VolumeRate {
        self.recycle_flow
    }

    /// Final reject flow that leaves the system.
    #[must_use]
    pub fn disposal_flow(&self) -> VolumeRate {
        self.disposal_flow
    }

    /// A zero split configures no recycle at all.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.split() > 0.0
    }
}

/// Design targets for one stage, used by [`SystemConfiguration::design`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageDesign {
    pub recovery: f64,
    pub layout: StageLayout,
    pub target_flux: Velocity,
}

/// A validated train plus optional recycle.
///
/// # Example
///
/// ```
/// use brine_components::{
///     SystemConfiguration,
///     stage::{StageLayout, hydraulics::{ElementDiameter, SpacerThickness}},
///     system::StageDesign,
///     units::flux_from_lmh,
/// };
/// use uom::si::{f64::VolumeRate, volume_rate::cubic_meter_per_hour};
///
/// let layout = |vessels| {
///     StageLayout::new(vessels, vessels * 6, ElementDiameter::EightInch, SpacerThickness::Mil34)
///         .unwrap()
/// };
/// let designs = [
///     StageDesign { recovery: 0.5, layout: layout(12), target_flux: flux_from_lmh(20.0) },
///     StageDesign { recovery: 0.5, layout: layout(6), target_flux: flux_from_lmh(16.0) },
/// ];
///
/// let fresh = VolumeRate::new::<cubic_meter_per_hour>(100.0);
/// let config = SystemConfiguration::design("bw", fresh, &designs, 0.5).unwrap();
///
/// let recycle = config.recycle().unwrap();
/// let stage_feed = config.stages()[0].flows().feed();
/// let imbalance = stage_feed - fresh - recycle.recycle_flow();
/// assert!(imbalance.get::<cubic_meter_per_hour>().abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemConfiguration {
    membrane_id: String,
    stages: Vec<StageConfig>,
    recycle: Option<RecycleConfig>,
}

impl SystemConfiguration {
    /// Creates a configuration without recycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the stages do not form a valid chain.
    pub fn new(membrane_id: impl Into<String>, stages: Vec<StageConfig>) -> Result<Self, ConfigError> {
        validate_chain(&stages)?;
        Ok(Self {
            membrane_id: membrane_id.into(),
            stages,
            recycle: None,
        })
    }

    /// Adds recycle of `split` times the final concentrate.
    ///
    /// The first stage's feed must already equal `fresh_feed` plus the
    /// resulting recycle flow.
    ///
    /// # Errors
    ///
    /// Returns an error if the split is out of range or the first stage's
    /// feed does not match.
    pub fn with_recycle(mut self, split: f64, fresh_feed: VolumeRate) -> Result<Self, ConfigError> {
        let recycle = RecycleConfig::new(split, fresh_feed, self.final_concentrate())?;

        let stage_feed = self.system_feed().get::<cubic_meter_per_hour>();
        let fresh = fresh_feed.get::<cubic_meter_per_hour>();
        let recycled = recycle.recycle_flow().get::<cubic_meter_per_hour>();
        if (stage_feed - fresh - recycled).abs() > FLOW_BALANCE_TOLERANCE * stage_feed {
            return Err(ConfigError::FreshFeedMismatch {
                stage_feed_m3h: stage_feed,
                fresh_m3h: fresh,
                recycle_m3h: recycled,
            });
        }

        self.recycle = Some(recycle);
        Ok(self)
    }

    /// Sizes consistent stage flows from a fresh feed.
    ///
    /// With recycle, the first stage sees `F = F₀ / (1 − s·Π(1 − rᵢ))`, the
    /// steady state where fresh feed plus recycle equals stage feed. A zero
    /// split configures no recycle.
    ///
    /// # Errors
    ///
    /// Returns an error if any recovery, flow, or split is out of range.
    pub fn design(
        membrane_id: impl Into<String>,
        fresh_feed: VolumeRate,
        designs: &[StageDesign],
        split: f64,
    ) -> Result<Self, ConfigError> {
        if split.is_nan() || split >= 1.0 {
            return Err(ConfigError::SplitRatioOutOfRange { value: split });
        }

        let recoveries = designs
            .iter()
            .map(|d| Recovery::new(d.recovery))
            .collect::<Result<Vec<_>, _>>()?;
        let passing: f64 = recoveries.iter().map(|r| 1.0 - r.get()).product();
        let active = split > 0.0;
        let first_feed = if active {
            fresh_feed / (1.0 - split * passing)
        } else {
            fresh_feed
        };

        let mut stages = Vec::with_capacity(designs.len());
        let mut feed = first_feed;
        for (position, (design, recovery)) in designs.iter().zip(recoveries).enumerate() {
            let flows = StageFlows::from_recovery(feed, recovery)?;
            feed = flows.concentrate();
            stages.push(StageConfig::new(
                position + 1,
                flows,
                design.layout,
                design.target_flux,
            )?);
        }

        let config = Self::new(membrane_id, stages)?;
        if split == 0.0 {
            Ok(config)
        } else {
            config.with_recycle(split, fresh_feed)
        }
    }

    #[must_use]
    pub fn membrane_id(&self) -> &str {
        &self.membrane_id
    }

    #[must_use]
    pub fn stages(&self) -> &[StageConfig] {
        &self.stages
    }

    #[must_use]
    pub fn recycle(&self) -> Option<&RecycleConfig> {
        self.recycle.as_ref()
    }

    /// The recycle configuration, if it sends any flow back.
    #[must_use]
    pub fn active_recycle(&self) -> Option<&RecycleConfig> {
        self.recycle.as_ref().filter(|r| r.is_active())
    }

    /// Feed flow entering the first stage.
    #[must_use]
    pub fn system_feed(&self) -> VolumeRate {
        self.first_stage().flows().feed()
    }

    /// Concentrate flow leaving the last stage.
    #[must_use]
    pub fn final_concentrate(&self) -> VolumeRate {
        self.last_stage().flows().concentrate()
    }

    /// Final concentrate not recycled.
    #[must_use]
    pub fn disposal_flow(&self) -> VolumeRate {
        self.recycle
            .map_or_else(|| self.final_concentrate(), |r| r.disposal_flow())
    }

    /// Flow that overall recovery is measured against.
    ///
    /// This is the fresh feed when recycling, otherwise the first stage feed.
    #[must_use]
    pub fn reference_feed_flow(&self) -> VolumeRate {
        self.active_recycle()
            .map_or_else(|| self.system_feed(), RecycleConfig::fresh_feed)
    }

    // Construction guarantees at least one stage.
    fn first_stage(&self) -> &StageConfig {
        &self.stages[0]
    }

    fn last_stage(&self) -> &StageConfig {
        &self.stages[self.stages.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::{
        stage::hydraulics::{ElementDiameter, SpacerThickness},
        units::flux_from_lmh,
    };

    fn m3h(value: f64) -> VolumeRate {
        VolumeRate::new::<cubic_meter_per_hour>(value)
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
    fn design_closes_recycle_balance() {
        let config = SystemConfiguration::design(
            "bw",
            m3h(100.0),
            &[design(0.5, 12), design(0.5, 6)],
            0.5,
        )
        .unwrap();

        let recycle = config.active_recycle().unwrap();
        assert_relative_eq!(
            config.system_feed().get::<cubic_meter_per_hour>(),
            100.0 / 0.875,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            recycle.recycle_flow().get::<cubic_meter_per_hour>(),
            0.5 * config.final_concentrate().get::<cubic_meter_per_hour>()
        );
        assert_relative_eq!(
            recycle.disposal_flow().get::<cubic_meter_per_hour>(),
            100.0 / 0.875 * 0.125,
            max_relative = 1e-12
        );
        assert_relative_eq!(config.reference_feed_flow().get::<cubic_meter_per_hour>(), 100.0);
    }

    #[test]
    fn zero_split_means_no_recycle() {
        let config =
            SystemConfiguration::design("bw", m3h(150.0), &[design(0.5, 20)], 0.0).unwrap();

        assert!(config.recycle().is_none());
        assert_relative_eq!(config.disposal_flow().get::<cubic_meter_per_hour>(), 75.0);
        assert_relative_eq!(config.reference_feed_flow().get::<cubic_meter_per_hour>(), 150.0);
    }

    #[test]
    fn split_must_be_right_open_unit_interval() {
        let stages = [design(0.5, 20)];
        assert!(matches!(
            SystemConfiguration::design("bw", m3h(150.0), &stages, 1.0),
            Err(ConfigError::SplitRatioOutOfRange { .. })
        ));
        assert!(matches!(
            SystemConfiguration::design("bw", m3h(150.0), &stages, -0.2),
            Err(ConfigError::NegativeRecycleFlow { .. })
        ));
    }

    #[test]
    fn recycle_must_match_first_stage_feed() {
        let config =
            SystemConfiguration::design("bw", m3h(150.0), &[design(0.5, 20)], 0.0).unwrap();

        // 150 m³/h stage feed cannot be 150 fresh plus 15 recycle.
        assert!(matches!(
            config.with_recycle(0.2, m3h(150.0)),
            Err(ConfigError::FreshFeedMismatch { .. })
        ));
    }

    #[test]
    fn design_rejects_bad_recovery() {
        assert!(matches!(
            SystemConfiguration::design("bw", m3h(100.0), &[design(1.0, 12)], 0.0),
            Err(ConfigError::RecoveryOutOfRange { .. })
        ));
        assert_eq!(
            SystemConfiguration::design("bw", m3h(100.0), &[], 0.0),
            Err(ConfigError::EmptyTrain)
        );
    }
}
