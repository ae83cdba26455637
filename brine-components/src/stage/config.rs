use brine_core::constraint::{Constrained, StrictlyPositive, UnitIntervalOpen};
use serde::{Serialize, Serializer};
use uom::si::{
    f64::{Velocity, VolumeRate},
    volume_rate::cubic_meter_per_hour,
};

use crate::{ConfigError, units::flux_to_lmh};

use super::hydraulics::{ElementDiameter, SpacerThickness};

/// Relative tolerance on stream flow balances.
pub(crate) const FLOW_BALANCE_TOLERANCE: f64 = 1e-6;

/// Fraction of a stage's feed leaving as permeate, strictly within `(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Recovery(Constrained<f64, UnitIntervalOpen>);

impl Recovery {
    /// # Errors
    ///
    /// Returns [`ConfigError::RecoveryOutOfRange`] unless `0 < value < 1`.
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        UnitIntervalOpen::new(value)
            .map(Self)
            .map_err(|_| ConfigError::RecoveryOutOfRange { value })
    }

    #[must_use]
    pub fn get(self) -> f64 {
        self.0.get()
    }

    /// Ratio of reject to feed concentration for perfect rejection, `1 / (1 − r)`.
    #[must_use]
    pub fn concentration_factor(self) -> f64 {
        1.0 / (1.0 - self.get())
    }
}

impl Serialize for Recovery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.get())
    }
}

/// Balanced feed, permeate, and concentrate flows of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageFlows {
    feed: VolumeRate,
    permeate: VolumeRate,
    concentrate: VolumeRate,
    recovery: Recovery,
}

impl StageFlows {
    /// Creates stage flows, checking positivity and the volume balance.
    ///
    /// # Errors
    ///
    /// Returns an error if any flow is not strictly positive, or if
    /// `feed ≠ permeate + concentrate` beyond a relative tolerance of 1e-6.
    pub fn new(
        feed: VolumeRate,
        permeate: VolumeRate,
        concentrate: VolumeRate,
    ) -> Result<Self, ConfigError> {
        let feed = positive("feed", feed)?;
        let permeate = positive("permeate", permeate)?;
        let concentrate = positive("concentrate", concentrate)?;

        let f = feed.get::<cubic_meter_per_hour>();
        let p = permeate.get::<cubic_meter_per_hour>();
        let c = concentrate.get::<cubic_meter_per_hour>();
        if ((p + c) - f).abs() > FLOW_BALANCE_TOLERANCE * f {
            return Err(ConfigError::FlowImbalance {
                feed_m3h: f,
                permeate_m3h: p,
                concentrate_m3h: c,
            });
        }

        Ok(Self {
            feed,
            permeate,
            concentrate,
            recovery: Recovery::new(p / f)?,
        })
    }

    /// Splits `feed` by recovery.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed is not strictly positive.
    pub fn from_recovery(feed: VolumeRate, recovery: Recovery) -> Result<Self, ConfigError> {
        let feed = positive("feed", feed)?;
        let permeate = feed * recovery.get();
        Ok(Self {
            feed,
            permeate,
            concentrate: feed - permeate,
            recovery,
        })
    }

    #[must_use]
    pub fn feed(&self) -> VolumeRate {
        self.feed
    }

    #[must_use]
    pub fn permeate(&self) -> VolumeRate {
        self.permeate
    }

    #[must_use]
    pub fn concentrate(&self) -> VolumeRate {
        self.concentrate
    }

    #[must_use]
    pub fn recovery(&self) -> Recovery {
        self.recovery
    }
}

fn positive(stream: &'static str, flow: VolumeRate) -> Result<VolumeRate, ConfigError> {
    let invalid = ConfigError::NonPositiveFlow {
        stream,
        value_m3h: flow.get::<cubic_meter_per_hour>(),
    };
    if !flow.get::<cubic_meter_per_hour>().is_finite() {
        return Err(invalid);
    }
    StrictlyPositive::new(flow)
        .map(Constrained::into_inner)
        .map_err(|_| invalid)
}

/// Pressure vessels and elements of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageLayout {
    vessels: usize,
    elements: usize,
    diameter: ElementDiameter,
    spacer: SpacerThickness,
}

impl StageLayout {
    /// Creates a layout of `elements` spread over parallel `vessels`.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no vessels or fewer elements than
    /// vessels.
    pub fn new(
        vessels: usize,
        elements: usize,
        diameter: ElementDiameter,
        spacer: SpacerThickness,
    ) -> Result<Self, ConfigError> {
        if vessels == 0 {
            return Err(ConfigError::NoVessels);
        }
        if elements < vessels {
            return Err(ConfigError::TooFewElements { vessels, elements });
        }
        Ok(Self {
            vessels,
            elements,
            diameter,
            spacer,
        })
    }

    #[must_use]
    pub fn vessels(&self) -> usize {
        self.vessels
    }

    #[must_use]
    pub fn elements(&self) -> usize {
        self.elements
    }

    /// Average number of elements in series inside each vessel.
    ///
    /// Not a whole number when the elements do not divide evenly.
    #[must_use]
    pub fn elements_per_vessel(&self) -> f64 {
        self.elements as f64 / self.vessels as f64
    }

    #[must_use]
    pub fn diameter(&self) -> ElementDiameter {
        self.diameter
    }

    #[must_use]
    pub fn spacer(&self) -> SpacerThickness {
        self.spacer
    }
}

/// One stage of a train, validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageConfig {
    index: usize,
    flows: StageFlows,
    layout: StageLayout,
    target_flux: Velocity,
}

impl StageConfig {
    /// # Errors
    ///
    /// Returns an error if `index` is zero or the target flux is not finite
    /// and strictly positive.
    pub fn new(
        index: usize,
        flows: StageFlows,
        layout: StageLayout,
        target_flux: Velocity,
    ) -> Result<Self, ConfigError> {
        if index == 0 {
            return Err(ConfigError::InvalidStageIndex {
                expected: 1,
                found: 0,
            });
        }
        let lmh = flux_to_lmh(target_flux);
        if !lmh.is_finite() || lmh <= 0.0 {
            return Err(ConfigError::NonPositiveFlux { value_lmh: lmh });
        }
        Ok(Self {
            index,
            flows,
            layout,
            target_flux,
        })
    }

    /// 1-based position in the train.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn flows(&self) -> &StageFlows {
        &self.flows
    }

    #[must_use]
    pub fn layout(&self) -> &StageLayout {
        &self.layout
    }

    #[must_use]
    pub fn target_flux(&self) -> Velocity {
        self.target_flux
    }

    #[must_use]
    pub fn recovery(&self) -> Recovery {
        self.flows.recovery()
    }
}
