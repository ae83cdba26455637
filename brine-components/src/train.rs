//! The stage sequencer.
//!
//! A train runs its stages in order. Each stage's reject is the next stage's
//! feed, and its reject pressure (discharge minus hydraulic drop) is the next
//! pump's suction. Stages that need less pressure than they receive get no
//! booster.

use brine_core::model::Model;
use serde::Serialize;
use uom::si::{
    f64::{Power, Pressure},
    power::watt,
    volume_rate::cubic_meter_per_hour,
};

use crate::{
    ConfigError, IonComposition, SimulationError,
    stage::{FLOW_BALANCE_TOLERANCE, StageConfig, StageContext, StageResult, simulate_stage},
};

/// Checks that stages are numbered `1..=n` and that flows chain.
///
/// # Errors
///
/// Returns an error if the list is empty, an index is out of sequence, or a
/// stage's feed differs from the previous stage's concentrate.
pub fn validate_chain(stages: &[StageConfig]) -> Result<(), ConfigError> {
    if stages.is_empty() {
        return Err(ConfigError::EmptyTrain);
    }

    for (position, stage) in stages.iter().enumerate() {
        if stage.index() != position + 1 {
            return Err(ConfigError::InvalidStageIndex {
                expected: position + 1,
                found: stage.index(),
            });
        }
    }

    for pair in stages.windows(2) {
        let concentrate = pair[0].flows().concentrate().get::<cubic_meter_per_hour>();
        let feed = pair[1].flows().feed().get::<cubic_meter_per_hour>();
        if (feed - concentrate).abs() > FLOW_BALANCE_TOLERANCE * concentrate {
            return Err(ConfigError::StageChainMismatch {
                stage: pair[1].index(),
                feed_m3h: feed,
                concentrate_m3h: concentrate,
            });
        }
    }

    Ok(())
}

/// A validated sequence of stages bound to its operating context.
#[derive(Debug, Clone, Copy)]
pub struct Train<'a> {
    stages: &'a [StageConfig],
    context: StageContext<'a>,
}

impl<'a> Train<'a> {
    /// # Errors
    ///
    /// Returns an error if the stages do not form a valid chain.
    pub fn new(stages: &'a [StageConfig], context: StageContext<'a>) -> Result<Self, ConfigError> {
        validate_chain(stages)?;
        Ok(Self { stages, context })
    }

    #[must_use]
    pub fn stages(&self) -> &'a [StageConfig] {
        self.stages
    }

    /// Returns an iterator yielding one stage result at a time.
    #[must_use]
    pub fn sequence(&self, feed: IonComposition) -> Sequencer<'a> {
        Sequencer {
            train: *self,
            state: SequencerState::Pending(0),
            feed,
            suction: self.context.conditions.feed_supply_pressure,
        }
    }

    /// Runs every stage on `feed`.
    ///
    /// # Errors
    ///
    /// Returns the first stage error encountered.
    pub fn run(&self, feed: &IonComposition) -> Result<TrainResult, SimulationError> {
        let stages = self
            .sequence(feed.clone())
            .collect::<Result<Vec<_>, _>>()?;

        let total_pump_power = stages
            .iter()
            .fold(Power::new::<watt>(0.0), |total, stage| total + stage.pump.power);

        Ok(TrainResult {
            stages,
            total_pump_power,
        })
    }
}

impl Model for Train<'_> {
    type Input = IonComposition;
    type Output = TrainResult;
    type Error = SimulationError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        self.run(input)
    }
}

/// Output of one pass through a train.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainResult {
    pub stages: Vec<StageResult>,
    pub total_pump_power: Power,
}

impl TrainResult {
    /// The last stage, whose reject leaves the train.
    ///
    /// A train always has at least one stage, so this is `None` only for a
    /// hand-built empty result.
    #[must_use]
    pub fn final_stage(&self) -> Option<&StageResult> {
        self.stages.last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequencerState {
    /// Next stage to run, as a 0-based position.
    Pending(usize),
    Completed,
}

/// Iterator running a train one stage at a time.
///
/// After yielding an error the sequencer is completed.
#[derive(Debug, Clone)]
pub struct Sequencer<'a> {
    train: Train<'a>,
    state: SequencerState,
    feed: IonComposition,
    suction: Pressure,
}

impl Iterator for Sequencer<'_> {
    type Item = Result<StageResult, SimulationError>;

    fn next(&mut self) -> Option<Self::Item> {
        let SequencerState::Pending(position) = self.state else {
            return None;
        };
        let Some(stage) = self.train.stages.get(position) else {
            self.state = SequencerState::Completed;
            return None;
        };

        match simulate_stage(stage, &self.feed, self.suction, &self.train.context) {
            Ok(result) => {
                self.feed = result.reject.clone();
                self.suction = result.pump.discharge - result.hydraulics.stage_drop;
                self.state = if position + 1 < self.train.stages.len() {
                    SequencerState::Pending(position + 1)
                } else {
                    SequencerState::Completed
                };
                Some(Ok(result))
            }
            Err(err) => {
                self.state = SequencerState::Completed;
                Some(Err(err.into()))
            }
        }
    }
}
