//! Command vocabulary, JSON file formats and the simulation runner
//!
//! A command file is an ordered list of `addVehicle` and `step` commands.
//! [`SimulationRunner`] replays it against an [`Intersection`] and collects
//! the ids released by every step into a [`SimulationOutput`].

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::core::intersection::{Intersection, StepObserver};
use crate::core::lane::Vehicle;
use crate::core::maneuver::DirectedManeuver;

/// Progress callback receiving (processed commands, total commands)
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// One simulation command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    AddVehicle {
        vehicle_id: String,
        start_road: String,
        end_road: String,
    },
    Step,
}

impl Command {
    pub fn add_vehicle(vehicle_id: &str, start_road: &str, end_road: &str) -> Self {
        Command::AddVehicle {
            vehicle_id: vehicle_id.to_string(),
            start_road: start_road.to_string(),
            end_road: end_road.to_string(),
        }
    }
}

/// Input document: `{"commands": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFile {
    pub commands: Vec<Command>,
}

/// Command totals reported by validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandStats {
    pub vehicles: usize,
    pub steps: usize,
}

impl fmt::Display for CommandStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vehicles, {} steps", self.vehicles, self.steps)
    }
}

impl CommandFile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Check every vehicle against `intersection` without queueing anything
    pub fn validate(&self, intersection: &Intersection) -> Result<CommandStats> {
        let mut stats = CommandStats::default();
        for command in &self.commands {
            match command {
                Command::AddVehicle {
                    start_road,
                    end_road,
                    ..
                } => {
                    let maneuver = DirectedManeuver::from_roads(start_road, end_road)?;
                    let direction = maneuver.direction();
                    let approach = intersection
                        .approach(direction)
                        .ok_or(Error::MissingApproach(direction))?;
                    if approach.select_lane(maneuver.maneuver()).is_none() {
                        return Err(Error::NoEligibleLane { maneuver });
                    }
                    stats.vehicles += 1;
                }
                Command::Step => stats.steps += 1,
            }
        }
        Ok(stats)
    }
}

/// Vehicles released by one step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatus {
    pub left_vehicles: Vec<String>,
}

/// Output document: one status per `step` command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutput {
    pub step_statuses: Vec<StepStatus>,
}

impl SimulationOutput {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Observer recording every step as a [`StepStatus`]
#[derive(Debug, Default)]
pub struct OutputCollector {
    output: SimulationOutput,
}

impl OutputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> &SimulationOutput {
        &self.output
    }

    pub fn into_output(self) -> SimulationOutput {
        self.output
    }
}

impl StepObserver for OutputCollector {
    fn on_step(&mut self, released: &[Vehicle], _intersection: &Intersection) {
        self.output.step_statuses.push(StepStatus {
            left_vehicles: released.iter().map(|v| v.id().to_string()).collect(),
        });
    }
}

/// Forwards every notification to two observers
struct Fanout<'a> {
    first: &'a mut dyn StepObserver,
    second: &'a mut dyn StepObserver,
}

impl StepObserver for Fanout<'_> {
    fn on_step(&mut self, released: &[Vehicle], intersection: &Intersection) {
        self.first.on_step(released, intersection);
        self.second.on_step(released, intersection);
    }

    fn on_admit(&mut self, vehicle: &Vehicle, intersection: &Intersection) {
        self.first.on_admit(vehicle, intersection);
        self.second.on_admit(vehicle, intersection);
    }
}

/// Options for replaying a command file
#[derive(Clone, Default)]
pub struct RunOptions {
    /// Log and skip vehicles that cannot be admitted instead of failing
    pub skip_invalid: bool,

    /// Optional progress callback
    pub progress: Option<ProgressCallback>,
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("skip_invalid", &self.skip_invalid)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Errors caused by a single vehicle rather than by the run as a whole
fn is_rejected_vehicle(error: &Error) -> bool {
    matches!(
        error,
        Error::UnknownRoad { .. }
            | Error::MalformedManeuver { .. }
            | Error::NoEligibleLane { .. }
            | Error::MissingApproach(_)
    )
}

/// Replays commands against an intersection
pub struct SimulationRunner {
    intersection: Intersection,
    options: RunOptions,
    skipped: usize,
}

impl SimulationRunner {
    pub fn new(intersection: Intersection) -> Self {
        Self::with_options(intersection, RunOptions::default())
    }

    pub fn with_options(intersection: Intersection, options: RunOptions) -> Self {
        Self {
            intersection,
            options,
            skipped: 0,
        }
    }

    pub fn intersection(&self) -> &Intersection {
        &self.intersection
    }

    /// Number of vehicles skipped because they could not be admitted
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn run(&mut self, commands: &[Command]) -> Result<SimulationOutput> {
        self.run_observed(commands, &mut ())
    }

    /// Run `commands` in order, also reporting to `observer`
    pub fn run_observed(
        &mut self,
        commands: &[Command],
        observer: &mut dyn StepObserver,
    ) -> Result<SimulationOutput> {
        let mut collector = OutputCollector::new();
        let total = commands.len() as u64;

        {
            let mut fanout = Fanout {
                first: &mut collector,
                second: observer,
            };
            for (processed, command) in commands.iter().enumerate() {
                self.apply(command, &mut fanout)?;
                if let Some(progress) = &self.options.progress {
                    progress(processed as u64 + 1, total);
                }
            }
        }

        log::info!(
            "processed {} commands, {} steps, {} vehicles still waiting",
            commands.len(),
            collector.output().step_statuses.len(),
            self.intersection.queued()
        );
        Ok(collector.into_output())
    }

    fn apply(&mut self, command: &Command, observer: &mut dyn StepObserver) -> Result<()> {
        match command {
            Command::AddVehicle {
                vehicle_id,
                start_road,
                end_road,
            } => {
                let admitted = DirectedManeuver::from_roads(start_road, end_road).and_then(
                    |maneuver| {
                        self.intersection
                            .admit_with(Vehicle::new(vehicle_id.as_str(), maneuver), observer)
                    },
                );
                match admitted {
                    Err(e) if self.options.skip_invalid && is_rejected_vehicle(&e) => {
                        log::warn!("skipping vehicle {vehicle_id}: {e}");
                        self.skipped += 1;
                        Ok(())
                    }
                    other => other,
                }
            }
            Command::Step => self.intersection.step_with(observer).map(|_| ()),
        }
    }
}
