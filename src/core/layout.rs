//! Intersection layout configuration
//!
//! Lane arrangements are data: a layout lists every approach road with the
//! maneuvers each of its lanes accepts. Layouts come from one of the
//! built-in [`Preset`]s or from a JSON file.

use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::core::intersection::Intersection;
use crate::core::lane::{Approach, TrafficLane};
use crate::core::maneuver::{Direction, Maneuver};

/// One lane and the maneuvers it accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneSpec {
    pub moves: Vec<Maneuver>,
}

impl LaneSpec {
    pub fn new(moves: &[Maneuver]) -> Self {
        Self {
            moves: moves.to_vec(),
        }
    }
}

/// One approach road and its lanes, listed kerb side first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproachSpec {
    pub road: String,
    pub lanes: Vec<LaneSpec>,
}

/// Complete lane arrangement of an intersection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionLayout {
    pub approaches: Vec<ApproachSpec>,
}

/// Built-in layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
    /// One lane per road accepting every maneuver
    #[default]
    SingleLane,
    /// One lane per maneuver on every road
    Dedicated,
    /// Mixed lane counts with shared and dedicated lanes
    MultiLane,
}

impl Preset {
    /// Look up a preset by its command-line name, ignoring case
    pub fn from_name(name: &str) -> Option<Preset> {
        Preset::value_variants().iter().copied().find(|preset| {
            preset
                .to_possible_value()
                .is_some_and(|value| value.matches(name, true))
        })
    }

    pub fn layout(self) -> IntersectionLayout {
        use Maneuver::{Left, Right, Straight};

        let approaches = match self {
            Preset::SingleLane => uniform(&[&[Right, Straight, Left]]),
            Preset::Dedicated => uniform(&[&[Left], &[Straight], &[Right]]),
            Preset::MultiLane => vec![
                approach(Direction::North, &[&[Right], &[Right], &[Straight], &[Left]]),
                approach(Direction::East, &[&[Straight, Right], &[Straight, Left]]),
                approach(
                    Direction::South,
                    &[&[Right], &[Straight, Right], &[Straight], &[Left]],
                ),
                approach(Direction::West, &[&[Right], &[Straight], &[Left]]),
            ],
        };
        IntersectionLayout { approaches }
    }

    pub fn build(self) -> Result<Intersection> {
        self.layout().build()
    }
}

fn approach(road: Direction, lanes: &[&[Maneuver]]) -> ApproachSpec {
    ApproachSpec {
        road: road.road_name().to_string(),
        lanes: lanes.iter().map(|moves| LaneSpec::new(moves)).collect(),
    }
}

/// Same lanes on every road
fn uniform(lanes: &[&[Maneuver]]) -> Vec<ApproachSpec> {
    Direction::ALL
        .iter()
        .map(|road| approach(*road, lanes))
        .collect()
}

impl IntersectionLayout {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Validate the layout and create an empty intersection from it.
    ///
    /// Roads may be omitted; vehicles arriving on a missing road are
    /// rejected at admission.
    pub fn build(&self) -> Result<Intersection> {
        let mut approaches = Vec::with_capacity(self.approaches.len());
        for spec in &self.approaches {
            let direction = Direction::from_road_name(&spec.road)?;
            let lanes = spec
                .lanes
                .iter()
                .map(|lane| TrafficLane::new(lane.moves.iter().copied()))
                .collect::<Result<Vec<_>>>()
                .map_err(|e| match e {
                    Error::InvalidLayout(msg) => {
                        Error::InvalidLayout(format!("road {direction}: {msg}"))
                    }
                    other => other,
                })?;
            approaches.push(Approach::new(direction, lanes)?);
        }

        let intersection = Intersection::new(approaches)?;
        log::debug!(
            "built intersection with {} approaches",
            intersection.approaches().count()
        );
        Ok(intersection)
    }
}
