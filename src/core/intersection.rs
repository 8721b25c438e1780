//! Intersection state, vehicle admission and the scheduling step
//!
//! Each step snapshots which maneuver every non-empty lane is heading,
//! builds the conflict graph from that snapshot, picks the heaviest set of
//! mutually compatible maneuvers and releases one vehicle from every lane
//! heading a chosen maneuver.

use std::collections::BTreeMap;

use crate::core::clique::{self, Clique};
use crate::core::error::{Error, Result};
use crate::core::graph::ConflictGraph;
use crate::core::lane::{Approach, Vehicle};
use crate::core::maneuver::{DirectedManeuver, Direction};

/// Address of a physical lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LaneId {
    pub road: Direction,
    pub lane: usize,
}

/// Lanes grouped by the maneuver of their head vehicle
pub type Occupancy = BTreeMap<DirectedManeuver, Vec<LaneId>>;

/// Receives notifications from an [`Intersection`].
///
/// Observers are passed in per call; the intersection never stores them.
pub trait StepObserver {
    /// Called once per step with the vehicles released in that step
    fn on_step(&mut self, released: &[Vehicle], intersection: &Intersection);

    /// Called after a vehicle has been queued
    fn on_admit(&mut self, _vehicle: &Vehicle, _intersection: &Intersection) {}
}

impl StepObserver for () {
    fn on_step(&mut self, _released: &[Vehicle], _intersection: &Intersection) {}
}

/// A planned phase: the graph it was computed on and the chosen clique
#[derive(Debug, Clone)]
pub struct Phase {
    pub occupancy: Occupancy,
    pub graph: ConflictGraph,
    pub clique: Clique,
}

impl Phase {
    /// Number of vehicles this phase releases
    pub fn release_count(&self) -> usize {
        self.clique
            .members
            .iter()
            .map(|m| self.occupancy.get(&m).map_or(0, Vec::len))
            .sum()
    }
}

/// A single intersection with at most one approach per road
#[derive(Debug, Clone)]
pub struct Intersection {
    approaches: BTreeMap<Direction, Approach>,
    steps: usize,
}

impl Intersection {
    /// Create an intersection; each road may appear only once
    pub fn new(approaches: impl IntoIterator<Item = Approach>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for approach in approaches {
            let direction = approach.direction();
            if map.insert(direction, approach).is_some() {
                return Err(Error::DuplicateApproach(direction));
            }
        }
        Ok(Self {
            approaches: map,
            steps: 0,
        })
    }

    pub fn approach(&self, direction: Direction) -> Option<&Approach> {
        self.approaches.get(&direction)
    }

    /// Approaches in road order
    pub fn approaches(&self) -> impl Iterator<Item = &Approach> {
        self.approaches.values()
    }

    /// Number of steps taken so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Total number of waiting vehicles
    pub fn queued(&self) -> usize {
        self.approaches.values().map(Approach::queued).sum()
    }

    /// Queue a vehicle on its approach
    pub fn admit(&mut self, vehicle_id: &str, maneuver: DirectedManeuver) -> Result<()> {
        self.admit_with(Vehicle::new(vehicle_id, maneuver), &mut ())
    }

    /// Queue a vehicle described by origin and destination road names
    pub fn admit_route(&mut self, vehicle_id: &str, start: &str, end: &str) -> Result<()> {
        let maneuver = DirectedManeuver::from_roads(start, end)?;
        self.admit(vehicle_id, maneuver)
    }

    /// Queue a vehicle and notify `observer`
    pub fn admit_with(&mut self, vehicle: Vehicle, observer: &mut dyn StepObserver) -> Result<()> {
        let direction = vehicle.maneuver().direction();
        let approach = self
            .approaches
            .get_mut(&direction)
            .ok_or(Error::MissingApproach(direction))?;

        let lane = approach.admit(vehicle.clone())?;
        log::debug!("admitted {vehicle} to lane {lane} of road {direction}");

        observer.on_admit(&vehicle, self);
        Ok(())
    }

    /// Current lane occupancy merged across all approaches
    pub fn occupancy(&self) -> Occupancy {
        let mut occupancy = Occupancy::new();
        for (road, approach) in &self.approaches {
            for (maneuver, lanes) in approach.lane_mapping() {
                occupancy
                    .entry(maneuver)
                    .or_default()
                    .extend(lanes.into_iter().map(|lane| LaneId { road: *road, lane }));
            }
        }
        occupancy
    }

    /// Compute the next phase without releasing anyone
    pub fn plan(&self) -> Result<Phase> {
        let occupancy = self.occupancy();
        let graph = ConflictGraph::from_occupancy(&occupancy);
        let clique = clique::solve(&graph)?;
        Ok(Phase {
            occupancy,
            graph,
            clique,
        })
    }

    /// Advance one scheduling round
    pub fn step(&mut self) -> Result<Vec<Vehicle>> {
        self.step_with(&mut ())
    }

    /// Advance one scheduling round and report the released vehicles to
    /// `observer`.
    ///
    /// At most one vehicle leaves each physical lane.
    pub fn step_with(&mut self, observer: &mut dyn StepObserver) -> Result<Vec<Vehicle>> {
        let phase = self.plan()?;
        log::debug!(
            "step {}: {} occupied maneuvers, green for {:?} (weight {})",
            self.steps + 1,
            phase.graph.vertex_count(),
            phase.clique.members,
            phase.clique.weight
        );

        let mut released = Vec::with_capacity(phase.release_count());
        for maneuver in phase.clique.members {
            let Some(lanes) = phase.occupancy.get(&maneuver) else {
                continue;
            };
            for id in lanes {
                released.push(self.release(*id)?);
            }
        }

        self.steps += 1;
        observer.on_step(&released, self);
        Ok(released)
    }

    fn release(&mut self, id: LaneId) -> Result<Vehicle> {
        self.approaches
            .get_mut(&id.road)
            .and_then(|approach| approach.lane_mut(id.lane))
            .and_then(|lane| lane.pop())
            .ok_or(Error::LaneEmpty {
                road: id.road,
                lane: id.lane,
            })
    }
}
