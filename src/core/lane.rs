//! Vehicles, physical lanes and approach roads
//!
//! A [`TrafficLane`] is a FIFO queue restricted to a fixed set of maneuvers.
//! An [`Approach`] groups the lanes of one road and routes arriving vehicles
//! to the least loaded lane that accepts them.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use crate::core::error::{Error, Result};
use crate::core::maneuver::{DirectedManeuver, Direction, Maneuver};

/// A waiting vehicle: an opaque label plus its intended maneuver
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vehicle {
    id: String,
    maneuver: DirectedManeuver,
}

impl Vehicle {
    pub fn new(id: impl Into<String>, maneuver: DirectedManeuver) -> Self {
        Self {
            id: id.into(),
            maneuver,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn maneuver(&self) -> DirectedManeuver {
        self.maneuver
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.maneuver)
    }
}

/// A physical lane serving a fixed subset of maneuvers
#[derive(Debug, Clone)]
pub struct TrafficLane {
    supported: BTreeSet<Maneuver>,
    waiting: VecDeque<Vehicle>,
}

impl TrafficLane {
    /// Create a lane; the maneuver set must not be empty
    pub fn new(supported: impl IntoIterator<Item = Maneuver>) -> Result<Self> {
        let supported: BTreeSet<Maneuver> = supported.into_iter().collect();
        if supported.is_empty() {
            return Err(Error::InvalidLayout(
                "lane must support at least one maneuver".to_string(),
            ));
        }
        Ok(Self {
            supported,
            waiting: VecDeque::new(),
        })
    }

    /// Lane accepting every maneuver
    pub fn all_moves() -> Self {
        Self {
            supported: Maneuver::ALL.into_iter().collect(),
            waiting: VecDeque::new(),
        }
    }

    pub fn supports(&self, maneuver: Maneuver) -> bool {
        self.supported.contains(&maneuver)
    }

    pub fn supported(&self) -> impl Iterator<Item = Maneuver> + '_ {
        self.supported.iter().copied()
    }

    /// Maneuver of the head vehicle, if any
    pub fn current_maneuver(&self) -> Option<DirectedManeuver> {
        self.waiting.front().map(Vehicle::maneuver)
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    pub fn push(&mut self, vehicle: Vehicle) {
        self.waiting.push_back(vehicle);
    }

    /// Remove and return the head vehicle
    pub fn pop(&mut self) -> Option<Vehicle> {
        self.waiting.pop_front()
    }

    pub fn waiting(&self) -> impl Iterator<Item = &Vehicle> {
        self.waiting.iter()
    }
}

/// One road entering the intersection and its lanes
#[derive(Debug, Clone)]
pub struct Approach {
    direction: Direction,
    lanes: Vec<TrafficLane>,
}

impl Approach {
    /// Create an approach; at least one lane is required
    pub fn new(direction: Direction, lanes: Vec<TrafficLane>) -> Result<Self> {
        if lanes.is_empty() {
            return Err(Error::InvalidLayout(format!(
                "road {direction} must have at least one lane"
            )));
        }
        Ok(Self { direction, lanes })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn lanes(&self) -> &[TrafficLane] {
        &self.lanes
    }

    pub fn lane_mut(&mut self, index: usize) -> Option<&mut TrafficLane> {
        self.lanes.get_mut(index)
    }

    /// Total number of queued vehicles across all lanes
    pub fn queued(&self) -> usize {
        self.lanes.iter().map(TrafficLane::len).sum()
    }

    /// Index of the lane a vehicle with `maneuver` would join.
    ///
    /// Picks the shortest accepting lane; ties go to the first such lane.
    pub fn select_lane(&self, maneuver: Maneuver) -> Option<usize> {
        self.lanes
            .iter()
            .enumerate()
            .filter(|(_, lane)| lane.supports(maneuver))
            .min_by_key(|(_, lane)| lane.len())
            .map(|(index, _)| index)
    }

    /// Enqueue a vehicle on the least loaded accepting lane.
    ///
    /// Returns the chosen lane index. Fails without touching any queue when
    /// the vehicle belongs to another road or no lane serves its maneuver.
    pub fn admit(&mut self, vehicle: Vehicle) -> Result<usize> {
        let maneuver = vehicle.maneuver();
        if maneuver.direction() != self.direction {
            return Err(Error::InvalidCommand(format!(
                "vehicle {} arrives on {} but was routed to road {}",
                vehicle.id(),
                maneuver.direction(),
                self.direction
            )));
        }

        let index = self
            .select_lane(maneuver.maneuver())
            .ok_or(Error::NoEligibleLane { maneuver })?;
        self.lanes[index].push(vehicle);
        Ok(index)
    }

    /// Non-empty lanes grouped by the maneuver of their head vehicle
    pub fn lane_mapping(&self) -> BTreeMap<DirectedManeuver, Vec<usize>> {
        let mut mapping: BTreeMap<DirectedManeuver, Vec<usize>> = BTreeMap::new();
        for (index, lane) in self.lanes.iter().enumerate() {
            if let Some(maneuver) = lane.current_maneuver() {
                mapping.entry(maneuver).or_default().push(index);
            }
        }
        mapping
    }
}
