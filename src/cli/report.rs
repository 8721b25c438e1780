//! Road-state logging for the command-line interface
//!
//! Renders every approach as a row of lanes, e.g.
//! `| ---: 0 | SOUTH_STRAIGHT: 1 | SOUTH_RIGHT: 3 |`. The label is the
//! maneuver of the head vehicle only; a shared lane may hold vehicles with
//! other maneuvers behind it.

use std::cmp::Reverse;

use log::debug;
use traffic_phase::{Approach, Intersection, StepObserver, TrafficLane, Vehicle};

/// Render one approach; empty lanes first, then by descending maneuver index
pub fn render_road(approach: &Approach) -> String {
    let mut lanes: Vec<&TrafficLane> = approach.lanes().iter().collect();
    lanes.sort_by_key(|lane| {
        Reverse(
            lane.current_maneuver()
                .map_or(usize::MAX, |maneuver| maneuver.index()),
        )
    });

    let mut row = String::from("|");
    for lane in lanes {
        let label = lane
            .current_maneuver()
            .map_or_else(|| "---".to_string(), |maneuver| maneuver.to_string());
        row.push_str(&format!(" {label}: {} |", lane.len()));
    }
    row
}

/// Observer that logs every road after each admission and step
#[derive(Debug, Default)]
pub struct StateLogger;

impl StateLogger {
    fn log_roads(intersection: &Intersection) {
        for approach in intersection.approaches() {
            debug!("road {}: {}", approach.direction(), render_road(approach));
        }
    }
}

impl StepObserver for StateLogger {
    fn on_step(&mut self, released: &[Vehicle], intersection: &Intersection) {
        let ids: Vec<&str> = released.iter().map(Vehicle::id).collect();
        debug!("step {} released [{}]", intersection.steps(), ids.join(", "));
        Self::log_roads(intersection);
    }

    fn on_admit(&mut self, vehicle: &Vehicle, intersection: &Intersection) {
        debug!("added vehicle {vehicle}");
        Self::log_roads(intersection);
    }
}
