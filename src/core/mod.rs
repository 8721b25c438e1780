//! Core library modules for traffic-phase
//!
//! The scheduling core (maneuvers, lanes, conflict graph, clique solver and
//! intersection state) plus the layout and command adapters around it.

pub mod clique;
pub mod command;
pub mod error;
pub mod graph;
pub mod intersection;
pub mod lane;
pub mod layout;
pub mod maneuver;

