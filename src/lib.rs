//! # Traffic-phase Library
//!
//! Right-of-way scheduling for a four-way intersection. Vehicles queue in
//! lanes that each serve a fixed set of turns; every step releases the
//! largest (lane-weighted) set of mutually compatible maneuvers.
//!
//! ## Features
//!
//! - **Conflict model**: twelve directed maneuvers with a fixed conflict rule
//! - **Optimal phases**: maximum-weight clique search with pivoting and pruning
//! - **Configurable layouts**: built-in presets or JSON lane arrangements
//! - **Observers**: per-step and per-admission notifications for custom UIs
//! - **Feature flags**: optional C bindings
//!
//! ## Basic Usage
//!
//! ```rust
//! use traffic_phase::{Preset, Result};
//!
//! fn main() -> Result<()> {
//!     let mut intersection = Preset::SingleLane.build()?;
//!     intersection.admit_route("v1", "south", "north")?;
//!     intersection.admit_route("v2", "north", "south")?;
//!
//!     let released = intersection.step()?;
//!     assert_eq!(released.len(), 2);
//!     Ok(())
//! }
//! ```
//!
//! ## Command Files
//!
//! ```rust
//! use traffic_phase::{Command, Preset};
//!
//! # fn main() -> traffic_phase::Result<()> {
//! let commands = vec![
//!     Command::add_vehicle("v3", "west", "south"),
//!     Command::add_vehicle("v4", "west", "south"),
//!     Command::Step,
//!     Command::Step,
//! ];
//! let output = traffic_phase::run_commands(&commands, Preset::SingleLane)?;
//! assert_eq!(output.step_statuses[0].left_vehicles, vec!["v3"]);
//! assert_eq!(output.step_statuses[1].left_vehicles, vec!["v4"]);
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

// Re-export core types that users might need
pub use crate::core::clique::{solve, Clique, WeightedBronKerbosch};
pub use crate::core::command::{
    Command, CommandFile, CommandStats, OutputCollector, ProgressCallback, RunOptions,
    SimulationOutput, SimulationRunner, StepStatus,
};
pub use crate::core::error::{suggest_road, Error, Result};
pub use crate::core::graph::{ConflictGraph, ManeuverSet, Vertex};
pub use crate::core::intersection::{Intersection, LaneId, Occupancy, Phase, StepObserver};
pub use crate::core::lane::{Approach, TrafficLane, Vehicle};
pub use crate::core::layout::{ApproachSpec, IntersectionLayout, LaneSpec, Preset};
pub use crate::core::maneuver::{DirectedManeuver, Direction, Maneuver};

// Internal modules
mod core;

// C-compatible FFI bindings (optional)
#[cfg(feature = "c-bindings")]
pub mod ffi;

/// Replay `commands` on an empty intersection built from `preset`
pub fn run_commands(commands: &[Command], preset: Preset) -> Result<SimulationOutput> {
    let mut runner = SimulationRunner::new(preset.build()?);
    runner.run(commands)
}

/// Replay a command file with a progress callback
///
/// The callback receives (processed commands, total commands).
///
/// # Examples
/// ```rust,no_run
/// use traffic_phase::Preset;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let output = traffic_phase::run_file_with_progress(
///     "commands.json",
///     Preset::MultiLane,
///     |done, total| eprintln!("{done}/{total}"),
/// )?;
/// println!("{}", output.to_json_pretty()?);
/// # Ok(())
/// # }
/// ```
pub fn run_file_with_progress<F>(
    path: impl AsRef<Path>,
    preset: Preset,
    progress: F,
) -> Result<SimulationOutput>
where
    F: Fn(u64, u64) + Send + Sync + 'static,
{
    let options = RunOptions {
        progress: Some(Arc::new(progress)),
        ..Default::default()
    };
    run_file_with_options(path, preset.build()?, options)
}

/// Replay a command file against `intersection` with custom options
///
/// # Examples
/// ```rust,no_run
/// use traffic_phase::{IntersectionLayout, RunOptions};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let intersection = IntersectionLayout::from_path("layout.json")?.build()?;
/// let options = RunOptions {
///     skip_invalid: true,
///     ..Default::default()
/// };
/// let output = traffic_phase::run_file_with_options("commands.json", intersection, options)?;
/// # Ok(())
/// # }
/// ```
pub fn run_file_with_options(
    path: impl AsRef<Path>,
    intersection: Intersection,
    options: RunOptions,
) -> Result<SimulationOutput> {
    let file = CommandFile::from_path(path)?;
    let mut runner = SimulationRunner::with_options(intersection, options);
    runner.run(&file.commands)
}
