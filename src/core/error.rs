//! Error types for traffic-phase
//!
//! Provides error handling for admission, layout validation and scheduling,
//! plus fuzzy "did you mean" suggestions for misspelled road names.

use std::fmt;

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::core::maneuver::{DirectedManeuver, Direction};

/// Minimum combined similarity for a road-name suggestion to be offered.
/// Keeps "nroth" -> "north" while rejecting "main-street".
const SUGGESTION_THRESHOLD: f64 = 0.7;

/// Suggest a correction for a potentially misspelled road name
///
/// Scores every known road name with 70% Jaro-Winkler + 30% normalized
/// Levenshtein and returns the best one above the threshold. Exact
/// (case-insensitive) matches return `None` since nothing needs fixing.
pub fn suggest_road(name: &str) -> Option<String> {
    let input = name.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let mut best_match = None;
    let mut best_score = 0.0f64;

    for direction in Direction::ALL {
        let candidate = direction.road_name();
        if candidate == input {
            return None;
        }

        let score = jaro_winkler(&input, candidate) * 0.7
            + normalized_levenshtein(&input, candidate) * 0.3;

        if score >= SUGGESTION_THRESHOLD && score > best_score {
            best_score = score;
            best_match = Some(candidate.to_string());
        }
    }

    best_match
}

/// Main error type for traffic-phase operations
#[derive(Debug)]
pub enum Error {
    /// Road name that is not one of the four approaches
    UnknownRoad {
        name: String,
        suggestion: Option<String>,
    },

    /// Origin/destination pair that is not one of the twelve directed maneuvers
    MalformedManeuver { start: String, end: String },

    /// No lane on the vehicle's approach serves its maneuver
    NoEligibleLane { maneuver: DirectedManeuver },

    /// The intersection has no approach for this road
    MissingApproach(Direction),

    /// The same road was configured twice
    DuplicateApproach(Direction),

    /// Layout configuration that cannot describe an intersection
    InvalidLayout(String),

    /// Command that is structurally valid JSON but not a usable command
    InvalidCommand(String),

    /// Clique solver invoked outside its contract
    SolverPrecondition(&'static str),

    /// A lane selected for release had no waiting vehicle
    LaneEmpty { road: Direction, lane: usize },

    /// JSON encoding or decoding failure
    Json(serde_json::Error),

    /// File I/O error
    IoError(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownRoad { name, suggestion } => match suggestion {
                Some(s) => write!(f, "Unknown road '{name}' (did you mean '{s}'?)"),
                None => write!(f, "Unknown road '{name}'"),
            },
            Error::MalformedManeuver { start, end } => {
                write!(f, "No maneuver leads from road '{start}' to road '{end}'")
            }
            Error::NoEligibleLane { maneuver } => {
                write!(f, "No lane on road {} accepts maneuver {maneuver}", maneuver.direction())
            }
            Error::MissingApproach(direction) => {
                write!(f, "Intersection has no road {direction}")
            }
            Error::DuplicateApproach(direction) => {
                write!(f, "Road {direction} configured more than once")
            }
            Error::InvalidLayout(msg) => {
                write!(f, "Invalid layout: {msg}")
            }
            Error::InvalidCommand(msg) => {
                write!(f, "Invalid command: {msg}")
            }
            Error::SolverPrecondition(msg) => {
                write!(f, "Clique solver precondition violated: {msg}")
            }
            Error::LaneEmpty { road, lane } => {
                write!(f, "Lane {lane} on road {road} has no waiting vehicle")
            }
            Error::Json(err) => {
                write!(f, "JSON error: {err}")
            }
            Error::IoError(err) => {
                write!(f, "I/O error: {err}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            Error::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

/// Convenience result type for traffic-phase operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::maneuver::Maneuver;

    #[test]
    fn test_suggest_road_typos() {
        assert_eq!(suggest_road("nroth"), Some("north".to_string()));
        assert_eq!(suggest_road("souht"), Some("south".to_string()));
        assert_eq!(suggest_road("wset"), Some("west".to_string()));
        assert_eq!(suggest_road("eastt"), Some("east".to_string()));
    }

    #[test]
    fn test_suggest_road_no_match() {
        assert_eq!(suggest_road("north"), None);
        assert_eq!(suggest_road("NORTH"), None);
        assert_eq!(suggest_road("main-street-boulevard"), None);
        assert_eq!(suggest_road(""), None);
    }

    #[test]
    fn test_display_messages() {
        let err = Error::UnknownRoad {
            name: "nroth".to_string(),
            suggestion: Some("north".to_string()),
        };
        assert_eq!(err.to_string(), "Unknown road 'nroth' (did you mean 'north'?)");

        let err = Error::NoEligibleLane {
            maneuver: DirectedManeuver::new(Direction::West, Maneuver::Left),
        };
        assert_eq!(err.to_string(), "No lane on road WEST accepts maneuver WEST_LEFT");
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error as _;
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
        assert!(Error::MissingApproach(Direction::East).source().is_none());
    }
}
