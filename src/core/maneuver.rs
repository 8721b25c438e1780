//! Approach directions, turning maneuvers and the conflict predicate
//!
//! A [`DirectedManeuver`] is the atomic unit the scheduler reasons about: the
//! road a vehicle arrives from plus the turn it intends to make. There are
//! exactly twelve of them, each with a stable index in `0..12` that the
//! conflict graph uses as its vertex id.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::{suggest_road, Error, Result};

/// Road from which traffic arrives, in clockwise order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Number of approaches around the intersection
    pub const COUNT: usize = 4;

    /// All directions in cyclic order
    pub const ALL: [Direction; Direction::COUNT] =
        [Direction::North, Direction::East, Direction::South, Direction::West];

    /// Position in the cyclic order
    pub const fn ordinal(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    /// Direction at a cyclic position (taken modulo 4)
    pub const fn from_ordinal(ordinal: usize) -> Direction {
        Direction::ALL[ordinal % Direction::COUNT]
    }

    /// The road two steps ahead cyclically
    pub const fn opposite(self) -> Direction {
        Direction::from_ordinal(self.ordinal() + 2)
    }

    /// The road immediately following this one cyclically
    pub const fn successor(self) -> Direction {
        Direction::from_ordinal(self.ordinal() + 1)
    }

    /// The road immediately preceding this one cyclically
    pub const fn predecessor(self) -> Direction {
        Direction::from_ordinal(self.ordinal() + Direction::COUNT - 1)
    }

    /// True if `other` immediately precedes `self` cyclically
    pub fn is_predecessor(self, other: Direction) -> bool {
        self.predecessor() == other
    }

    /// Lower-case road name used by the command format
    pub fn road_name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }

    /// Parse a road name (case-insensitive)
    pub fn from_road_name(name: &str) -> Result<Direction> {
        let lowered = name.trim().to_lowercase();
        Direction::ALL
            .into_iter()
            .find(|d| d.road_name() == lowered)
            .ok_or_else(|| Error::UnknownRoad {
                name: name.to_string(),
                suggestion: suggest_road(name),
            })
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "NORTH",
            Direction::East => "EAST",
            Direction::South => "SOUTH",
            Direction::West => "WEST",
        };
        f.write_str(name)
    }
}

/// Turning intent relative to the approach road
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Maneuver {
    Right,
    Straight,
    Left,
}

impl Maneuver {
    pub const COUNT: usize = 3;

    pub const ALL: [Maneuver; Maneuver::COUNT] =
        [Maneuver::Right, Maneuver::Straight, Maneuver::Left];

    pub const fn ordinal(self) -> usize {
        match self {
            Maneuver::Right => 0,
            Maneuver::Straight => 1,
            Maneuver::Left => 2,
        }
    }
}

impl fmt::Display for Maneuver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Maneuver::Right => "RIGHT",
            Maneuver::Straight => "STRAIGHT",
            Maneuver::Left => "LEFT",
        };
        f.write_str(name)
    }
}

/// An (approach, maneuver) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DirectedManeuver {
    direction: Direction,
    maneuver: Maneuver,
}

impl DirectedManeuver {
    /// Number of distinct directed maneuvers
    pub const COUNT: usize = Direction::COUNT * Maneuver::COUNT;

    /// Every directed maneuver, laid out so that `ALL[i].index() == i`
    pub const ALL: [DirectedManeuver; DirectedManeuver::COUNT] = {
        let mut all = [DirectedManeuver::new(Direction::North, Maneuver::Right); DirectedManeuver::COUNT];
        let mut i = 0;
        while i < DirectedManeuver::COUNT {
            all[i] = DirectedManeuver::new(
                Direction::ALL[i / Maneuver::COUNT],
                Maneuver::ALL[i % Maneuver::COUNT],
            );
            i += 1;
        }
        all
    };

    pub const fn new(direction: Direction, maneuver: Maneuver) -> Self {
        Self { direction, maneuver }
    }

    pub const fn direction(self) -> Direction {
        self.direction
    }

    pub const fn maneuver(self) -> Maneuver {
        self.maneuver
    }

    /// Canonical index: `direction * 3 + maneuver`
    pub const fn index(self) -> usize {
        self.direction.ordinal() * Maneuver::COUNT + self.maneuver.ordinal()
    }

    pub fn from_index(index: usize) -> Option<DirectedManeuver> {
        DirectedManeuver::ALL.get(index).copied()
    }

    /// Resolve the maneuver of a vehicle arriving on `start` and leaving
    /// towards `end`.
    ///
    /// Right turns exit onto the predecessor road, left turns onto the
    /// successor, straight-through onto the opposite road. An identical
    /// origin and destination is rejected rather than guessed.
    pub fn from_roads(start: &str, end: &str) -> Result<DirectedManeuver> {
        let from = Direction::from_road_name(start)?;
        let to = Direction::from_road_name(end)?;

        let maneuver = if to == from.predecessor() {
            Maneuver::Right
        } else if to == from.opposite() {
            Maneuver::Straight
        } else if to == from.successor() {
            Maneuver::Left
        } else {
            return Err(Error::MalformedManeuver {
                start: start.to_string(),
                end: end.to_string(),
            });
        };

        Ok(DirectedManeuver::new(from, maneuver))
    }

    /// Road a vehicle performing this maneuver exits onto
    pub fn exit_road(self) -> Direction {
        match self.maneuver {
            Maneuver::Right => self.direction.predecessor(),
            Maneuver::Straight => self.direction.opposite(),
            Maneuver::Left => self.direction.successor(),
        }
    }

    /// True if both maneuvers cannot be released in the same phase.
    ///
    /// Rules, in priority order:
    /// 1. same approach never conflicts;
    /// 2. opposite approaches conflict iff exactly one turns left;
    /// 3. adjacent approaches: with `previous` the road whose successor is
    ///    `next`, conflict iff `next` goes straight, or `next` turns left
    ///    while `previous` does not turn right.
    ///
    /// Validated only for four evenly spaced approaches.
    pub fn conflicts(self, other: DirectedManeuver) -> bool {
        if self.direction == other.direction {
            return false;
        }

        if self.direction.opposite() == other.direction {
            return (self.maneuver == Maneuver::Left) != (other.maneuver == Maneuver::Left);
        }

        let (previous, next) = if self.direction.is_predecessor(other.direction) {
            (other, self)
        } else {
            (self, other)
        };

        match next.maneuver {
            Maneuver::Straight => true,
            Maneuver::Left => previous.maneuver != Maneuver::Right,
            Maneuver::Right => false,
        }
    }
}

impl fmt::Display for DirectedManeuver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.direction, self.maneuver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::*;
    use Maneuver::*;

    fn dm(direction: Direction, maneuver: Maneuver) -> DirectedManeuver {
        DirectedManeuver::new(direction, maneuver)
    }

    #[test]
    fn test_direction_cycle() {
        assert_eq!(North.opposite(), South);
        assert_eq!(East.opposite(), West);
        assert_eq!(West.successor(), North);
        assert_eq!(North.predecessor(), West);
        assert!(North.is_predecessor(West));
        assert!(East.is_predecessor(North));
        assert!(!North.is_predecessor(East));
        assert_eq!(Direction::from_ordinal(6), South);
    }

    #[test]
    fn test_index_table_is_explicit() {
        for (i, m) in DirectedManeuver::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
            assert_eq!(DirectedManeuver::from_index(i), Some(*m));
        }
        assert_eq!(dm(North, Right).index(), 0);
        assert_eq!(dm(East, Straight).index(), 4);
        assert_eq!(dm(West, Left).index(), 11);
        assert_eq!(DirectedManeuver::from_index(12), None);
    }

    #[test]
    fn test_from_roads_valid() {
        let cases = [
            ("north", "west", dm(North, Right)),
            ("north", "south", dm(North, Straight)),
            ("north", "east", dm(North, Left)),
            ("east", "north", dm(East, Right)),
            ("east", "west", dm(East, Straight)),
            ("east", "south", dm(East, Left)),
            ("south", "east", dm(South, Right)),
            ("south", "north", dm(South, Straight)),
            ("south", "west", dm(South, Left)),
            ("west", "south", dm(West, Right)),
            ("west", "east", dm(West, Straight)),
            ("west", "north", dm(West, Left)),
        ];
        for (start, end, expected) in cases {
            let m = DirectedManeuver::from_roads(start, end).unwrap();
            assert_eq!(m, expected, "{start} -> {end}");
            assert_eq!(m.exit_road().road_name(), end);
        }
    }

    #[test]
    fn test_from_roads_invalid() {
        assert!(matches!(
            DirectedManeuver::from_roads("north", "north"),
            Err(Error::MalformedManeuver { .. })
        ));
        assert!(matches!(
            DirectedManeuver::from_roads("north", "invalid"),
            Err(Error::UnknownRoad { .. })
        ));
        assert!(matches!(
            DirectedManeuver::from_roads("invalid", "west"),
            Err(Error::UnknownRoad { .. })
        ));
        assert_eq!(DirectedManeuver::from_roads("North", "SOUTH").unwrap(), dm(North, Straight));
    }

    #[test]
    fn test_same_direction_never_conflicts() {
        for a in DirectedManeuver::ALL {
            for b in DirectedManeuver::ALL {
                if a.direction() == b.direction() {
                    assert!(!a.conflicts(b), "{a} vs {b}");
                }
            }
        }
    }

    #[test]
    fn test_opposite_conflicts_iff_exactly_one_left() {
        for a in DirectedManeuver::ALL {
            for b in DirectedManeuver::ALL {
                if a.direction().opposite() == b.direction() {
                    let one_left = (a.maneuver() == Left) ^ (b.maneuver() == Left);
                    assert_eq!(a.conflicts(b), one_left, "{a} vs {b}");
                }
            }
        }
    }

    #[test]
    fn test_conflicts_symmetric() {
        for a in DirectedManeuver::ALL {
            for b in DirectedManeuver::ALL {
                assert_eq!(a.conflicts(b), b.conflicts(a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_opposite_directions() {
        assert!(dm(North, Left).conflicts(dm(South, Right)));
        assert!(!dm(South, Right).conflicts(dm(North, Right)));
        assert!(!dm(South, Right).conflicts(dm(North, Straight)));
        assert!(dm(South, Left).conflicts(dm(North, Straight)));
        assert!(!dm(South, Left).conflicts(dm(North, Left)));
        assert!(!dm(South, Straight).conflicts(dm(North, Straight)));
    }

    #[test]
    fn test_adjacent_directions() {
        // turn right
        assert!(!dm(South, Right).conflicts(dm(East, Left)));
        assert!(!dm(South, Right).conflicts(dm(East, Right)));
        assert!(!dm(South, Right).conflicts(dm(East, Straight)));
        assert!(!dm(South, Right).conflicts(dm(West, Left)));
        assert!(!dm(South, Right).conflicts(dm(West, Right)));
        assert!(dm(South, Right).conflicts(dm(West, Straight)));

        // turn left
        assert!(dm(South, Left).conflicts(dm(East, Left)));
        assert!(!dm(South, Left).conflicts(dm(East, Right)));
        assert!(dm(South, Left).conflicts(dm(East, Straight)));
        assert!(dm(South, Left).conflicts(dm(West, Left)));
        assert!(!dm(South, Left).conflicts(dm(West, Right)));
        assert!(dm(South, Left).conflicts(dm(West, Straight)));

        // go straight
        assert!(dm(South, Straight).conflicts(dm(East, Left)));
        assert!(dm(South, Straight).conflicts(dm(East, Right)));
        assert!(dm(South, Straight).conflicts(dm(East, Straight)));
        assert!(dm(South, Straight).conflicts(dm(West, Left)));
        assert!(!dm(South, Straight).conflicts(dm(West, Right)));
        assert!(dm(South, Straight).conflicts(dm(West, Straight)));
    }

    #[test]
    fn test_display() {
        assert_eq!(dm(North, Straight).to_string(), "NORTH_STRAIGHT");
        assert_eq!(South.to_string(), "SOUTH");
    }
}
