//! Conflict graph over occupied directed maneuvers
//!
//! Vertices are addressed by [`DirectedManeuver::index`], so the whole graph
//! fits in twelve 16-bit adjacency masks and every set operation the clique
//! solver needs is a single bitwise instruction.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::maneuver::DirectedManeuver;

/// A set of directed maneuvers stored as a 12-bit mask
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ManeuverSet(u16);

impl ManeuverSet {
    const MASK: u16 = (1 << DirectedManeuver::COUNT) - 1;

    pub const EMPTY: ManeuverSet = ManeuverSet(0);

    pub const FULL: ManeuverSet = ManeuverSet(Self::MASK);

    /// Build from a raw mask; bits above the twelfth are dropped
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits & Self::MASK)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn contains(self, maneuver: DirectedManeuver) -> bool {
        self.0 & (1 << maneuver.index()) != 0
    }

    pub fn insert(&mut self, maneuver: DirectedManeuver) {
        self.0 |= 1 << maneuver.index();
    }

    pub fn remove(&mut self, maneuver: DirectedManeuver) {
        self.0 &= !(1 << maneuver.index());
    }

    #[must_use]
    pub const fn with(self, maneuver: DirectedManeuver) -> Self {
        Self(self.0 | (1 << maneuver.index()))
    }

    #[must_use]
    pub const fn intersection(self, other: ManeuverSet) -> Self {
        Self(self.0 & other.0)
    }

    #[must_use]
    pub const fn union(self, other: ManeuverSet) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn difference(self, other: ManeuverSet) -> Self {
        Self(self.0 & !other.0)
    }

    /// Members in index order
    pub fn iter(self) -> ManeuverSetIter {
        ManeuverSetIter(self.0)
    }
}

impl FromIterator<DirectedManeuver> for ManeuverSet {
    fn from_iter<I: IntoIterator<Item = DirectedManeuver>>(iter: I) -> Self {
        let mut set = ManeuverSet::EMPTY;
        for maneuver in iter {
            set.insert(maneuver);
        }
        set
    }
}

impl IntoIterator for ManeuverSet {
    type Item = DirectedManeuver;
    type IntoIter = ManeuverSetIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for ManeuverSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Iterator over set bits, lowest index first
pub struct ManeuverSetIter(u16);

impl Iterator for ManeuverSetIter {
    type Item = DirectedManeuver;

    fn next(&mut self) -> Option<DirectedManeuver> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        DirectedManeuver::from_index(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

/// A weighted graph vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vertex {
    pub maneuver: DirectedManeuver,
    pub weight: u32,
}

/// Undirected vertex-weighted graph with at most one vertex per maneuver
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictGraph {
    vertices: ManeuverSet,
    weights: [u32; DirectedManeuver::COUNT],
    adjacency: [ManeuverSet; DirectedManeuver::COUNT],
}

impl ConflictGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the scheduling graph from the current lane occupancy.
    ///
    /// One vertex per maneuver with at least one lane heading it, weighted by
    /// the number of such lanes. Two vertices are adjacent iff their
    /// maneuvers do not conflict.
    pub fn from_occupancy<L>(occupancy: &BTreeMap<DirectedManeuver, Vec<L>>) -> Self {
        let mut graph = Self::new();
        for (maneuver, lanes) in occupancy {
            if !lanes.is_empty() {
                graph.add_vertex(*maneuver, lanes.len() as u32);
            }
        }

        let occupied: Vec<DirectedManeuver> = graph.vertices.iter().collect();
        for (i, a) in occupied.iter().enumerate() {
            for b in &occupied[i + 1..] {
                if !a.conflicts(*b) {
                    graph.add_edge(*a, *b);
                }
            }
        }

        log::trace!(
            "conflict graph: {} vertices, {} edges",
            graph.vertex_count(),
            graph.edge_count()
        );
        graph
    }

    /// Add a vertex, replacing the weight if it already exists
    pub fn add_vertex(&mut self, maneuver: DirectedManeuver, weight: u32) {
        self.vertices.insert(maneuver);
        self.weights[maneuver.index()] = weight;
    }

    /// Add an undirected edge; missing endpoints are created with weight 0
    pub fn add_edge(&mut self, a: DirectedManeuver, b: DirectedManeuver) {
        if a == b {
            return;
        }
        self.vertices.insert(a);
        self.vertices.insert(b);
        self.adjacency[a.index()].insert(b);
        self.adjacency[b.index()].insert(a);
    }

    pub fn contains(&self, maneuver: DirectedManeuver) -> bool {
        self.vertices.contains(maneuver)
    }

    pub fn vertex_set(&self) -> ManeuverSet {
        self.vertices
    }

    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.vertices.iter().map(|maneuver| Vertex {
            maneuver,
            weight: self.weight(maneuver),
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.vertices
            .iter()
            .map(|m| self.adjacency[m.index()].len())
            .sum::<usize>()
            / 2
    }

    /// Weight of a vertex, 0 if absent
    pub fn weight(&self, maneuver: DirectedManeuver) -> u32 {
        if self.contains(maneuver) {
            self.weights[maneuver.index()]
        } else {
            0
        }
    }

    pub fn neighbours(&self, maneuver: DirectedManeuver) -> ManeuverSet {
        self.adjacency[maneuver.index()]
    }

    pub fn is_adjacent(&self, a: DirectedManeuver, b: DirectedManeuver) -> bool {
        self.adjacency[a.index()].contains(b)
    }

    /// Summed weight of the members of `set`
    pub fn total_weight(&self, set: ManeuverSet) -> u32 {
        set.iter().map(|m| self.weight(m)).sum()
    }

    /// True if `set` is made of graph vertices that are pairwise adjacent
    pub fn is_clique(&self, set: ManeuverSet) -> bool {
        if set.difference(self.vertices) != ManeuverSet::EMPTY {
            return false;
        }
        set.iter()
            .all(|m| set.difference(self.neighbours(m).with(m)).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::maneuver::{Direction, Maneuver};

    fn dm(direction: Direction, maneuver: Maneuver) -> DirectedManeuver {
        DirectedManeuver::new(direction, maneuver)
    }

    #[test]
    fn test_maneuver_set_operations() {
        let a = dm(Direction::North, Maneuver::Right);
        let b = dm(Direction::South, Maneuver::Left);
        let c = dm(Direction::West, Maneuver::Left);

        let mut set = ManeuverSet::EMPTY;
        assert!(set.is_empty());
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 2);
        assert!(set.contains(a));
        assert!(!set.contains(c));

        let other: ManeuverSet = [b, c].into_iter().collect();
        assert_eq!(set.intersection(other).iter().collect::<Vec<_>>(), vec![b]);
        assert_eq!(set.union(other).len(), 3);
        assert_eq!(set.difference(other).iter().collect::<Vec<_>>(), vec![a]);

        set.remove(a);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![b]);
        assert_eq!(ManeuverSet::FULL.len(), DirectedManeuver::COUNT);
        assert_eq!(ManeuverSet::from_bits(u16::MAX), ManeuverSet::FULL);
    }

    #[test]
    fn test_iteration_in_index_order() {
        let set: ManeuverSet = [
            DirectedManeuver::ALL[11],
            DirectedManeuver::ALL[0],
            DirectedManeuver::ALL[5],
        ]
        .into_iter()
        .collect();
        let indices: Vec<usize> = set.iter().map(DirectedManeuver::index).collect();
        assert_eq!(indices, vec![0, 5, 11]);
    }

    #[test]
    fn test_from_occupancy_weights_and_edges() {
        let north_straight = dm(Direction::North, Maneuver::Straight);
        let south_straight = dm(Direction::South, Maneuver::Straight);
        let east_straight = dm(Direction::East, Maneuver::Straight);

        let mut occupancy: BTreeMap<DirectedManeuver, Vec<usize>> = BTreeMap::new();
        occupancy.insert(north_straight, vec![0, 1]);
        occupancy.insert(south_straight, vec![2]);
        occupancy.insert(east_straight, vec![3]);
        occupancy.insert(dm(Direction::West, Maneuver::Left), vec![]);

        let graph = ConflictGraph::from_occupancy(&occupancy);
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.weight(north_straight), 2);
        assert_eq!(graph.weight(south_straight), 1);
        assert!(graph.is_adjacent(north_straight, south_straight));
        assert!(!graph.is_adjacent(north_straight, east_straight));
        assert!(!graph.is_adjacent(south_straight, east_straight));
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.neighbours(east_straight).is_empty());
    }

    #[test]
    fn test_from_occupancy_is_deterministic() {
        let mut occupancy: BTreeMap<DirectedManeuver, Vec<u8>> = BTreeMap::new();
        for (i, m) in DirectedManeuver::ALL.iter().enumerate() {
            occupancy.insert(*m, vec![0; i % 3 + 1]);
        }
        let first = ConflictGraph::from_occupancy(&occupancy);
        let second = ConflictGraph::from_occupancy(&occupancy);
        assert_eq!(first, second);
        assert_eq!(first.vertex_count(), 12);

        for a in DirectedManeuver::ALL {
            for b in DirectedManeuver::ALL {
                if a != b {
                    assert_eq!(first.is_adjacent(a, b), !a.conflicts(b));
                }
            }
        }
    }

    #[test]
    fn test_is_clique() {
        let a = DirectedManeuver::ALL[0];
        let b = DirectedManeuver::ALL[1];
        let c = DirectedManeuver::ALL[2];
        let mut graph = ConflictGraph::new();
        graph.add_vertex(a, 1);
        graph.add_vertex(b, 1);
        graph.add_vertex(c, 1);
        graph.add_edge(a, b);
        graph.add_edge(b, c);

        assert!(graph.is_clique(ManeuverSet::EMPTY));
        assert!(graph.is_clique([a].into_iter().collect()));
        assert!(graph.is_clique([a, b].into_iter().collect()));
        assert!(!graph.is_clique([a, b, c].into_iter().collect()));
        assert!(!graph.is_clique([DirectedManeuver::ALL[7]].into_iter().collect()));
    }

    #[test]
    fn test_add_edge_ignores_self_loops() {
        let a = DirectedManeuver::ALL[3];
        let mut graph = ConflictGraph::new();
        graph.add_edge(a, a);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.neighbours(a).is_empty());
    }
}
