//! Maximum vertex-weighted clique search
//!
//! Bron–Kerbosch with pivoting plus branch-and-bound, run over the bitset
//! representation of [`ConflictGraph`]. Every recursion level receives its
//! `R`, `P` and `X` sets by value, so a recorded best clique can never be
//! disturbed by later work on the same level.
//!
//! A branch is abandoned when `weight(R) + weight(P)` cannot beat the best
//! clique found so far. The summed weight of `P` is an over-estimate of any
//! extension of `R`, which keeps the pruning sound: the optimum is always
//! reached.

use crate::core::error::{Error, Result};
use crate::core::graph::{ConflictGraph, ManeuverSet, Vertex};
use crate::core::maneuver::DirectedManeuver;

/// A clique and its summed weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Clique {
    pub members: ManeuverSet,
    pub weight: u32,
}

impl Clique {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, maneuver: DirectedManeuver) -> bool {
        self.members.contains(maneuver)
    }

    /// Members paired with their weights in `graph`, in index order
    pub fn vertices<'g>(&self, graph: &'g ConflictGraph) -> impl Iterator<Item = Vertex> + 'g {
        self.members.iter().map(move |maneuver| Vertex {
            maneuver,
            weight: graph.weight(maneuver),
        })
    }
}

/// Search statistics, reported at trace level
#[derive(Debug, Clone, Copy, Default)]
struct SearchStats {
    calls: u32,
    pruned: u32,
    maximal_cliques: u32,
}

/// Weighted Bron–Kerbosch solver bound to one graph
pub struct WeightedBronKerbosch<'g> {
    graph: &'g ConflictGraph,
    best: Option<Clique>,
    stats: SearchStats,
}

impl<'g> WeightedBronKerbosch<'g> {
    pub fn new(graph: &'g ConflictGraph) -> Self {
        Self {
            graph,
            best: None,
            stats: SearchStats::default(),
        }
    }

    /// Run the search and return a clique of maximum total weight.
    ///
    /// An empty graph yields the empty clique.
    pub fn find_maximum_weight_clique(mut self) -> Result<Clique> {
        let prospective = self.graph.vertex_set();
        self.expand(ManeuverSet::EMPTY, prospective, ManeuverSet::EMPTY)?;

        log::trace!(
            "clique search: {} calls, {} pruned, {} maximal cliques",
            self.stats.calls,
            self.stats.pruned,
            self.stats.maximal_cliques
        );

        Ok(self.best.unwrap_or_default())
    }

    fn best_weight(&self) -> Option<u32> {
        self.best.map(|clique| clique.weight)
    }

    fn expand(
        &mut self,
        current: ManeuverSet,
        mut prospective: ManeuverSet,
        mut excluded: ManeuverSet,
    ) -> Result<()> {
        self.stats.calls += 1;

        if prospective.is_empty() && excluded.is_empty() {
            self.stats.maximal_cliques += 1;
            let weight = self.graph.total_weight(current);
            if self.best_weight().map_or(true, |best| weight > best) {
                self.best = Some(Clique {
                    members: current,
                    weight,
                });
            }
            return Ok(());
        }

        if prospective.is_empty() {
            return Ok(());
        }

        let bound = self.graph.total_weight(current) + self.upper_bound(prospective);
        if self.best_weight().is_some_and(|best| bound <= best) {
            self.stats.pruned += 1;
            return Ok(());
        }

        let pivot = self.choose_pivot(prospective)?;
        let candidates = prospective
            .difference(self.graph.neighbours(pivot))
            .with(pivot);

        for vertex in candidates {
            let neighbours = self.graph.neighbours(vertex);
            self.expand(
                current.with(vertex),
                prospective.intersection(neighbours),
                excluded.intersection(neighbours),
            )?;
            prospective.remove(vertex);
            excluded.insert(vertex);
        }

        Ok(())
    }

    /// Over-estimate of the weight any subset of `prospective` can add
    fn upper_bound(&self, prospective: ManeuverSet) -> u32 {
        self.graph.total_weight(prospective)
    }

    /// Heaviest vertex of `prospective`; lowest index wins ties
    fn choose_pivot(&self, prospective: ManeuverSet) -> Result<DirectedManeuver> {
        let mut pivot: Option<(DirectedManeuver, u32)> = None;
        for maneuver in prospective {
            let weight = self.graph.weight(maneuver);
            if pivot.map_or(true, |(_, best)| weight > best) {
                pivot = Some((maneuver, weight));
            }
        }
        pivot
            .map(|(maneuver, _)| maneuver)
            .ok_or(Error::SolverPrecondition("pivot requested from an empty prospective set"))
    }
}

/// Maximum-weight clique of `graph`
pub fn solve(graph: &ConflictGraph) -> Result<Clique> {
    WeightedBronKerbosch::new(graph).find_maximum_weight_clique()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::maneuver::{Direction, Maneuver};

    fn dm(direction: Direction, maneuver: Maneuver) -> DirectedManeuver {
        DirectedManeuver::new(direction, maneuver)
    }

    fn set(members: &[DirectedManeuver]) -> ManeuverSet {
        members.iter().copied().collect()
    }

    #[test]
    fn test_all_vertices_in_clique() {
        let v1 = dm(Direction::South, Maneuver::Right);
        let v2 = dm(Direction::East, Maneuver::Right);
        let v3 = dm(Direction::North, Maneuver::Right);
        let v4 = dm(Direction::West, Maneuver::Right);

        let mut graph = ConflictGraph::new();
        graph.add_vertex(v1, 1);
        graph.add_vertex(v2, 2);
        graph.add_vertex(v3, 3);
        graph.add_vertex(v4, 4);
        graph.add_edge(v1, v2);
        graph.add_edge(v2, v3);
        graph.add_edge(v3, v4);
        graph.add_edge(v4, v1);
        graph.add_edge(v1, v3);
        graph.add_edge(v2, v4);

        let clique = solve(&graph).unwrap();
        assert_eq!(clique.members, set(&[v1, v2, v3, v4]));
        assert_eq!(clique.weight, 10);
    }

    #[test]
    fn test_heaviest_clique_is_not_the_largest() {
        let v1 = dm(Direction::South, Maneuver::Right);
        let v2 = dm(Direction::East, Maneuver::Right);
        let v3 = dm(Direction::North, Maneuver::Right);
        let v4 = dm(Direction::West, Maneuver::Right);
        let v5 = dm(Direction::North, Maneuver::Straight);

        let mut graph = ConflictGraph::new();
        graph.add_vertex(v1, 3);
        graph.add_vertex(v2, 100);
        graph.add_vertex(v3, 2);
        graph.add_vertex(v4, 1);
        graph.add_vertex(v5, 2);
        graph.add_edge(v1, v3);
        graph.add_edge(v1, v4);
        graph.add_edge(v1, v5);
        graph.add_edge(v2, v3);
        graph.add_edge(v4, v5);

        let clique = solve(&graph).unwrap();
        assert_eq!(clique.members, set(&[v2, v3]));
        assert_eq!(clique.weight, 102);
    }

    #[test]
    fn test_empty_graph() {
        let graph = ConflictGraph::new();
        let clique = solve(&graph).unwrap();
        assert!(clique.is_empty());
        assert_eq!(clique.weight, 0);
    }

    #[test]
    fn test_single_vertex() {
        let v1 = dm(Direction::West, Maneuver::Right);
        let mut graph = ConflictGraph::new();
        graph.add_vertex(v1, 1);

        let clique = solve(&graph).unwrap();
        assert_eq!(clique.members, set(&[v1]));
    }

    #[test]
    fn test_disconnected_graph_picks_heaviest_vertex() {
        let mut graph = ConflictGraph::new();
        graph.add_vertex(dm(Direction::West, Maneuver::Right), 1);
        graph.add_vertex(dm(Direction::North, Maneuver::Right), 2);
        graph.add_vertex(dm(Direction::South, Maneuver::Right), 3);
        graph.add_vertex(dm(Direction::East, Maneuver::Right), 4);

        let clique = solve(&graph).unwrap();
        assert_eq!(clique.members, set(&[dm(Direction::East, Maneuver::Right)]));
        assert_eq!(clique.weight, 4);
    }

    #[test]
    fn test_light_triangle_beats_heavy_isolated_vertex() {
        // Bounding by the heaviest single prospective vertex would prune the
        // triangle after the isolated vertex is recorded.
        let heavy = dm(Direction::North, Maneuver::Right);
        let a = dm(Direction::East, Maneuver::Right);
        let b = dm(Direction::South, Maneuver::Right);
        let c = dm(Direction::West, Maneuver::Right);

        let mut graph = ConflictGraph::new();
        graph.add_vertex(heavy, 5);
        graph.add_vertex(a, 2);
        graph.add_vertex(b, 2);
        graph.add_vertex(c, 2);
        graph.add_edge(a, b);
        graph.add_edge(b, c);
        graph.add_edge(a, c);

        let clique = solve(&graph).unwrap();
        assert_eq!(clique.members, set(&[a, b, c]));
        assert_eq!(clique.weight, 6);
    }

    #[test]
    fn test_pivot_on_empty_set_is_rejected() {
        let graph = ConflictGraph::new();
        let solver = WeightedBronKerbosch::new(&graph);
        assert!(matches!(
            solver.choose_pivot(ManeuverSet::EMPTY),
            Err(Error::SolverPrecondition(_))
        ));
    }

    #[test]
    fn test_pivot_is_heaviest() {
        let mut graph = ConflictGraph::new();
        graph.add_vertex(DirectedManeuver::ALL[2], 4);
        graph.add_vertex(DirectedManeuver::ALL[5], 9);
        graph.add_vertex(DirectedManeuver::ALL[7], 9);
        let solver = WeightedBronKerbosch::new(&graph);
        assert_eq!(
            solver.choose_pivot(graph.vertex_set()).unwrap(),
            DirectedManeuver::ALL[5]
        );
    }

    #[test]
    fn test_clique_vertices_report_weights() {
        let mut graph = ConflictGraph::new();
        let a = DirectedManeuver::ALL[1];
        let b = DirectedManeuver::ALL[4];
        graph.add_vertex(a, 3);
        graph.add_vertex(b, 1);
        graph.add_edge(a, b);

        let clique = solve(&graph).unwrap();
        let vertices: Vec<Vertex> = clique.vertices(&graph).collect();
        assert_eq!(
            vertices,
            vec![
                Vertex { maneuver: a, weight: 3 },
                Vertex { maneuver: b, weight: 1 },
            ]
        );
        assert!(graph.is_clique(clique.members));
    }
}
