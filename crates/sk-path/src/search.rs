//! Path-search trait and the stock search algorithms.
//!
//! # Pluggability
//!
//! Navigators call search via the [`PathSearch`] trait, so hosts can swap in
//! their own implementation (hierarchical search, flow fields, …) without
//! touching the path-following behaviors.
//!
//! | Search          | Optimal for            | Notes                                 |
//! |-----------------|------------------------|---------------------------------------|
//! | [`Dijkstra`]    | edge cost              | baseline                              |
//! | [`AStar`]       | edge cost              | Euclidean heuristic; needs costs ≥ length |
//! | [`BreadthFirst`]| edge count             | ignores costs                         |
//! | [`DepthFirst`]  | nothing                | first path found, in edge order       |

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};

use sk_core::{EdgeId, NodeId, Vec2};

use crate::graph::NavGraph;
use crate::{PathError, PathResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a search: the visited nodes in order and the summed cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Nodes from source to destination inclusive.
    pub nodes: Vec<NodeId>,
    /// Edges between consecutive `nodes`.
    pub edges: Vec<EdgeId>,
    pub cost: f32,
}

impl Route {
    /// `true` if source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    /// World positions of the route's nodes.
    pub fn waypoints(&self, graph: &NavGraph) -> Vec<Vec2> {
        self.nodes.iter().map(|n| graph.node_pos[n.index()]).collect()
    }
}

// ── PathSearch trait ──────────────────────────────────────────────────────────

/// Pluggable graph search.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so a navigator can be shared across
/// rayon workers during a parallel steering pass.
pub trait PathSearch: Send + Sync {
    /// Find a route from `from` to `to`.
    ///
    /// `from == to` yields a trivial route rather than an error.
    fn search(&self, graph: &NavGraph, from: NodeId, to: NodeId) -> PathResult<Route>;

    fn name(&self) -> &'static str;
}

// ── Cost ordering ─────────────────────────────────────────────────────────────

/// `f32` with a total order so it can key a `BinaryHeap`.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Cost(f32);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

/// Standard Dijkstra over the CSR graph using `edge_cost`.
pub struct Dijkstra;

impl PathSearch for Dijkstra {
    fn search(&self, graph: &NavGraph, from: NodeId, to: NodeId) -> PathResult<Route> {
        best_first(graph, from, to, |_| 0.0)
    }

    fn name(&self) -> &'static str {
        "dijkstra"
    }
}

// ── A* ────────────────────────────────────────────────────────────────────────

/// A* with a straight-line heuristic scaled by `heuristic_weight`.
///
/// With weight `1.0` the result is optimal as long as every edge costs at
/// least its Euclidean length (the default for builder links and tile grids).
/// Weights above `1.0` trade optimality for fewer expansions.
pub struct AStar {
    pub heuristic_weight: f32,
}

impl Default for AStar {
    fn default() -> Self {
        Self { heuristic_weight: 1.0 }
    }
}

impl PathSearch for AStar {
    fn search(&self, graph: &NavGraph, from: NodeId, to: NodeId) -> PathResult<Route> {
        graph.check(to)?;
        let goal = graph.node_pos[to.index()];
        let w = self.heuristic_weight.max(0.0);
        best_first(graph, from, to, |n| graph.node_pos[n.index()].distance(goal) * w)
    }

    fn name(&self) -> &'static str {
        "a-star"
    }
}

/// Shared Dijkstra/A* loop; `heuristic` returning 0 gives plain Dijkstra.
fn best_first(
    graph: &NavGraph,
    from: NodeId,
    to: NodeId,
    heuristic: impl Fn(NodeId) -> f32,
) -> PathResult<Route> {
    graph.check(from)?;
    graph.check(to)?;
    if from == to {
        return Ok(Route { nodes: vec![from], edges: vec![], cost: 0.0 });
    }

    let n = graph.node_count();
    // dist[v] = best known cost to reach v.
    let mut dist      = vec![f32::INFINITY; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];
    let mut closed    = vec![false; n];

    dist[from.index()] = 0.0;

    // Min-heap on (estimated total, node).  NodeId breaks ties deterministically.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(heuristic(from)), from)));

    while let Some(Reverse((_, node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(graph, &prev_edge, from, to, dist[to.index()]));
        }
        // Skip stale heap entries.
        if closed[node.index()] {
            continue;
        }
        closed[node.index()] = true;

        let cost = dist[node.index()];
        for edge in graph.out_edges(node) {
            let neighbor = graph.edge_to[edge.index()];
            let new_cost = cost + graph.edge_cost[edge.index()];
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((Cost(new_cost + heuristic(neighbor)), neighbor)));
            }
        }
    }

    Err(PathError::NoPath { from, to })
}

// ── Breadth-first ─────────────────────────────────────────────────────────────

/// Fewest-edges search; edge costs are summed for the report but not used to
/// choose the route.
pub struct BreadthFirst;

impl PathSearch for BreadthFirst {
    fn search(&self, graph: &NavGraph, from: NodeId, to: NodeId) -> PathResult<Route> {
        graph.check(from)?;
        graph.check(to)?;
        if from == to {
            return Ok(Route { nodes: vec![from], edges: vec![], cost: 0.0 });
        }

        let mut prev_edge = vec![EdgeId::INVALID; graph.node_count()];
        let mut seen = vec![false; graph.node_count()];
        seen[from.index()] = true;
        let mut queue = VecDeque::from([from]);

        while let Some(node) = queue.pop_front() {
            for edge in graph.out_edges(node) {
                let neighbor = graph.edge_to[edge.index()];
                if seen[neighbor.index()] {
                    continue;
                }
                seen[neighbor.index()] = true;
                prev_edge[neighbor.index()] = edge;
                if neighbor == to {
                    return Ok(reconstruct_summed(graph, &prev_edge, from, to));
                }
                queue.push_back(neighbor);
            }
        }
        Err(PathError::NoPath { from, to })
    }

    fn name(&self) -> &'static str {
        "breadth-first"
    }
}

// ── Depth-first ───────────────────────────────────────────────────────────────

/// Iterative depth-first search.  Returns the first route found, exploring
/// each node's edges in the order they were added to the builder.
pub struct DepthFirst;

impl PathSearch for DepthFirst {
    fn search(&self, graph: &NavGraph, from: NodeId, to: NodeId) -> PathResult<Route> {
        graph.check(from)?;
        graph.check(to)?;
        if from == to {
            return Ok(Route { nodes: vec![from], edges: vec![], cost: 0.0 });
        }

        let mut prev_edge = vec![EdgeId::INVALID; graph.node_count()];
        let mut seen = vec![false; graph.node_count()];
        seen[from.index()] = true;
        // Stack of (node, next out-edge offset) so edges are tried in order.
        let mut stack: Vec<(NodeId, usize)> = vec![(from, 0)];

        while let Some(top) = stack.last_mut() {
            let (node, offset) = *top;
            let Some(edge) = graph.out_edges(node).nth(offset) else {
                stack.pop();
                continue;
            };
            top.1 += 1;
            let neighbor = graph.edge_to[edge.index()];
            if seen[neighbor.index()] {
                continue;
            }
            seen[neighbor.index()] = true;
            prev_edge[neighbor.index()] = edge;
            if neighbor == to {
                return Ok(reconstruct_summed(graph, &prev_edge, from, to));
            }
            stack.push((neighbor, 0));
        }
        Err(PathError::NoPath { from, to })
    }

    fn name(&self) -> &'static str {
        "depth-first"
    }
}

// ── Route reconstruction ──────────────────────────────────────────────────────

fn reconstruct(graph: &NavGraph, prev_edge: &[EdgeId], from: NodeId, to: NodeId, cost: f32) -> Route {
    let mut edges = Vec::new();
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        if e == EdgeId::INVALID {
            break;
        }
        edges.push(e);
        cur = graph.edge_from[e.index()];
    }
    edges.reverse();

    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(from);
    nodes.extend(edges.iter().map(|e| graph.edge_to[e.index()]));
    Route { nodes, edges, cost }
}

fn reconstruct_summed(graph: &NavGraph, prev_edge: &[EdgeId], from: NodeId, to: NodeId) -> Route {
    let mut route = reconstruct(graph, prev_edge, from, to, 0.0);
    route.cost = route.edges.iter().map(|e| graph.edge_cost[e.index()]).sum();
    route
}
