//! Navigation graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_cost`) are sorted by source
//! node and indexed by `EdgeId`, so a node's neighbors are a contiguous scan.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps world positions to the nearest `NodeId`.
//! Used to snap an agent's position and its goal onto the graph.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use sk_core::{EdgeId, NodeId, Vec2};

use crate::{PathError, PathResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f32; 2],
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── NavGraph ──────────────────────────────────────────────────────────────────

/// Directed navigation graph in CSR format plus a spatial index for snapping.
///
/// All fields are `pub` for direct indexed access in search inner loops.  Do
/// not construct directly; use [`NavGraphBuilder`] or [`TileGrid`].
pub struct NavGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    /// World position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<Vec2>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    /// Source node of each edge, used to trace routes backwards.
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,
    /// Non-negative traversal cost.  Defaults to the Euclidean length.
    pub edge_cost: Vec<f32>,

    spatial_idx: RTree<NodeEntry>,
}

impl NavGraph {
    /// A graph with no nodes; every search against it fails.
    pub fn empty() -> Self {
        NavGraphBuilder::new().build()
    }

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    /// Position of `node`, or `NodeNotFound`.
    pub fn position(&self, node: NodeId) -> PathResult<Vec2> {
        self.node_pos.get(node.index()).copied().ok_or(PathError::NodeNotFound(node))
    }

    pub(crate) fn check(&self, node: NodeId) -> PathResult<()> {
        if node.index() < self.node_count() { Ok(()) } else { Err(PathError::NodeNotFound(node)) }
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// CSR slice of `node`'s outgoing edges; empty for an unknown node.
    fn edge_range(&self, node: NodeId) -> std::ops::Range<usize> {
        let i = node.index();
        match (self.node_out_start.get(i), self.node_out_start.get(i + 1)) {
            (Some(&start), Some(&end)) => start as usize..end as usize,
            _ => 0..0,
        }
    }

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    /// Yields nothing for a node that is not in the graph.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.edge_range(node).map(|i| EdgeId(i as u32))
    }

    /// Zero for a node that is not in the graph.
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.edge_range(node).len()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nearest node to `pos`.  `None` only if the graph has no nodes.
    pub fn snap_to_node(&self, pos: Vec2) -> Option<NodeId> {
        self.spatial_idx.nearest_neighbor(&[pos.x, pos.y]).map(|e| e.id)
    }

    /// Up to `k` nearest nodes to `pos`, by ascending distance.
    pub fn k_nearest_nodes(&self, pos: Vec2, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.x, pos.y])
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

// ── NavGraphBuilder ───────────────────────────────────────────────────────────

/// Construct a [`NavGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use sk_core::Vec2;
/// use sk_path::NavGraphBuilder;
///
/// let mut b = NavGraphBuilder::new();
/// let a = b.add_node(Vec2::new(0.0, 0.0));
/// let c = b.add_node(Vec2::new(30.0, 40.0));
/// b.add_link(a, c); // cost = 50, both directions
/// let graph = b.build();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 2);
/// ```
pub struct NavGraphBuilder {
    nodes:     Vec<Vec2>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from: NodeId,
    to:   NodeId,
    cost: f32,
}

impl NavGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_edges: Vec::new() }
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Vec2) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add a **directed** edge with an explicit cost (negative costs are
    /// clamped to zero).
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, cost: f32) {
        self.raw_edges.push(RawEdge { from, to, cost: cost.max(0.0) });
    }

    /// Add edges in both directions costed by Euclidean distance.
    pub fn add_link(&mut self, a: NodeId, b: NodeId) {
        let cost = self.nodes[a.index()].distance(self.nodes[b.index()]);
        self.add_link_with_cost(a, b, cost);
    }

    pub fn add_link_with_cost(&mut self, a: NodeId, b: NodeId, cost: f32) {
        self.add_edge(a, b, cost);
        self.add_edge(b, a, cost);
    }

    pub fn node_pos(&self, id: NodeId) -> Vec2 {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`NavGraph`].
    ///
    /// O(E log E) for the edge sort + O(N log N) for the R-tree bulk load.
    pub fn build(self) -> NavGraph {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // Stable sort keeps insertion order among a node's edges, which makes
        // depth-first and breadth-first expansion order predictable.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from: Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to:   Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_cost: Vec<f32>    = raw.iter().map(|e| e.cost).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry {
                point: [pos.x, pos.y],
                id:    NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        NavGraph {
            node_pos: self.nodes,
            node_out_start,
            edge_from,
            edge_to,
            edge_cost,
            spatial_idx,
        }
    }
}

impl Default for NavGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ── TileGrid ──────────────────────────────────────────────────────────────────

/// A rectangular tile map converted into a [`NavGraph`].
///
/// Each open cell becomes a node at the cell's center; blocked cells get no
/// node.  Cells are linked to their open 4-neighbors, plus diagonal neighbors
/// when `diagonal` is set (a diagonal is only linked if both orthogonal cells
/// it cuts past are open, so paths never clip a blocked corner).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileGrid {
    /// World position of the minimum corner of cell `(0, 0)`.
    pub origin: Vec2,
    pub cell_size: f32,
    pub columns: u32,
    pub rows: u32,
    /// Row-major; `blocked[row * columns + col]`.
    pub blocked: Vec<bool>,
    pub diagonal: bool,
}

impl TileGrid {
    /// An all-open grid.  A cell count that overflows `usize` yields an
    /// empty flag vector, which `to_nav_graph` rejects.
    pub fn open(origin: Vec2, cell_size: f32, columns: u32, rows: u32) -> Self {
        let cells = Self::cell_count(columns, rows).unwrap_or(0);
        Self { origin, cell_size, columns, rows, blocked: vec![false; cells], diagonal: false }
    }

    fn cell_count(columns: u32, rows: u32) -> Option<usize> {
        (columns as usize).checked_mul(rows as usize)
    }

    pub fn with_diagonal(mut self, diagonal: bool) -> Self {
        self.diagonal = diagonal;
        self
    }

    /// Row-major index of `(col, row)`, or `None` outside the grid.
    pub fn cell_index(&self, col: i64, row: i64) -> Option<usize> {
        let col = u32::try_from(col).ok().filter(|&c| c < self.columns)?;
        let row = u32::try_from(row).ok().filter(|&r| r < self.rows)?;
        (row as usize).checked_mul(self.columns as usize)?.checked_add(col as usize)
    }

    /// Mark cell `(col, row)` blocked.  Out-of-range cells are ignored.
    pub fn block(&mut self, col: u32, row: u32) {
        if let Some(flag) = self.cell_index(col as i64, row as i64).and_then(|i| self.blocked.get_mut(i)) {
            *flag = true;
        }
    }

    /// Cells outside the grid count as blocked.
    pub fn is_blocked(&self, col: i64, row: i64) -> bool {
        self.cell_index(col, row).and_then(|i| self.blocked.get(i)).copied().unwrap_or(true)
    }

    /// Center of cell `(col, row)` in world space.
    pub fn cell_center(&self, col: u32, row: u32) -> Vec2 {
        self.origin + Vec2::new(col as f32 + 0.5, row as f32 + 0.5) * self.cell_size
    }

    /// Build the navigation graph.
    pub fn to_nav_graph(&self) -> PathResult<NavGraph> {
        if self.cell_size <= 0.0 || !self.cell_size.is_finite() {
            return Err(PathError::InvalidGrid(format!("cell size {} must be positive", self.cell_size)));
        }
        let cells = Self::cell_count(self.columns, self.rows);
        if cells != Some(self.blocked.len()) {
            return Err(PathError::InvalidGrid(format!(
                "{} blocked flags for a {}×{} grid",
                self.blocked.len(),
                self.columns,
                self.rows
            )));
        }

        let mut b = NavGraphBuilder::with_capacity(self.blocked.len(), self.blocked.len() * 8);
        let mut node_of = vec![NodeId::INVALID; self.blocked.len()];
        for row in 0..self.rows {
            for col in 0..self.columns {
                if let Some(i) = self.cell_index(col as i64, row as i64).filter(|&i| !self.blocked[i]) {
                    node_of[i] = b.add_node(self.cell_center(col, row));
                }
            }
        }

        let orthogonal = [(1i64, 0i64), (-1, 0), (0, 1), (0, -1)];
        let diagonal = [(1i64, 1i64), (1, -1), (-1, 1), (-1, -1)];
        for row in 0..self.rows as i64 {
            for col in 0..self.columns as i64 {
                let Some(from) = self.cell_index(col, row).map(|i| node_of[i]).filter(|n| *n != NodeId::INVALID)
                else {
                    continue;
                };
                let link = |dc: i64, dr: i64, b: &mut NavGraphBuilder| {
                    let to = self.cell_index(col + dc, row + dr).map_or(NodeId::INVALID, |i| node_of[i]);
                    if to != NodeId::INVALID {
                        let cost = b.node_pos(from).distance(b.node_pos(to));
                        b.add_edge(from, to, cost);
                    }
                };
                for (dc, dr) in orthogonal {
                    link(dc, dr, &mut b);
                }
                if self.diagonal {
                    for (dc, dr) in diagonal {
                        if !self.is_blocked(col + dc, row) && !self.is_blocked(col, row + dr) {
                            link(dc, dr, &mut b);
                        }
                    }
                }
            }
        }
        Ok(b.build())
    }
}
