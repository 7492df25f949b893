//! Point-to-point navigation on top of a [`NavGraph`].

use std::sync::Arc;

use log::trace;

use sk_core::Vec2;
use sk_sense::{LayerMask, LineOfSight};

use crate::graph::NavGraph;
use crate::search::PathSearch;
use crate::smoothing::smooth_path;
use crate::{PathError, PathResult};

/// Answers "how do I get from here to there?" with a waypoint list.
///
/// The first waypoint is the first point the agent should head for (its own
/// position is not included); the last is the exact goal.
pub trait NavigationOracle: Send + Sync {
    fn find_path(&self, from: Vec2, to: Vec2) -> PathResult<Vec<Vec2>>;
}

/// [`NavigationOracle`] that snaps both endpoints onto a graph, searches with
/// `S`, and optionally string-pulls the result against a line-of-sight
/// oracle.
pub struct GraphNavigator<S> {
    graph: Arc<NavGraph>,
    search: S,
    smoothing: Option<(Arc<dyn LineOfSight>, LayerMask)>,
}

impl<S: PathSearch> GraphNavigator<S> {
    pub fn new(graph: Arc<NavGraph>, search: S) -> Self {
        Self { graph, search, smoothing: None }
    }

    /// Smooth found paths against `los` on `layers`.
    pub fn with_smoothing(mut self, los: Arc<dyn LineOfSight>, layers: LayerMask) -> Self {
        self.smoothing = Some((los, layers));
        self
    }

    pub fn graph(&self) -> &NavGraph {
        &self.graph
    }
}

impl<S: PathSearch> NavigationOracle for GraphNavigator<S> {
    fn find_path(&self, from: Vec2, to: Vec2) -> PathResult<Vec<Vec2>> {
        let start = self.graph.snap_to_node(from).ok_or(PathError::Unreachable(from))?;
        let goal  = self.graph.snap_to_node(to).ok_or(PathError::Unreachable(to))?;
        let route = self.search.search(&self.graph, start, goal)?;
        trace!(
            "{}: {} → {} in {} nodes, cost {:.1}",
            self.search.name(),
            start,
            goal,
            route.nodes.len(),
            route.cost
        );

        let mut points = Vec::with_capacity(route.nodes.len() + 2);
        points.push(from);
        points.extend(route.waypoints(&self.graph));
        points.push(to);

        let mut points = match &self.smoothing {
            Some((los, layers)) => smooth_path(&points, los.as_ref(), *layers),
            None => {
                points.dedup_by(|a, b| a.distance_squared(*b) <= f32::EPSILON);
                points
            }
        };
        // Drop the agent's own position.
        if points.len() > 1 {
            points.remove(0);
        }
        Ok(points)
    }
}
