//! Path smoothing by string pulling.

use sk_core::Vec2;
use sk_sense::{LayerMask, LineOfSight};

/// Drop every waypoint that can be skipped without losing line of sight.
///
/// Starting from the first point, repeatedly jumps to the farthest later
/// point that is directly visible from the current anchor.  The first and
/// last points are always kept; consecutive duplicates are removed.
pub fn smooth_path<L>(points: &[Vec2], los: &L, layers: LayerMask) -> Vec<Vec2>
where
    L: LineOfSight + ?Sized,
{
    let mut deduped: Vec<Vec2> = Vec::with_capacity(points.len());
    for &p in points {
        if deduped.last().is_none_or(|last| last.distance_squared(p) > f32::EPSILON) {
            deduped.push(p);
        }
    }
    if deduped.len() <= 2 {
        return deduped;
    }

    let mut out = vec![deduped[0]];
    let mut anchor = 0;
    while anchor < deduped.len() - 1 {
        // Neighbors are always reachable, so the scan never returns `anchor`.
        let next = (anchor + 1..deduped.len())
            .rev()
            .find(|&j| j == anchor + 1 || los.line_of_sight(deduped[anchor], deduped[j], layers))
            .unwrap_or(anchor + 1);
        out.push(deduped[next]);
        anchor = next;
    }
    out
}
