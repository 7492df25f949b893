//! Static obstacle geometry with an R-tree broad phase.
//!
//! # Spatial index
//!
//! Every obstacle's axis-aligned bounding box is bulk-loaded into an R-tree
//! (via `rstar`).  Ray casts query the tree with the ray's own bounding box
//! and run exact intersection tests only on the candidates; shape overlaps do
//! the same with the shape's bounding box.

use glam::Vec2;
use rstar::{RTree, RTreeObject, AABB};

use crate::{LayerMask, RayHit, RayOracle, SenseError, SenseResult, Shape, ShapeOracle};

/// A static obstacle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Obstacle {
    /// A line segment from `a` to `b` (blocks from both sides).
    Wall { a: Vec2, b: Vec2 },
    /// A solid disc.
    Disc { center: Vec2, radius: f32 },
}

impl Obstacle {
    fn bounds(&self) -> (Vec2, Vec2) {
        match *self {
            Obstacle::Wall { a, b } => (a.min(b), a.max(b)),
            Obstacle::Disc { center, radius } => (center - Vec2::splat(radius), center + Vec2::splat(radius)),
        }
    }
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored in the R-tree: an obstacle's bounding box plus its index into
/// `ObstacleSet::obstacles`.
#[derive(Clone)]
struct ObstacleEntry {
    envelope: AABB<[f32; 2]>,
    index: usize,
}

impl RTreeObject for ObstacleEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn aabb(min: Vec2, max: Vec2) -> AABB<[f32; 2]> {
    AABB::from_corners([min.x, min.y], [max.x, max.y])
}

// ── ObstacleSet ───────────────────────────────────────────────────────────────

/// Walls and discs answering [`RayOracle`] and [`ShapeOracle`] queries.
///
/// Single insertions go into the tree one by one; large static levels should
/// be bulk-loaded with [`ObstacleSet::from_obstacles`].
pub struct ObstacleSet {
    obstacles: Vec<(Obstacle, LayerMask)>,
    index: RTree<ObstacleEntry>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self { obstacles: Vec::new(), index: RTree::new() }
    }

    /// Validate and bulk-load a list of obstacles.
    pub fn from_obstacles(obstacles: Vec<(Obstacle, LayerMask)>) -> SenseResult<Self> {
        for (o, _) in &obstacles {
            validate(o)?;
        }
        let entries = obstacles
            .iter()
            .enumerate()
            .map(|(index, (o, _))| {
                let (min, max) = o.bounds();
                ObstacleEntry { envelope: aabb(min, max), index }
            })
            .collect();
        Ok(Self { obstacles, index: RTree::bulk_load(entries) })
    }

    /// Add one obstacle.
    pub fn add(&mut self, obstacle: Obstacle, layers: LayerMask) -> SenseResult<()> {
        validate(&obstacle)?;
        let (min, max) = obstacle.bounds();
        self.index.insert(ObstacleEntry { envelope: aabb(min, max), index: self.obstacles.len() });
        self.obstacles.push((obstacle, layers));
        Ok(())
    }

    pub fn add_wall(&mut self, a: Vec2, b: Vec2, layers: LayerMask) -> SenseResult<()> {
        self.add(Obstacle::Wall { a, b }, layers)
    }

    pub fn add_disc(&mut self, center: Vec2, radius: f32, layers: LayerMask) -> SenseResult<()> {
        self.add(Obstacle::Disc { center, radius }, layers)
    }

    /// Four walls enclosing the rectangle `[min, max]`.
    pub fn add_rect(&mut self, min: Vec2, max: Vec2, layers: LayerMask) -> SenseResult<()> {
        let corners = [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)];
        for i in 0..4 {
            self.add_wall(corners[i], corners[(i + 1) % 4], layers)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &(Obstacle, LayerMask)> + '_ {
        self.obstacles.iter()
    }

    /// All discs on `layers` as `(center, radius)`.
    pub fn discs(&self, layers: LayerMask) -> Vec<(Vec2, f32)> {
        self.obstacles
            .iter()
            .filter(|(_, l)| l.intersects(layers))
            .filter_map(|(o, _)| match *o {
                Obstacle::Disc { center, radius } => Some((center, radius)),
                Obstacle::Wall { .. } => None,
            })
            .collect()
    }

    fn candidates(&self, min: Vec2, max: Vec2, layers: LayerMask) -> impl Iterator<Item = &Obstacle> + '_ {
        self.index
            .locate_in_envelope_intersecting(&aabb(min, max))
            .map(|e| &self.obstacles[e.index])
            .filter(move |(_, l)| l.intersects(layers))
            .map(|(o, _)| o)
    }
}

impl Default for ObstacleSet {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(obstacle: &Obstacle) -> SenseResult<()> {
    match *obstacle {
        Obstacle::Wall { a, b } => {
            if !a.is_finite() || !b.is_finite() {
                return Err(SenseError::NonFinite);
            }
            if a.distance_squared(b) <= f32::EPSILON {
                return Err(SenseError::DegenerateWall { x: a.x, y: a.y });
            }
        }
        Obstacle::Disc { center, radius } => {
            if !center.is_finite() || !radius.is_finite() {
                return Err(SenseError::NonFinite);
            }
            if radius <= 0.0 {
                return Err(SenseError::InvalidRadius(radius));
            }
        }
    }
    Ok(())
}

// ── Exact tests ───────────────────────────────────────────────────────────────

fn ray_wall(origin: Vec2, dir: Vec2, max: f32, a: Vec2, b: Vec2) -> Option<RayHit> {
    let edge = b - a;
    let denom = dir.perp_dot(edge);
    if denom.abs() < 1e-9 {
        return None; // parallel
    }
    let to_a = a - origin;
    let t = to_a.perp_dot(edge) / denom;
    let u = to_a.perp_dot(dir) / denom;
    if !(0.0..=max).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }
    let mut normal = edge.perp().normalize_or_zero();
    if normal.dot(dir) > 0.0 {
        normal = -normal;
    }
    Some(RayHit { point: origin + dir * t, normal, distance: t })
}

fn ray_disc(origin: Vec2, dir: Vec2, max: f32, center: Vec2, radius: f32) -> Option<RayHit> {
    let f = origin - center;
    let c = f.length_squared() - radius * radius;
    if c <= 0.0 {
        // Origin inside the disc.
        let normal = f.try_normalize().unwrap_or(-dir);
        return Some(RayHit { point: origin, normal, distance: 0.0 });
    }
    let b = f.dot(dir);
    let disc = b * b - c;
    if disc < 0.0 || b > 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    if t > max {
        return None;
    }
    let point = origin + dir * t;
    Some(RayHit { point, normal: (point - center) / radius, distance: t })
}

fn closest_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let edge = b - a;
    let len2 = edge.length_squared();
    if len2 <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(edge) / len2).clamp(0.0, 1.0);
    a + edge * t
}

impl RayOracle for ObstacleSet {
    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32, layers: LayerMask) -> Option<RayHit> {
        let end = origin + direction * max_distance;
        self.candidates(origin.min(end), origin.max(end), layers)
            .filter_map(|o| match *o {
                Obstacle::Wall { a, b } => ray_wall(origin, direction, max_distance, a, b),
                Obstacle::Disc { center, radius } => ray_disc(origin, direction, max_distance, center, radius),
            })
            .min_by(|x, y| x.distance.total_cmp(&y.distance))
    }
}

impl ShapeOracle for ObstacleSet {
    fn overlaps(&self, shape: Shape, layers: LayerMask) -> bool {
        let Shape::Circle { center, radius } = shape;
        let r = Vec2::splat(radius);
        self.candidates(center - r, center + r, layers).any(|o| match *o {
            Obstacle::Wall { a, b } => closest_on_segment(center, a, b).distance(center) <= radius,
            Obstacle::Disc { center: c, radius: rr } => c.distance(center) <= radius + rr,
        })
    }
}
