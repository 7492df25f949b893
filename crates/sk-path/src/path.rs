//! Waypoint paths with a progress cursor.

use sk_core::Vec2;

/// Ordered waypoints plus a cursor to the waypoint currently being pursued.
///
/// The cursor advances when the follower comes within `arrival_tolerance` of
/// the current waypoint.  A looping path wraps back to the first waypoint; a
/// one-shot path parks the cursor on its last waypoint.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    waypoints: Vec<Vec2>,
    looping: bool,
    arrival_tolerance: f32,
    cursor: usize,
}

impl Path {
    pub fn new(waypoints: Vec<Vec2>, looping: bool) -> Self {
        Self { waypoints, looping, arrival_tolerance: 10.0, cursor: 0 }
    }

    pub fn with_tolerance(mut self, arrival_tolerance: f32) -> Self {
        self.arrival_tolerance = arrival_tolerance.max(0.0);
        self
    }

    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn arrival_tolerance(&self) -> f32 {
        self.arrival_tolerance
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The waypoint being pursued, or `None` for an empty path.
    pub fn current(&self) -> Option<Vec2> {
        self.waypoints.get(self.cursor).copied()
    }

    /// `true` when the cursor sits on the last waypoint of a one-shot path.
    pub fn is_final(&self) -> bool {
        !self.looping && self.cursor + 1 >= self.waypoints.len()
    }

    /// `true` once a one-shot path's last waypoint is within tolerance of
    /// `position`.
    pub fn is_finished(&self, position: Vec2) -> bool {
        self.is_final() && self.current().is_none_or(|p| p.distance(position) <= self.arrival_tolerance)
    }

    /// Advance the cursor past every waypoint already within tolerance of
    /// `position`.  Returns `true` if the cursor moved.
    pub fn update(&mut self, position: Vec2) -> bool {
        let start = self.cursor;
        // Bounded so a looping path whose points all sit inside the
        // tolerance cannot spin forever.
        for _ in 0..self.waypoints.len() {
            let Some(target) = self.current() else { break };
            if target.distance(position) > self.arrival_tolerance || self.is_final() {
                break;
            }
            self.cursor = (self.cursor + 1) % self.waypoints.len();
        }
        self.cursor != start
    }

    /// Rewind to the first waypoint.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Replace the waypoints and rewind.
    pub fn set_waypoints(&mut self, waypoints: Vec<Vec2>) {
        self.waypoints = waypoints;
        self.cursor = 0;
    }
}
