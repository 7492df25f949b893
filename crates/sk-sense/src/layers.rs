//! Physics-layer masks.

/// A 32-bit set of collision layers.  A query matches an obstacle when the
/// two masks share at least one bit.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// Mask with only layer `n` (0-based) set.
    ///
    /// # Panics
    /// Panics if `n >= 32`.
    #[inline]
    pub fn layer(n: u32) -> Self {
        assert!(n < 32, "layer index {n} out of range");
        LayerMask(1 << n)
    }

    #[inline]
    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn with(self, other: LayerMask) -> Self {
        LayerMask(self.0 | other.0)
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::layer(0)
    }
}
