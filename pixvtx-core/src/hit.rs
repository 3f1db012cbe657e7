//! Hit types for vertex compatibility estimation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pixel coordinate inside a detector module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelCoord {
    /// Row index (local x).
    pub x: u16,
    /// Column index (local y).
    pub y: u16,
}

impl PixelCoord {
    /// Creates a new pixel coordinate.
    #[inline]
    #[must_use]
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// A hit reduced to what the vertex scan needs.
///
/// `z` is the global axial position, `r` the transverse distance from the
/// beam line and `w` the cluster length along z in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexHit {
    /// Axial coordinate.
    pub z: f64,
    /// Radial distance from the beam line.
    pub r: f64,
    /// Cluster width along z (pixels).
    pub w: f64,
}

impl VertexHit {
    /// Creates a new vertex hit.
    #[inline]
    #[must_use]
    pub fn new(z: f64, r: f64, w: f64) -> Self {
        Self { z, r, w }
    }

    /// Returns true when the radial distance cannot be used to predict a
    /// cluster width (zero, negative or non-finite).
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.r.is_finite() && self.r > 0.0)
    }
}

impl From<(f64, f64, f64)> for VertexHit {
    fn from((z, r, w): (f64, f64, f64)) -> Self {
        Self::new(z, r, w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_hit_from_tuple() {
        let hit = VertexHit::from((1.5, 4.3, 2.0));
        assert_eq!(hit, VertexHit::new(1.5, 4.3, 2.0));
    }

    #[test]
    fn test_degenerate_radius() {
        assert!(!VertexHit::new(0.0, 4.3, 1.0).is_degenerate());
        assert!(VertexHit::new(0.0, 0.0, 1.0).is_degenerate());
        assert!(VertexHit::new(0.0, -1.0, 1.0).is_degenerate());
        assert!(VertexHit::new(0.0, f64::NAN, 1.0).is_degenerate());
        assert!(VertexHit::new(0.0, f64::INFINITY, 1.0).is_degenerate());
    }
}
