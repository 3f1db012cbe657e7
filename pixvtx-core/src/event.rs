//! Raw pixel records and their reduction to vertex hits.
//!
//! A raw event carries every reconstructed pixel hit with its global position
//! already resolved. Preparation counts the valid hits (the multiplicity used
//! by the acceptance threshold) and keeps only barrel hits whose cluster does
//! not touch a module edge for the vertex scan.

use crate::hit::{PixelCoord, VertexHit};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pixel subdetector a hit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Subdetector {
    /// Barrel layers.
    #[default]
    Barrel,
    /// Forward disks.
    Endcap,
}

/// Pixel grid size of a detector module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModuleTopology {
    /// Number of pixel rows (local x).
    pub rows: u16,
    /// Number of pixel columns (local y).
    pub cols: u16,
}

impl Default for ModuleTopology {
    fn default() -> Self {
        Self {
            rows: 160,
            cols: 416,
        }
    }
}

impl ModuleTopology {
    /// Creates a new module topology.
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    /// Returns true if the pixel sits in the first or last row or column.
    #[must_use]
    pub fn is_edge_pixel(&self, pixel: PixelCoord) -> bool {
        let edge_x = pixel.x == 0 || pixel.x.saturating_add(1) >= self.rows;
        let edge_y = pixel.y == 0 || pixel.y.saturating_add(1) >= self.cols;
        edge_x || edge_y
    }
}

/// A reconstructed pixel hit as delivered by the detector reader.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawPixelHit {
    /// Reconstruction validity flag.
    #[cfg_attr(feature = "serde", serde(default = "default_valid"))]
    pub valid: bool,
    /// Subdetector of the module.
    #[cfg_attr(feature = "serde", serde(default))]
    pub subdetector: Subdetector,
    /// Global position `[x, y, z]`.
    pub global: [f64; 3],
    /// Cluster length along z, in pixels.
    pub size_y: u16,
    /// Pixels of the cluster.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pixels: Vec<PixelCoord>,
    /// Module pixel grid.
    #[cfg_attr(feature = "serde", serde(default))]
    pub module: ModuleTopology,
}

#[cfg(feature = "serde")]
fn default_valid() -> bool {
    true
}

impl RawPixelHit {
    /// Creates a valid barrel hit with no pixel list.
    #[must_use]
    pub fn barrel(global: [f64; 3], size_y: u16) -> Self {
        Self {
            valid: true,
            subdetector: Subdetector::Barrel,
            global,
            size_y,
            pixels: Vec::new(),
            module: ModuleTopology::default(),
        }
    }

    /// Sets the subdetector.
    #[must_use]
    pub fn with_subdetector(mut self, subdetector: Subdetector) -> Self {
        self.subdetector = subdetector;
        self
    }

    /// Sets the validity flag.
    #[must_use]
    pub fn with_valid(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    /// Sets the cluster pixels.
    #[must_use]
    pub fn with_pixels(mut self, pixels: Vec<PixelCoord>) -> Self {
        self.pixels = pixels;
        self
    }

    /// Sets the module topology.
    #[must_use]
    pub fn with_module(mut self, module: ModuleTopology) -> Self {
        self.module = module;
        self
    }

    /// Returns true if any pixel of the cluster lies on the module edge.
    #[must_use]
    pub fn touches_edge(&self) -> bool {
        self.pixels.iter().any(|&p| self.module.is_edge_pixel(p))
    }

    /// Transverse distance from the beam line.
    #[must_use]
    pub fn perp(&self) -> f64 {
        self.global[0].hypot(self.global[1])
    }

    /// Reduces the hit to its vertex-scan representation.
    #[must_use]
    pub fn to_vertex_hit(&self) -> VertexHit {
        VertexHit::new(self.global[2], self.perp(), f64::from(self.size_y))
    }
}

/// One collision event as read from the input.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawEvent {
    /// Event identifier.
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: u64,
    /// Pixel hits, `None` when the collection was unavailable.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hits: Option<Vec<RawPixelHit>>,
}

impl RawEvent {
    /// Creates an event with a hit collection.
    #[must_use]
    pub fn new(id: u64, hits: Vec<RawPixelHit>) -> Self {
        Self {
            id,
            hits: Some(hits),
        }
    }

    /// Creates an event whose hit collection is missing.
    #[must_use]
    pub fn without_hits(id: u64) -> Self {
        Self { id, hits: None }
    }

    /// Filters the raw hits into a prepared event.
    #[must_use]
    pub fn prepare(&self) -> PreparedEvent {
        let Some(raw) = &self.hits else {
            return PreparedEvent {
                id: self.id,
                multiplicity: 0,
                hits: None,
            };
        };

        let mut multiplicity = 0;
        let mut hits = Vec::with_capacity(raw.len());
        for hit in raw.iter().filter(|h| h.valid) {
            multiplicity += 1;
            if hit.subdetector != Subdetector::Barrel || hit.touches_edge() {
                continue;
            }
            hits.push(hit.to_vertex_hit());
        }

        PreparedEvent {
            id: self.id,
            multiplicity,
            hits: Some(hits),
        }
    }
}

/// An event ready for the vertex filter.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PreparedEvent {
    /// Event identifier.
    pub id: u64,
    /// Number of valid pixel hits in every subdetector.
    pub multiplicity: usize,
    /// Barrel hits away from module edges, `None` if the collection was missing.
    pub hits: Option<Vec<VertexHit>>,
}

impl PreparedEvent {
    /// Wraps an already filtered hit list; the multiplicity is its length.
    #[must_use]
    pub fn from_hits(id: u64, hits: Vec<VertexHit>) -> Self {
        Self {
            id,
            multiplicity: hits.len(),
            hits: Some(hits),
        }
    }

    /// Number of vertex hits, 0 when the collection was missing.
    #[must_use]
    pub fn vertex_hit_count(&self) -> usize {
        self.hits.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_edge_pixels() {
        let module = ModuleTopology::new(160, 416);
        assert!(module.is_edge_pixel(PixelCoord::new(0, 20)));
        assert!(module.is_edge_pixel(PixelCoord::new(159, 20)));
        assert!(module.is_edge_pixel(PixelCoord::new(20, 0)));
        assert!(module.is_edge_pixel(PixelCoord::new(20, 415)));
        assert!(!module.is_edge_pixel(PixelCoord::new(1, 1)));
        assert!(!module.is_edge_pixel(PixelCoord::new(158, 414)));
    }

    #[test]
    fn test_vertex_hit_conversion() {
        let raw = RawPixelHit::barrel([3.0, 4.0, -7.5], 3);
        let hit = raw.to_vertex_hit();
        assert_relative_eq!(hit.z, -7.5);
        assert_relative_eq!(hit.r, 5.0);
        assert_relative_eq!(hit.w, 3.0);
    }

    #[test]
    fn test_prepare_filters_hits() {
        let inner = PixelCoord::new(10, 10);
        let edge = PixelCoord::new(0, 10);
        let event = RawEvent::new(
            7,
            vec![
                RawPixelHit::barrel([4.0, 0.0, 1.0], 2).with_pixels(vec![inner]),
                RawPixelHit::barrel([4.0, 0.0, 2.0], 2).with_pixels(vec![inner, edge]),
                RawPixelHit::barrel([4.0, 0.0, 3.0], 2).with_subdetector(Subdetector::Endcap),
                RawPixelHit::barrel([4.0, 0.0, 4.0], 2).with_valid(false),
            ],
        );

        let prepared = event.prepare();
        assert_eq!(prepared.id, 7);
        // Edge and endcap hits count toward the multiplicity, invalid ones do not.
        assert_eq!(prepared.multiplicity, 3);
        let hits = prepared.hits.unwrap();
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].z, 1.0);
    }

    #[test]
    fn test_prepare_missing_collection() {
        let prepared = RawEvent::without_hits(3).prepare();
        assert_eq!(prepared.multiplicity, 0);
        assert!(prepared.hits.is_none());
        assert_eq!(prepared.vertex_hit_count(), 0);
    }

    #[test]
    fn test_from_hits() {
        let prepared = PreparedEvent::from_hits(1, vec![VertexHit::new(0.0, 4.0, 1.0); 3]);
        assert_eq!(prepared.multiplicity, 3);
        assert_eq!(prepared.vertex_hit_count(), 3);
    }
}
