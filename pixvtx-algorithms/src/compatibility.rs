//! Hit-to-vertex compatibility from cluster length.
//!
//! A barrel cluster produced by a track from a vertex at `z0` is elongated
//! along z roughly in proportion to `|z - z0| / r`. A hit is contained by a
//! candidate vertex when its measured length lies within one pixel of that
//! prediction, which draws a v-shaped window in the (z, width) plane.

use pixvtx_core::VertexHit;

/// Empirical width offset of the predicted cluster length (pixels).
pub const WIDTH_OFFSET: f64 = 0.5;

/// Half-width of the containment window (pixels).
pub const WINDOW_HALF_WIDTH: f64 = 1.0;

/// Outcome of testing one hit against one candidate vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compatibility {
    /// Whether the hit falls inside the window.
    pub contained: bool,
    /// `|predicted - w|` for contained hits, 0 otherwise.
    pub residual: f64,
}

impl Compatibility {
    const EXCLUDED: Self = Self {
        contained: false,
        residual: 0.0,
    };
}

/// Support for one candidate vertex position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CandidateResult {
    /// Number of contained hits.
    pub count: usize,
    /// Sum of residuals over contained hits.
    pub residual: f64,
}

/// Predicted cluster length of `hit` for a vertex at `z0`.
///
/// Returns `None` for degenerate hits.
#[inline]
#[must_use]
pub fn predicted_width(hit: &VertexHit, z0: f64) -> Option<f64> {
    if hit.is_degenerate() {
        return None;
    }
    Some(2.0 * (hit.z - z0).abs() / hit.r + WIDTH_OFFSET)
}

/// Tests a single hit against a candidate vertex position.
#[inline]
#[must_use]
pub fn evaluate(hit: &VertexHit, z0: f64) -> Compatibility {
    let Some(predicted) = predicted_width(hit, z0) else {
        return Compatibility::EXCLUDED;
    };
    let residual = (predicted - hit.w).abs();
    if residual <= WINDOW_HALF_WIDTH {
        Compatibility {
            contained: true,
            residual,
        }
    } else {
        Compatibility::EXCLUDED
    }
}

/// Counts the hits contained by a vertex at `z0` and sums their residuals.
#[must_use]
pub fn contained_hits(hits: &[VertexHit], z0: f64) -> CandidateResult {
    hits.iter()
        .map(|hit| evaluate(hit, z0))
        .filter(|c| c.contained)
        .fold(CandidateResult::default(), |mut acc, c| {
            acc.count += 1;
            acc.residual += c.residual;
            acc
        })
}
