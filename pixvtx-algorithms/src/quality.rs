//! Vertex quality ratio.
//!
//! Compares the support at the best vertex with the mean support at two
//! control positions shifted by a fixed offset on either side.
#![allow(clippy::cast_precision_loss)]

use pixvtx_core::VertexHit;

use crate::compatibility::contained_hits;

/// Ratio reported when only the best position has support.
pub const NUMERATOR_ONLY_RATIO: f64 = 1000.0;

/// Contained-hit counts at the best vertex and its two control positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QualityCounts {
    /// Count at the best vertex.
    pub n_best: usize,
    /// Count at `best_z - offset`.
    pub n_minus: usize,
    /// Count at `best_z + offset`.
    pub n_plus: usize,
}

impl QualityCounts {
    /// Evaluates the three counts for `best_z`.
    #[must_use]
    pub fn evaluate(hits: &[VertexHit], best_z: f64, offset: f64) -> Self {
        Self {
            n_best: contained_hits(hits, best_z).count,
            n_minus: contained_hits(hits, best_z - offset).count,
            n_plus: contained_hits(hits, best_z + offset).count,
        }
    }

    /// Quality ratio `2 * n_best / (n_minus + n_plus)`.
    ///
    /// Without control support the ratio is [`NUMERATOR_ONLY_RATIO`] if the
    /// best position has hits and 0 otherwise.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        let control = self.n_minus + self.n_plus;
        if control > 0 {
            2.0 * self.n_best as f64 / control as f64
        } else if self.n_best > 0 {
            NUMERATOR_ONLY_RATIO
        } else {
            0.0
        }
    }
}

/// Quality ratio of the vertex at `best_z`.
#[must_use]
pub fn quality_ratio(hits: &[VertexHit], best_z: f64, offset: f64) -> f64 {
    QualityCounts::evaluate(hits, best_z, offset).ratio()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn counts(n_best: usize, n_minus: usize, n_plus: usize) -> QualityCounts {
        QualityCounts {
            n_best,
            n_minus,
            n_plus,
        }
    }

    #[test]
    fn test_ratio_branches() {
        assert_relative_eq!(counts(4, 1, 3).ratio(), 2.0);
        assert_relative_eq!(counts(3, 0, 2).ratio(), 3.0);
        assert_eq!(counts(5, 0, 0).ratio().to_bits(), 1000.0_f64.to_bits());
        assert_eq!(counts(0, 0, 0).ratio().to_bits(), 0.0_f64.to_bits());
        assert_relative_eq!(counts(0, 2, 2).ratio(), 0.0);
    }

    #[test]
    fn test_evaluate_offsets() {
        // r = 4, w = 0.5: residual |z - z0| / 2, contained within 2 of z.
        let hits = [
            VertexHit::new(0.0, 4.0, 0.5),
            VertexHit::new(0.0, 4.0, 0.5),
            VertexHit::new(-9.0, 4.0, 0.5),
            VertexHit::new(11.0, 4.0, 0.5),
            VertexHit::new(10.5, 4.0, 0.5),
        ];
        let c = QualityCounts::evaluate(&hits, 0.0, 10.0);
        assert_eq!(c, counts(2, 1, 2));
        assert_relative_eq!(quality_ratio(&hits, 0.0, 10.0), 4.0 / 3.0);
    }

    #[test]
    fn test_isolated_vertex_gets_sentinel() {
        let hits = [VertexHit::new(0.0, 4.0, 0.5)];
        assert_relative_eq!(quality_ratio(&hits, 0.0, 10.0), NUMERATOR_ONLY_RATIO);
    }

    #[test]
    fn test_no_hits_is_zero() {
        assert_relative_eq!(quality_ratio(&[], -3.0, 10.0), 0.0);
    }

    #[test]
    fn test_ratio_never_negative() {
        for n_best in 0..4 {
            for n_minus in 0..4 {
                for n_plus in 0..4 {
                    assert!(counts(n_best, n_minus, n_plus).ratio() >= 0.0);
                }
            }
        }
    }
}
