//! Vertex position scan along the beam axis.
//!
//! Every candidate position in the configured range is scored by the number
//! of contained hits and their summed residual. Candidates are visited in
//! ascending z:
//!
//! 1. A candidate with no contained hits is skipped.
//! 2. A candidate that raises the best count resets the residual bound, so it
//!    becomes the best regardless of its residual.
//! 3. Otherwise a candidate with at least the best count and a smaller
//!    residual replaces the best.
//!
//! If no candidate contains any hit the result stays at `min_z`.

use pixvtx_core::{ScanRange, VertexHit};

use crate::compatibility::{contained_hits, CandidateResult};

/// Best candidate found by a scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanOutcome {
    /// Selected vertex position.
    pub best_z: f64,
    /// Support at `best_z`, zero count if nothing was contained.
    pub support: CandidateResult,
}

/// Scans candidate vertex positions over a fixed range.
#[derive(Debug, Clone, Copy)]
pub struct VertexScanner {
    range: ScanRange,
}

impl VertexScanner {
    /// Creates a scanner for a validated range.
    #[must_use]
    pub fn new(range: ScanRange) -> Self {
        Self { range }
    }

    /// Returns the scan range.
    #[must_use]
    pub fn range(&self) -> &ScanRange {
        &self.range
    }

    /// Returns the best-supported vertex position.
    #[must_use]
    pub fn scan(&self, hits: &[VertexHit]) -> f64 {
        self.scan_outcome(hits).best_z
    }

    /// Runs the scan and returns the winning candidate with its support.
    #[must_use]
    pub fn scan_outcome(&self, hits: &[VertexHit]) -> ScanOutcome {
        let mut best = ScanOutcome {
            best_z: self.range.min_z,
            support: CandidateResult::default(),
        };
        let mut best_count = 0;
        let mut best_residual = f64::INFINITY;

        for z0 in self.range.candidates() {
            let candidate = contained_hits(hits, z0);
            if candidate.count == 0 {
                continue;
            }
            if candidate.count > best_count {
                best_residual = f64::INFINITY;
                best_count = candidate.count;
            }
            if candidate.count >= best_count && candidate.residual < best_residual {
                best_residual = candidate.residual;
                best = ScanOutcome {
                    best_z: z0,
                    support: candidate,
                };
            }
        }

        best
    }

    /// Support at every candidate position, in scan order.
    #[must_use]
    pub fn profile(&self, hits: &[VertexHit]) -> Vec<(f64, CandidateResult)> {
        self.range
            .candidates()
            .map(|z0| (z0, contained_hits(hits, z0)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn hits_from_vertex(z_vertex: f64, r: f64, zs: &[f64]) -> Vec<VertexHit> {
        zs.iter()
            .map(|&z| VertexHit::new(z, r, 2.0 * (z - z_vertex).abs() / r + 0.5))
            .collect()
    }

    #[test]
    fn test_finds_common_vertex() {
        let hits = hits_from_vertex(3.0, 4.0, &[-10.0, -2.0, 0.0, 5.0, 12.0]);
        let scanner = VertexScanner::new(ScanRange::new(-10.0, 10.0, 0.5));
        let outcome = scanner.scan_outcome(&hits);
        assert_relative_eq!(outcome.best_z, 3.0);
        assert_eq!(outcome.support.count, 5);
        assert_relative_eq!(outcome.support.residual, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_no_support_keeps_min_z() {
        let hits = vec![VertexHit::new(0.0, 4.0, 40.0)];
        let scanner = VertexScanner::new(ScanRange::new(-5.0, 5.0, 1.0));
        assert_eq!(scanner.scan(&hits).to_bits(), (-5.0_f64).to_bits());
        assert_eq!(scanner.scan(&[]).to_bits(), (-5.0_f64).to_bits());
    }

    #[test]
    fn test_equal_count_prefers_smaller_residual() {
        // One hit; predicted width is 0.5 + |z0| / 2 with r = 4.
        // w = 1.5 is matched exactly at z0 = +-2.
        let hits = vec![VertexHit::new(0.0, 4.0, 1.5)];
        let scanner = VertexScanner::new(ScanRange::new(-4.0, 4.0, 1.0));
        assert_relative_eq!(scanner.scan(&hits), -2.0);
    }

    #[test]
    fn test_first_of_equal_residuals_wins() {
        // Residual is 0.5 at both z0 = -1 and z0 = +1; ties keep the first.
        let hits = vec![VertexHit::new(0.0, 4.0, 1.5)];
        let scanner = VertexScanner::new(ScanRange::new(-1.0, 1.0, 2.0));
        assert_relative_eq!(scanner.scan(&hits), -1.0);
    }

    #[test]
    fn test_new_record_ignores_residual() {
        // With r = 4 the residual of a hit with w = 0.5 is |z - z0| / 2.
        // z0 = 0: only a is contained, residual 0.
        // z0 = 2: a and b are contained, residual 1 + 1 = 2.
        let a = VertexHit::new(0.0, 4.0, 0.5);
        let b = VertexHit::new(4.0, 4.0, 0.5);
        let scanner = VertexScanner::new(ScanRange::new(0.0, 6.0, 1.0));

        let profile = scanner.profile(&[a, b]);
        assert_eq!(profile[0].1.count, 1);
        assert_relative_eq!(profile[0].1.residual, 0.0);
        assert_eq!(profile[2].1.count, 2);
        assert_relative_eq!(profile[2].1.residual, 2.0);

        let outcome = scanner.scan_outcome(&[a, b]);
        assert_relative_eq!(outcome.best_z, 2.0);
        assert_eq!(outcome.support.count, 2);
    }

    #[test]
    fn test_result_inside_range() {
        let hits = hits_from_vertex(25.0, 4.0, &[20.0, 30.0]);
        let range = ScanRange::new(-5.0, 5.0, 0.25);
        let best = VertexScanner::new(range).scan(&hits);
        assert!(range.contains(best));
    }

    #[test]
    fn test_profile_length() {
        let scanner = VertexScanner::new(ScanRange::new(-5.0, 5.0, 1.0));
        let profile = scanner.profile(&[]);
        assert_eq!(profile.len(), 11);
        assert!(profile.iter().all(|(_, c)| c.count == 0));
    }
}
