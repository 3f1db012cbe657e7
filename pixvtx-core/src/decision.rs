//! Per-event decision records and run statistics.
#![allow(clippy::cast_precision_loss)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Final filter decision for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecisionRecord {
    /// Whether the event passes the vertex compatibility cut.
    pub accept: bool,
    /// Pixel hit multiplicity used by the threshold.
    pub hit_count: usize,
}

impl DecisionRecord {
    /// Creates a new decision record.
    #[must_use]
    pub fn new(accept: bool, hit_count: usize) -> Self {
        Self { accept, hit_count }
    }

    /// Decision for an event without a usable hit collection.
    #[must_use]
    pub fn missing_collection() -> Self {
        Self::new(true, 0)
    }
}

/// Intermediate values behind a decision.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexEstimate {
    /// Best-supported vertex position.
    pub best_z: f64,
    /// Contained hits at `best_z`.
    pub n_best: usize,
    /// Contained hits at `best_z - offset`.
    pub n_minus: usize,
    /// Contained hits at `best_z + offset`.
    pub n_plus: usize,
    /// Quality ratio derived from the three counts.
    pub quality: f64,
    /// Acceptance threshold for this multiplicity.
    pub threshold: f64,
    /// Hit multiplicity fed to the threshold.
    pub multiplicity: usize,
    /// Hits excluded because their radius was unusable.
    pub degenerate_hits: usize,
}

impl VertexEstimate {
    /// Returns true if the quality ratio reaches the threshold.
    #[must_use]
    pub fn accepted(&self) -> bool {
        self.quality >= self.threshold
    }

    /// Collapses the estimate into a decision record.
    #[must_use]
    pub fn decision(&self) -> DecisionRecord {
        DecisionRecord::new(self.accepted(), self.multiplicity)
    }
}

/// Running totals over a sequence of decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecisionStatistics {
    /// Events processed.
    pub events: usize,
    /// Events accepted.
    pub accepted: usize,
    /// Events rejected.
    pub rejected: usize,
    /// Events without a hit collection (accepted by default).
    pub missing_collections: usize,
    /// Sum of hit multiplicities.
    pub total_hits: usize,
}

impl DecisionStatistics {
    /// Records one decision.
    pub fn record(&mut self, decision: &DecisionRecord) {
        self.events += 1;
        if decision.accept {
            self.accepted += 1;
        } else {
            self.rejected += 1;
        }
        self.total_hits += decision.hit_count;
    }

    /// Records an event whose hit collection was missing.
    pub fn record_missing(&mut self) {
        self.missing_collections += 1;
        self.record(&DecisionRecord::missing_collection());
    }

    /// Fraction of events accepted, 0 when nothing was processed.
    #[must_use]
    pub fn acceptance_rate(&self) -> f64 {
        if self.events == 0 {
            0.0
        } else {
            self.accepted as f64 / self.events as f64
        }
    }

    /// Mean hit multiplicity per event.
    #[must_use]
    pub fn mean_hits(&self) -> f64 {
        if self.events == 0 {
            0.0
        } else {
            self.total_hits as f64 / self.events as f64
        }
    }

    /// Merges totals from another run.
    pub fn merge(&mut self, other: &Self) {
        self.events += other.events;
        self.accepted += other.accepted;
        self.rejected += other.rejected;
        self.missing_collections += other.missing_collections;
        self.total_hits += other.total_hits;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_estimate_accepts_on_equality() {
        let estimate = VertexEstimate {
            best_z: 0.0,
            n_best: 2,
            n_minus: 1,
            n_plus: 1,
            quality: 2.0,
            threshold: 2.0,
            multiplicity: 4,
            degenerate_hits: 0,
        };
        assert!(estimate.accepted());
        assert_eq!(estimate.decision(), DecisionRecord::new(true, 4));
    }

    #[test]
    fn test_statistics() {
        let mut stats = DecisionStatistics::default();
        stats.record(&DecisionRecord::new(true, 10));
        stats.record(&DecisionRecord::new(false, 30));
        stats.record_missing();

        assert_eq!(stats.events, 3);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.missing_collections, 1);
        assert_eq!(stats.total_hits, 40);
        assert_relative_eq!(stats.acceptance_rate(), 2.0 / 3.0);

        let mut merged = DecisionStatistics::default();
        merged.merge(&stats);
        merged.merge(&stats);
        assert_eq!(merged.events, 6);
        assert_eq!(merged.missing_collections, 2);
    }

    #[test]
    fn test_empty_statistics() {
        let stats = DecisionStatistics::default();
        assert_relative_eq!(stats.acceptance_rate(), 0.0);
        assert_relative_eq!(stats.mean_hits(), 0.0);
    }
}
