//! Per-event cluster-shape filter.
//!
//! Chains the vertex scan, the quality ratio and the acceptance rule:
//! hits -> best z -> quality -> threshold -> decision.

use log::debug;
use rayon::prelude::*;

use pixvtx_core::{
    DecisionRecord, DecisionStatistics, FilterConfig, PreparedEvent, Result, VertexEstimate,
    VertexHit,
};

use crate::acceptance::AcceptanceRule;
use crate::quality::QualityCounts;
use crate::scanner::VertexScanner;

/// Decision of one prepared event with the estimate behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventOutcome {
    /// Event identifier.
    pub id: u64,
    /// Filter decision.
    pub decision: DecisionRecord,
    /// Intermediate values; `None` when the event had no hit collection.
    pub estimate: Option<VertexEstimate>,
}

/// Vertex compatibility filter with immutable configuration.
///
/// The filter holds no per-event state and can be shared across threads.
#[derive(Debug, Clone)]
pub struct ClusterShapeFilter {
    scanner: VertexScanner,
    rule: AcceptanceRule,
    control_offset: f64,
}

impl ClusterShapeFilter {
    /// Builds a filter, validating the configuration first.
    ///
    /// # Errors
    /// Returns [`pixvtx_core::Error::Config`] if the configuration is invalid.
    pub fn new(config: FilterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scanner: VertexScanner::new(config.scan),
            rule: AcceptanceRule::new(config.acceptance),
            control_offset: config.control_offset,
        })
    }

    /// Returns the vertex scanner.
    #[must_use]
    pub fn scanner(&self) -> &VertexScanner {
        &self.scanner
    }

    /// Returns the acceptance rule.
    #[must_use]
    pub fn rule(&self) -> &AcceptanceRule {
        &self.rule
    }

    /// Computes every intermediate quantity of the decision.
    #[must_use]
    pub fn estimate(&self, hits: &[VertexHit], multiplicity: usize) -> VertexEstimate {
        let degenerate_hits = hits.iter().filter(|h| h.is_degenerate()).count();
        if degenerate_hits > 0 {
            debug!("excluding {degenerate_hits} hit(s) with unusable radius");
        }

        let best_z = self.scanner.scan(hits);
        let counts = QualityCounts::evaluate(hits, best_z, self.control_offset);

        VertexEstimate {
            best_z,
            n_best: counts.n_best,
            n_minus: counts.n_minus,
            n_plus: counts.n_plus,
            quality: counts.ratio(),
            threshold: self.rule.threshold(multiplicity),
            multiplicity,
            degenerate_hits,
        }
    }

    /// Decides one event; the multiplicity is the number of hits.
    #[must_use]
    pub fn process(&self, hits: &[VertexHit]) -> DecisionRecord {
        self.process_with_multiplicity(hits, hits.len())
    }

    /// Decides one event using an externally counted multiplicity.
    #[must_use]
    pub fn process_with_multiplicity(
        &self,
        hits: &[VertexHit],
        multiplicity: usize,
    ) -> DecisionRecord {
        self.estimate(hits, multiplicity).decision()
    }

    /// Decides a prepared event and keeps its estimate.
    ///
    /// A missing collection is accepted without an estimate.
    #[must_use]
    pub fn evaluate_event(&self, event: &PreparedEvent) -> EventOutcome {
        match &event.hits {
            Some(hits) => {
                let estimate = self.estimate(hits, event.multiplicity);
                EventOutcome {
                    id: event.id,
                    decision: estimate.decision(),
                    estimate: Some(estimate),
                }
            }
            None => {
                debug!("event {}: no hit collection, accepting", event.id);
                EventOutcome {
                    id: event.id,
                    decision: DecisionRecord::missing_collection(),
                    estimate: None,
                }
            }
        }
    }

    /// Decides a prepared event; a missing collection is accepted.
    #[must_use]
    pub fn process_event(&self, event: &PreparedEvent) -> DecisionRecord {
        self.evaluate_event(event).decision
    }

    /// Decides many events in parallel, preserving input order.
    #[must_use]
    pub fn process_batch(&self, events: &[PreparedEvent]) -> Vec<DecisionRecord> {
        events.par_iter().map(|e| self.process_event(e)).collect()
    }

    /// Evaluates many events in parallel and tallies the outcomes.
    #[must_use]
    pub fn evaluate_batch(
        &self,
        events: &[PreparedEvent],
    ) -> (Vec<EventOutcome>, DecisionStatistics) {
        let outcomes: Vec<EventOutcome> =
            events.par_iter().map(|e| self.evaluate_event(e)).collect();
        let mut stats = DecisionStatistics::default();
        for outcome in &outcomes {
            if outcome.estimate.is_some() {
                stats.record(&outcome.decision);
            } else {
                stats.record_missing();
            }
        }
        (outcomes, stats)
    }

    /// Decides many events in parallel and tallies the outcomes.
    #[must_use]
    pub fn process_batch_with_stats(
        &self,
        events: &[PreparedEvent],
    ) -> (Vec<DecisionRecord>, DecisionStatistics) {
        let (outcomes, stats) = self.evaluate_batch(events);
        (outcomes.into_iter().map(|o| o.decision).collect(), stats)
    }
}
