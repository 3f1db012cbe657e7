//! Multiplicity-dependent acceptance threshold.
#![allow(clippy::cast_precision_loss)]

use pixvtx_core::AcceptanceConfig;

/// Polynomial cut on the vertex quality ratio versus hit multiplicity.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptanceRule {
    config: AcceptanceConfig,
}

impl AcceptanceRule {
    /// Creates a rule from validated parameters.
    #[must_use]
    pub fn new(config: AcceptanceConfig) -> Self {
        Self { config }
    }

    /// Returns the rule parameters.
    #[must_use]
    pub fn config(&self) -> &AcceptanceConfig {
        &self.config
    }

    /// Raw polynomial value `sum_i pars[i] * n^i`.
    #[must_use]
    pub fn polynomial(&self, total_hits: usize) -> f64 {
        let n = total_hits as f64;
        self.config
            .cluster_pars
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * n + c)
    }

    /// Threshold after the multiplicity floor and the ceiling.
    ///
    /// Always within `[0, cluster_trunc]` when the ceiling is enabled.
    #[must_use]
    pub fn threshold(&self, total_hits: usize) -> f64 {
        if total_hits < self.config.nhits_trunc {
            return 0.0;
        }
        let mut cut = self.polynomial(total_hits).max(0.0);
        if self.config.cluster_trunc > 0.0 && cut > self.config.cluster_trunc {
            cut = self.config.cluster_trunc;
        }
        cut
    }

    /// Accepts when the quality ratio reaches the threshold.
    #[must_use]
    pub fn decide(&self, total_hits: usize, quality: f64) -> bool {
        quality >= self.threshold(total_hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rule(pars: &[f64], nhits_trunc: usize, cluster_trunc: f64) -> AcceptanceRule {
        AcceptanceRule::new(AcceptanceConfig {
            cluster_pars: pars.to_vec(),
            nhits_trunc,
            cluster_trunc,
        })
    }

    #[test]
    fn test_polynomial() {
        let r = rule(&[1.0, 0.5, 0.25], 0, 0.0);
        assert_relative_eq!(r.polynomial(0), 1.0);
        assert_relative_eq!(r.polynomial(2), 1.0 + 1.0 + 1.0);
        assert_relative_eq!(r.polynomial(4), 1.0 + 2.0 + 4.0);
    }

    #[test]
    fn test_floor_below_nhits_trunc() {
        let r = rule(&[5.0, 1.0], 100, 0.0);
        assert_relative_eq!(r.threshold(99), 0.0);
        assert_relative_eq!(r.threshold(0), 0.0);
        assert_relative_eq!(r.threshold(100), 105.0);
    }

    #[test]
    fn test_ceiling() {
        let r = rule(&[0.0, 0.0045], 150, 2.0);
        assert_relative_eq!(r.threshold(200), 0.9);
        assert_relative_eq!(r.threshold(1000), 2.0);
        assert!(r.threshold(100_000) <= 2.0);
    }

    #[test]
    fn test_non_positive_ceiling_disabled() {
        let r = rule(&[0.0, 1.0], 0, 0.0);
        assert_relative_eq!(r.threshold(500), 500.0);
        let r = rule(&[0.0, 1.0], 0, -3.0);
        assert_relative_eq!(r.threshold(500), 500.0);
    }

    #[test]
    fn test_negative_polynomial_raised_to_zero() {
        let r = rule(&[-4.0], 0, 0.0);
        assert_relative_eq!(r.threshold(10), 0.0);
        assert!(r.decide(10, 0.0));
    }

    #[test]
    fn test_decide_accepts_on_equality() {
        let r = rule(&[2.0], 0, 0.0);
        assert!(r.decide(3, 2.0));
        assert!(r.decide(3, 2.5));
        assert!(!r.decide(3, 1.999));
    }
}
