//! Filter configuration types.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use crate::error::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Slack applied when counting scan steps so that `max_z` is not lost to
/// rounding when the range is an exact multiple of the step.
const STEP_COUNT_SLACK: f64 = 1e-9;

/// Upper bound on the number of candidate positions of one scan.
pub const MAX_SCAN_CANDIDATES: usize = 1_000_000;

/// Range and granularity of the vertex scan along z.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ScanRange {
    /// First candidate position.
    #[cfg_attr(feature = "serde", serde(alias = "minZ"))]
    pub min_z: f64,
    /// Last candidate position (inclusive).
    #[cfg_attr(feature = "serde", serde(alias = "maxZ"))]
    pub max_z: f64,
    /// Distance between candidates.
    #[cfg_attr(feature = "serde", serde(alias = "zStep"))]
    pub z_step: f64,
}

impl Default for ScanRange {
    fn default() -> Self {
        Self {
            min_z: -20.0,
            max_z: 20.05,
            z_step: 0.2,
        }
    }
}

impl ScanRange {
    /// Creates a new scan range.
    #[must_use]
    pub fn new(min_z: f64, max_z: f64, z_step: f64) -> Self {
        Self {
            min_z,
            max_z,
            z_step,
        }
    }

    /// Checks that the range describes a non-empty scan.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] for non-finite bounds, a non-positive step,
    /// an inverted range or more than [`MAX_SCAN_CANDIDATES`] positions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("min_z", self.min_z),
            ("max_z", self.max_z),
            ("z_step", self.z_step),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }
        if self.z_step <= 0.0 {
            return Err(ConfigError::NonPositiveStep(self.z_step));
        }
        if self.min_z > self.max_z {
            return Err(ConfigError::InvertedRange {
                min_z: self.min_z,
                max_z: self.max_z,
            });
        }
        let steps = self.step_count();
        if !steps.is_finite() || steps >= MAX_SCAN_CANDIDATES as f64 {
            return Err(ConfigError::TooManyCandidates {
                min_z: self.min_z,
                max_z: self.max_z,
                z_step: self.z_step,
                max: MAX_SCAN_CANDIDATES,
            });
        }
        Ok(())
    }

    fn step_count(&self) -> f64 {
        ((self.max_z - self.min_z) / self.z_step + STEP_COUNT_SLACK).floor()
    }

    /// Number of candidate positions in the scan.
    ///
    /// Only meaningful for a validated range; larger ranges saturate.
    #[must_use]
    pub fn num_candidates(&self) -> usize {
        let steps = self.step_count();
        if steps.is_nan() || steps < 0.0 {
            return 1;
        }
        (steps as usize).saturating_add(1)
    }

    /// Candidate positions in ascending order, `min_z` first.
    ///
    /// Positions are computed from the step index rather than accumulated,
    /// and never exceed `max_z`.
    pub fn candidates(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.num_candidates()).map(move |i| {
            let z0 = self.min_z + i as f64 * self.z_step;
            z0.min(self.max_z)
        })
    }

    /// Returns true if `z` lies inside the scanned interval.
    #[must_use]
    pub fn contains(&self, z: f64) -> bool {
        (self.min_z..=self.max_z).contains(&z)
    }
}

/// Parameters of the multiplicity-dependent acceptance threshold.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct AcceptanceConfig {
    /// Polynomial coefficients; index is the power of the hit multiplicity.
    #[cfg_attr(feature = "serde", serde(alias = "clusterPars"))]
    pub cluster_pars: Vec<f64>,
    /// Below this multiplicity the threshold is forced to zero.
    #[cfg_attr(feature = "serde", serde(alias = "nhitsTrunc"))]
    pub nhits_trunc: usize,
    /// Ceiling on the threshold; non-positive disables it.
    #[cfg_attr(feature = "serde", serde(alias = "clusterTrunc"))]
    pub cluster_trunc: f64,
}

impl Default for AcceptanceConfig {
    fn default() -> Self {
        Self {
            cluster_pars: vec![0.0, 0.0045],
            nhits_trunc: 150,
            cluster_trunc: 2.0,
        }
    }
}

impl AcceptanceConfig {
    /// Checks the coefficient list and ceiling.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] for an empty or non-finite coefficient list
    /// or a non-finite ceiling.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cluster_pars.is_empty() {
            return Err(ConfigError::EmptyCoefficients);
        }
        if self.cluster_pars.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::NonFinite {
                field: "cluster_pars",
            });
        }
        if !self.cluster_trunc.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "cluster_trunc",
            });
        }
        Ok(())
    }
}

/// Default distance between the best vertex and the two control positions.
pub const DEFAULT_CONTROL_OFFSET: f64 = 10.0;

/// Complete configuration of the cluster-shape filter.
///
/// Loaded once at startup and shared read-only by every event. The
/// serialized form is a single flat object; unknown keys are rejected.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "FlatFilterConfig"))]
pub struct FilterConfig {
    /// Vertex scan range.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub scan: ScanRange,
    /// Acceptance threshold parameters.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub acceptance: AcceptanceConfig,
    /// Offset of the quality control positions from the best vertex.
    pub control_offset: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            scan: ScanRange::default(),
            acceptance: AcceptanceConfig::default(),
            control_offset: DEFAULT_CONTROL_OFFSET,
        }
    }
}

/// Flat form of [`FilterConfig`] as it appears in configuration files.
///
/// `deny_unknown_fields` cannot be combined with `flatten`, so files are
/// read through this struct.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FlatFilterConfig {
    #[serde(alias = "minZ")]
    min_z: f64,
    #[serde(alias = "maxZ")]
    max_z: f64,
    #[serde(alias = "zStep")]
    z_step: f64,
    #[serde(alias = "clusterPars")]
    cluster_pars: Vec<f64>,
    #[serde(alias = "nhitsTrunc")]
    nhits_trunc: usize,
    #[serde(alias = "clusterTrunc")]
    cluster_trunc: f64,
    #[serde(alias = "controlOffset")]
    control_offset: f64,
}

#[cfg(feature = "serde")]
impl Default for FlatFilterConfig {
    fn default() -> Self {
        let scan = ScanRange::default();
        let acceptance = AcceptanceConfig::default();
        Self {
            min_z: scan.min_z,
            max_z: scan.max_z,
            z_step: scan.z_step,
            cluster_pars: acceptance.cluster_pars,
            nhits_trunc: acceptance.nhits_trunc,
            cluster_trunc: acceptance.cluster_trunc,
            control_offset: DEFAULT_CONTROL_OFFSET,
        }
    }
}

#[cfg(feature = "serde")]
impl From<FlatFilterConfig> for FilterConfig {
    fn from(flat: FlatFilterConfig) -> Self {
        Self {
            scan: ScanRange::new(flat.min_z, flat.max_z, flat.z_step),
            acceptance: AcceptanceConfig {
                cluster_pars: flat.cluster_pars,
                nhits_trunc: flat.nhits_trunc,
                cluster_trunc: flat.cluster_trunc,
            },
            control_offset: flat.control_offset,
        }
    }
}

impl FilterConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scan range.
    #[must_use]
    pub fn with_scan(mut self, min_z: f64, max_z: f64, z_step: f64) -> Self {
        self.scan = ScanRange::new(min_z, max_z, z_step);
        self
    }

    /// Sets the threshold polynomial coefficients.
    #[must_use]
    pub fn with_cluster_pars(mut self, pars: Vec<f64>) -> Self {
        self.acceptance.cluster_pars = pars;
        self
    }

    /// Sets the multiplicity floor.
    #[must_use]
    pub fn with_nhits_trunc(mut self, nhits_trunc: usize) -> Self {
        self.acceptance.nhits_trunc = nhits_trunc;
        self
    }

    /// Sets the threshold ceiling.
    #[must_use]
    pub fn with_cluster_trunc(mut self, cluster_trunc: f64) -> Self {
        self.acceptance.cluster_trunc = cluster_trunc;
        self
    }

    /// Sets the quality control offset.
    #[must_use]
    pub fn with_control_offset(mut self, offset: f64) -> Self {
        self.control_offset = offset;
        self
    }

    /// Validates every section of the configuration.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scan.validate()?;
        self.acceptance.validate()?;
        if !self.control_offset.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "control_offset",
            });
        }
        if self.control_offset < 0.0 {
            return Err(ConfigError::InvalidOffset(self.control_offset));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config_is_valid() {
        let config = FilterConfig::default();
        assert!(config.validate().is_ok());
        assert_relative_eq!(config.control_offset, 10.0);
    }

    #[test]
    fn test_builder() {
        let config = FilterConfig::new()
            .with_scan(-5.0, 5.0, 1.0)
            .with_cluster_pars(vec![1.0, 0.5])
            .with_nhits_trunc(10)
            .with_cluster_trunc(3.0)
            .with_control_offset(7.5);

        assert_eq!(config.scan, ScanRange::new(-5.0, 5.0, 1.0));
        assert_eq!(config.acceptance.cluster_pars, vec![1.0, 0.5]);
        assert_eq!(config.acceptance.nhits_trunc, 10);
        assert_relative_eq!(config.acceptance.cluster_trunc, 3.0);
        assert_relative_eq!(config.control_offset, 7.5);
    }

    #[test]
    fn test_validation_errors() {
        let zero_step = FilterConfig::new().with_scan(-5.0, 5.0, 0.0);
        assert_eq!(zero_step.validate(), Err(ConfigError::NonPositiveStep(0.0)));

        let inverted = FilterConfig::new().with_scan(5.0, -5.0, 1.0);
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::InvertedRange { .. })
        ));

        let empty = FilterConfig::new().with_cluster_pars(Vec::new());
        assert_eq!(empty.validate(), Err(ConfigError::EmptyCoefficients));

        let nan = FilterConfig::new().with_scan(f64::NAN, 5.0, 1.0);
        assert_eq!(
            nan.validate(),
            Err(ConfigError::NonFinite { field: "min_z" })
        );

        let offset = FilterConfig::new().with_control_offset(-1.0);
        assert_eq!(offset.validate(), Err(ConfigError::InvalidOffset(-1.0)));
    }

    #[test]
    fn test_tiny_step_rejected() {
        let range = ScanRange::new(-1.0, 1.0, 1e-300);
        assert!(matches!(
            range.validate(),
            Err(ConfigError::TooManyCandidates { max: MAX_SCAN_CANDIDATES, .. })
        ));
        assert_eq!(range.num_candidates(), usize::MAX);

        let huge = ScanRange::new(-f64::MAX, f64::MAX, 1.0);
        assert!(matches!(
            huge.validate(),
            Err(ConfigError::TooManyCandidates { .. })
        ));

        assert!(ScanRange::new(0.0, 99_999.0, 0.1).validate().is_ok());
    }

    #[test]
    fn test_candidates_inclusive() {
        let range = ScanRange::new(-5.0, 5.0, 1.0);
        let zs: Vec<f64> = range.candidates().collect();
        assert_eq!(zs.len(), 11);
        assert_relative_eq!(zs[0], -5.0);
        assert_relative_eq!(zs[5], 0.0);
        assert_relative_eq!(zs[10], 5.0);
    }

    #[test]
    fn test_candidates_fractional_step() {
        let range = ScanRange::new(0.0, 1.0, 0.1);
        let zs: Vec<f64> = range.candidates().collect();
        assert_eq!(zs.len(), 11);
        assert!(zs.iter().all(|z| range.contains(*z)));
        assert_relative_eq!(zs[10], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_candidates_single_point() {
        let range = ScanRange::new(2.0, 2.0, 0.5);
        let zs: Vec<f64> = range.candidates().collect();
        assert_eq!(zs, vec![2.0]);
    }

    #[test]
    fn test_default_range_ends_below_max() {
        let range = ScanRange::default();
        assert_eq!(range.num_candidates(), 201);
        let last = range.candidates().last().unwrap();
        assert_relative_eq!(last, 20.0, epsilon = 1e-9);
    }
}
