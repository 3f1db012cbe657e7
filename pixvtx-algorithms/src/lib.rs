//! pixvtx-algorithms: Vertex estimation and event acceptance.
//!
//! This crate provides the building blocks of the cluster-shape filter:
//! - **Compatibility** - v-shaped cluster length window per hit
//! - **Scanner** - best-supported vertex along z
//! - **Quality** - support at the vertex versus two control positions
//! - **Acceptance** - polynomial cut in hit multiplicity
//! - **Filter** - the per-event chain of the above
//!
#![warn(missing_docs)]

pub mod acceptance;
pub mod compatibility;
mod filter;
pub mod quality;
pub mod scanner;

pub use acceptance::AcceptanceRule;
pub use compatibility::{contained_hits, CandidateResult, Compatibility};
pub use filter::{ClusterShapeFilter, EventOutcome};
pub use quality::{quality_ratio, QualityCounts};
pub use scanner::{ScanOutcome, VertexScanner};

// Re-export core configuration types
pub use pixvtx_core::config::{AcceptanceConfig, FilterConfig, ScanRange};
