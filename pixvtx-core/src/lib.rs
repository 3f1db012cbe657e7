//! pixvtx-core: Core types for pixel cluster-shape vertex filtering.
//!
//! This crate provides the hit, event, configuration and decision types
//! shared by the vertex scan, the I/O layer and the command-line tool.
//!

pub mod config;
pub mod decision;
pub mod error;
pub mod event;
pub mod hit;

pub use config::{
    AcceptanceConfig, FilterConfig, ScanRange, DEFAULT_CONTROL_OFFSET, MAX_SCAN_CANDIDATES,
};
pub use decision::{DecisionRecord, DecisionStatistics, VertexEstimate};
pub use error::{ConfigError, Error, Result};
pub use event::{ModuleTopology, PreparedEvent, RawEvent, RawPixelHit, Subdetector};
pub use hit::{PixelCoord, VertexHit};
