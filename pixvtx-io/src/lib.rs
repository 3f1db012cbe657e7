//! pixvtx-io: File I/O for pixvtx.
//!
//! This crate reads JSON Lines event files through memory-mapped I/O via
//! memmap2, loads filter configuration, and writes decisions to CSV or
//! JSON Lines sinks.
//!

pub mod config;
mod error;
mod reader;
mod writer;

pub use config::{config_to_json, load_config, parse_config};
pub use error::{Error, Result};
pub use reader::{EventFileReader, EventIter, MappedFileReader};
pub use writer::{DecisionFileWriter, DecisionRow, DecisionSink, OutputFormat};
