//! Application Layer - Scan use cases and services

pub mod correlator;
pub mod errors;
pub mod filter;
pub mod pipeline;
pub mod scan_service;

pub use correlator::Correlator;
pub use errors::{CacheError, ScanError};
pub use filter::{FilterState, filter_by_issues, filter_by_licenses};
pub use pipeline::{
    Consumer, Message, Pipeline, Producer, ProgressReporter, ProgressTracker,
    TracingProgressReporter,
};
pub use scan_service::{BuildScanService, BuildWorkItem, ProjectScanService, split_build_key};
