//! Depscan - scan-result caching, build-scan pipeline, and tree correlation core
//!
//! This crate provides the coordination core of a dependency scanner: it takes
//! dependency trees produced by external builders, correlates remote scan
//! results onto them by content hash, caches per-component results across
//! runs, and derives severity/license-filtered views for a calling UI.
//!
//! # Modules
//!
//! - [`config`] — Strongly-typed configuration with TOML support and validation
//! - [`domain`] — Dependency tree, severity, issue, and license models
//! - [`application`] — Correlation, filtering, pipeline, and scan services
//! - [`infrastructure`] — Persisted scan cache and remote service contracts
//! - [`logging`] — Structured logging with tracing
//!
//! # Architecture
//!
//! ```text
//! depscan/
//! ├── domain/           # Pure business logic
//! │   ├── tree          # Arena-based dependency tree + traversal
//! │   ├── severity      # Ordered severity, issues, licenses
//! │   └── component     # Component identity and scan artifacts
//! ├── application/      # Use cases and services
//! │   ├── pipeline      # Bounded-queue producer/consumer engine
//! │   ├── correlator    # sha1/sha256 result correlation
//! │   ├── filter        # Derived severity/license tree views
//! │   └── scan_service  # Build-scan and project-scan orchestration
//! ├── infrastructure/   # External integrations
//! │   ├── cache/        # Versioned JSON scan cache (LRU / TTL)
//! │   └── remote/       # Artifact lister and vulnerability services
//! └── config/           # Configuration management
//! ```
//!
//! # Data flow
//!
//! An artifact lister enumerates remote builds; producers download and parse
//! each into a per-build subtree (skipping builds already in the cache) and
//! push it onto one bounded queue. Consumers pull subtrees, fetch scan details,
//! correlate issues and licenses onto nodes, and merge the subtree under a
//! shared root. The cache is written only after the pipeline has drained.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
