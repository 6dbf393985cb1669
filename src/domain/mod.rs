//! Domain Layer - Core models for dependency scanning
//!
//! Pure business logic: the dependency tree, component identity, and the
//! severity/issue/license value objects shared by correlation and filtering.

pub mod component;
pub mod severity;
pub mod tree;

pub use component::{GeneralInfo, ScannedArtifact, content_sha256};
pub use severity::{Issue, License, Severity};
pub use tree::{DependencyTree, Node, NodeId, NodeKind};
