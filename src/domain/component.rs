//! Component identity and scan artifacts

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::severity::{Issue, License};

/// General information identifying one component.
///
/// `sha1` and `sha256` are content hashes used for correlation with remote
/// scan results; either may be empty when the hash is not known (e.g. for
/// grouping nodes), in which case no correlation is attempted for that hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralInfo {
    /// Component identifier, e.g. `gav://org.example:lib:1.2.3`
    pub component_id: String,
    /// Package type, e.g. `npm`, `go`, `maven`
    pub pkg_type: String,
    /// SHA-1 content hash (may be empty)
    pub sha1: String,
    /// SHA-256 content hash (may be empty)
    pub sha256: String,
    /// Path of the component within its build, if any
    pub path: String,
}

impl GeneralInfo {
    pub fn new(component_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            ..Default::default()
        }
    }

    pub fn with_pkg_type(mut self, pkg_type: impl Into<String>) -> Self {
        self.pkg_type = pkg_type.into();
        self
    }

    pub fn with_sha1(mut self, sha1: impl Into<String>) -> Self {
        self.sha1 = sha1.into();
        self
    }

    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = sha256.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

/// The cacheable scan result for one component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedArtifact {
    pub general_info: GeneralInfo,
    pub issues: BTreeSet<Issue>,
    pub licenses: BTreeSet<License>,
}

impl ScannedArtifact {
    pub fn new(general_info: GeneralInfo) -> Self {
        Self {
            general_info,
            issues: BTreeSet::new(),
            licenses: BTreeSet::new(),
        }
    }

    /// Component id this artifact is keyed by in the cache.
    pub fn component_id(&self) -> &str {
        &self.general_info.component_id
    }
}

/// Generate a SHA-256 hash of arbitrary content, hex encoded.
pub fn content_sha256(content: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
