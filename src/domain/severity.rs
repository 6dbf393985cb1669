//! Severity, issue, and license value objects

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Issue severity, ordered from least to most severe.
///
/// `Normal` is the severity of a component with no known issues. `Unknown` is
/// the placeholder attached when the remote scan service returned no data for
/// an otherwise successful build, so downstream rendering always has a
/// severity to show.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    #[default]
    Normal,
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All severities, in ascending order. Used to seed filter selections.
    pub const ALL: [Severity; 6] = [
        Severity::Normal,
        Severity::Unknown,
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Normal => write!(f, "normal"),
            Severity::Unknown => write!(f, "unknown"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// A single vulnerability or violation finding.
///
/// Issues have set semantics keyed by `id`: two issues with the same id are
/// the same issue regardless of summary or severity, so `BTreeSet<Issue>`
/// deduplicates by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub summary: String,
    pub severity: Severity,
}

impl Issue {
    pub fn new(id: impl Into<String>, summary: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            severity,
        }
    }

    /// The placeholder issue attached when no scan data could be obtained.
    pub fn unknown() -> Self {
        Self {
            id: String::new(),
            summary: "No scan data available".to_string(),
            severity: Severity::Unknown,
        }
    }
}

impl PartialEq for Issue {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Issue {}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

/// A license attached to a component, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct License {
    pub name: String,
}

impl License {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl std::fmt::Display for License {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
