//! Correlation of remote scan results onto dependency trees
//!
//! Matching is by content hash, never by name/version string: components are
//! matched directly by sha1, and build artifacts additionally inherit the
//! aggregated issues/licenses of every component that lists the artifact's
//! sha256 among its parents.

use std::collections::{BTreeSet, HashMap};

use crate::domain::{DependencyTree, Issue, License, NodeKind};
use crate::infrastructure::remote::ComponentSummary;

/// Aggregated findings under one parent sha256.
#[derive(Debug, Default)]
struct ParentAggregate {
    issues: BTreeSet<Issue>,
    licenses: BTreeSet<License>,
}

/// Attaches scan findings to tree nodes.
pub struct Correlator;

impl Correlator {
    /// Correlate a scan response onto the tree.
    ///
    /// Every node with a non-empty sha1 present in the response receives that
    /// component's issues and licenses. [`NodeKind::Artifact`] nodes
    /// additionally union in everything aggregated under their own sha256.
    /// Nodes without a sha1 (and nodes the response does not mention) are
    /// left untouched.
    pub fn apply(tree: &mut DependencyTree, components: &[ComponentSummary]) {
        let by_sha1: HashMap<&str, &ComponentSummary> = components
            .iter()
            .filter(|component| !component.sha1.is_empty())
            .map(|component| (component.sha1.as_str(), component))
            .collect();

        let mut by_parent: HashMap<&str, ParentAggregate> = HashMap::new();
        for component in components {
            for parent in &component.parent_sha256 {
                let aggregate = by_parent.entry(parent.as_str()).or_default();
                aggregate.issues.extend(component.issues.iter().cloned());
                aggregate.licenses.extend(component.licenses.iter().cloned());
            }
        }

        let ids: Vec<_> = tree.walk(tree.root()).collect();
        for id in ids {
            let (sha1, sha256, kind) = {
                let node = tree.node(id);
                (
                    node.general_info.sha1.clone(),
                    node.general_info.sha256.clone(),
                    node.kind,
                )
            };

            if !sha1.is_empty() {
                if let Some(component) = by_sha1.get(sha1.as_str()) {
                    let node = tree.node_mut(id);
                    node.issues = component.issues.iter().cloned().collect();
                    node.licenses = component.licenses.iter().cloned().collect();
                }
            }

            // An artifact inherits the issues of every package bundled inside it.
            if kind == NodeKind::Artifact && !sha256.is_empty() {
                if let Some(aggregate) = by_parent.get(sha256.as_str()) {
                    let node = tree.node_mut(id);
                    node.issues.extend(aggregate.issues.iter().cloned());
                    node.licenses.extend(aggregate.licenses.iter().cloned());
                }
            }
        }
    }

    /// Fallback for an absent scan response: populate every non-metadata node
    /// with the single `Unknown`-severity placeholder, so downstream rendering
    /// always has a severity to show. This is a deliberate outcome, not an
    /// error state.
    pub fn apply_unknown(tree: &mut DependencyTree) {
        let ids: Vec<_> = tree.walk(tree.root()).collect();
        for id in ids {
            if tree.node(id).is_metadata() {
                continue;
            }
            let node = tree.node_mut(id);
            node.issues.insert(Issue::unknown());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeneralInfo, Severity};

    fn summary(sha1: &str, issue: Issue) -> ComponentSummary {
        ComponentSummary {
            component_id: format!("cmp-{sha1}"),
            sha1: sha1.to_string(),
            sha256: String::new(),
            parent_sha256: Vec::new(),
            issues: vec![issue],
            licenses: vec![License::new("MIT")],
        }
    }

    #[test]
    fn matches_by_sha1_and_leaves_others_untouched() {
        let mut tree = DependencyTree::new(GeneralInfo::new("root"), NodeKind::Group);
        let matched = tree.add_child(
            tree.root(),
            GeneralInfo::new("a").with_sha1("abc"),
            NodeKind::Dependency,
        );
        let unmatched = tree.add_child(
            tree.root(),
            GeneralInfo::new("b").with_sha1("other"),
            NodeKind::Dependency,
        );
        let hashless = tree.add_child(tree.root(), GeneralInfo::new("c"), NodeKind::Dependency);

        let issue = Issue::new("I1", "issue one", Severity::High);
        Correlator::apply(&mut tree, &[summary("abc", issue.clone())]);

        let node = tree.node(matched);
        assert_eq!(node.issues.len(), 1);
        assert!(node.issues.contains(&issue));
        assert!(node.licenses.contains(&License::new("MIT")));
        assert!(tree.node(unmatched).issues.is_empty());
        assert!(tree.node(hashless).issues.is_empty());
    }

    #[test]
    fn artifact_inherits_aggregated_parent_issues() {
        let mut tree = DependencyTree::new(
            GeneralInfo::new("build")
                .with_sha1("build-sha1")
                .with_sha256("parent-hash"),
            NodeKind::Artifact,
        );
        let root = tree.root();
        tree.add_child(root, GeneralInfo::new("inner").with_sha1("in1"), NodeKind::Dependency);

        let direct = Issue::new("D1", "direct", Severity::Low);
        let inherited = Issue::new("B1", "bundled", Severity::Critical);

        let components = vec![
            ComponentSummary {
                component_id: "build".to_string(),
                sha1: "build-sha1".to_string(),
                sha256: "parent-hash".to_string(),
                parent_sha256: Vec::new(),
                issues: vec![direct.clone()],
                licenses: Vec::new(),
            },
            ComponentSummary {
                component_id: "inner".to_string(),
                sha1: "in1".to_string(),
                sha256: "inner-hash".to_string(),
                parent_sha256: vec!["parent-hash".to_string()],
                issues: vec![inherited.clone()],
                licenses: vec![License::new("GPL-3.0")],
            },
        ];

        Correlator::apply(&mut tree, &components);

        let artifact = tree.node(tree.root());
        assert!(artifact.issues.contains(&direct));
        assert!(artifact.issues.contains(&inherited));
        assert!(artifact.licenses.contains(&License::new("GPL-3.0")));
        assert_eq!(artifact.top_severity(), Severity::Critical);
    }

    #[test]
    fn unknown_fallback_marks_non_metadata_nodes() {
        let mut tree = DependencyTree::new(GeneralInfo::new("root"), NodeKind::Group);
        let dep = tree.add_child(tree.root(), GeneralInfo::new("a"), NodeKind::Dependency);

        Correlator::apply_unknown(&mut tree);

        assert!(tree.node(tree.root()).issues.is_empty());
        let node = tree.node(dep);
        assert_eq!(node.issues.len(), 1);
        assert_eq!(node.top_severity(), Severity::Unknown);
    }
}
