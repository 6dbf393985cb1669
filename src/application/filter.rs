//! Severity and license filtered tree views
//!
//! Filtering derives a new tree; the canonical tree is never mutated. A node
//! survives a filter when it is selected itself or when any descendant
//! survives, so the UI can always render a path down to a matching leaf.
//! Filter state is an explicit value injected by the caller; two unrelated
//! scans never share selections.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{DependencyTree, License, Node, NodeId, Severity};

/// Per-scan severity and license selections.
///
/// Every known severity starts enabled; every license observed in a tree is
/// registered defaulting to enabled. A license that was never observed (and
/// never explicitly disabled) counts as enabled.
#[derive(Debug, Clone)]
pub struct FilterState {
    severities: BTreeMap<Severity, bool>,
    licenses: BTreeMap<License, bool>,
}

impl FilterState {
    pub fn new() -> Self {
        let severities = Severity::ALL.iter().map(|&s| (s, true)).collect();
        Self {
            severities,
            licenses: BTreeMap::new(),
        }
    }

    /// Register every license present in the tree, defaulting new ones to
    /// enabled. Existing selections are preserved.
    pub fn observe(&mut self, tree: &DependencyTree) {
        for id in tree.walk(tree.root()) {
            for license in &tree.node(id).licenses {
                self.licenses.entry(license.clone()).or_insert(true);
            }
        }
    }

    pub fn set_severity(&mut self, severity: Severity, enabled: bool) {
        self.severities.insert(severity, enabled);
    }

    pub fn set_all_severities(&mut self, enabled: bool) {
        for value in self.severities.values_mut() {
            *value = enabled;
        }
    }

    pub fn set_license(&mut self, license: License, enabled: bool) {
        self.licenses.insert(license, enabled);
    }

    pub fn severity_enabled(&self, severity: Severity) -> bool {
        self.severities.get(&severity).copied().unwrap_or(false)
    }

    pub fn license_enabled(&self, license: &License) -> bool {
        self.licenses.get(license).copied().unwrap_or(true)
    }

    /// Known licenses and their selections, in name order.
    pub fn licenses(&self) -> impl Iterator<Item = (&License, bool)> {
        self.licenses.iter().map(|(license, &enabled)| (license, enabled))
    }

    fn severity_selected(&self, node: &Node) -> bool {
        if node.issues.is_empty() {
            return self.severity_enabled(Severity::Normal);
        }
        node.issues
            .iter()
            .any(|issue| self.severity_enabled(issue.severity))
    }

    fn license_selected(&self, node: &Node) -> bool {
        node.licenses
            .iter()
            .any(|license| self.license_enabled(license))
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive the severity-filtered view of `tree`.
///
/// A node is severity-selected when it has no issues and `Normal` is enabled,
/// or when any of its issues has an enabled severity.
pub fn filter_by_issues(tree: &DependencyTree, state: &FilterState) -> DependencyTree {
    filter_tree(tree, &|node| state.severity_selected(node))
}

/// Derive the license-filtered view of `tree`.
///
/// A node is license-selected when any of its licenses is enabled.
pub fn filter_by_licenses(tree: &DependencyTree, state: &FilterState) -> DependencyTree {
    filter_tree(tree, &|node| state.license_selected(node))
}

fn filter_tree<F>(tree: &DependencyTree, selected: &F) -> DependencyTree
where
    F: Fn(&Node) -> bool,
{
    // Bottom-up pass: a node is kept when selected itself or when any child
    // is kept. Pre-order reversed visits children before parents.
    let preorder: Vec<NodeId> = tree.walk(tree.root()).collect();
    let mut kept: HashMap<NodeId, bool> = HashMap::with_capacity(preorder.len());
    for &id in preorder.iter().rev() {
        let node = tree.node(id);
        let keep = selected(node)
            || node.children().iter().any(|child| kept[child]);
        kept.insert(id, keep);
    }

    // Top-down pass: rebuild the surviving shape. The root is always present
    // so the result is renderable even when nothing matched.
    let mut derived = DependencyTree::new(
        tree.node(tree.root()).general_info.clone(),
        tree.node(tree.root()).kind,
    );
    let derived_root = derived.root();
    copy_payload(tree, tree.root(), &mut derived, derived_root);
    emit_children(tree, tree.root(), &mut derived, derived_root, &kept);
    derived
}

fn emit_children(
    source: &DependencyTree,
    source_id: NodeId,
    out: &mut DependencyTree,
    out_id: NodeId,
    kept: &HashMap<NodeId, bool>,
) {
    let children: Vec<NodeId> = source.node(source_id).children().to_vec();
    for child in children {
        if !kept[&child] {
            continue;
        }
        let child_node = source.node(child);
        let out_child = out.add_child(out_id, child_node.general_info.clone(), child_node.kind);
        copy_payload(source, child, out, out_child);
        emit_children(source, child, out, out_child, kept);
    }
}

fn copy_payload(source: &DependencyTree, from: NodeId, out: &mut DependencyTree, to: NodeId) {
    let node = source.node(from);
    let scopes = node.scopes.clone();
    let issues = node.issues.clone();
    let licenses = node.licenses.clone();
    let truncated = node.truncated;

    let target = out.node_mut(to);
    target.scopes = scopes;
    target.issues = issues;
    target.licenses = licenses;
    target.truncated = truncated;
}
