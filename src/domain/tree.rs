//! Arena-based dependency tree
//!
//! The tree owns all nodes in a single arena (`Vec<Node>`); nodes refer to
//! each other by index, so parent back-references are non-owning and the
//! structure is acyclic by construction. Cycles in the *input* graph are
//! handled at expansion time: [`DependencyTree::grow`] carries the ancestor
//! component-id path by value per branch and adds a revisited component as a
//! truncated leaf instead of recursing, which guarantees termination on any
//! cyclic input.

use std::collections::{BTreeSet, HashSet};

use super::component::GeneralInfo;
use super::severity::{Issue, License, Severity};

/// Index of a node within its tree's arena.
///
/// Node ids are only meaningful within the tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Discriminant for the role a node plays in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A build output. Receives issue data both by direct sha1 match and by
    /// parent-sha256 aggregation (an artifact inherits the issues of every
    /// package bundled inside it).
    Artifact,
    /// A consumed package. Receives issue data by direct sha1 match only.
    Dependency,
    /// A grouping/container node ("module", "dependencies", ...) that is not
    /// a real component.
    Group,
}

/// One node of the dependency tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub general_info: GeneralInfo,
    pub kind: NodeKind,
    pub scopes: BTreeSet<String>,
    pub issues: BTreeSet<Issue>,
    pub licenses: BTreeSet<License>,
    /// Set when expansion stopped here because the component already appeared
    /// on the ancestor path. A truncated node is always childless.
    pub truncated: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(general_info: GeneralInfo, kind: NodeKind) -> Self {
        Self {
            general_info,
            kind,
            scopes: BTreeSet::new(),
            issues: BTreeSet::new(),
            licenses: BTreeSet::new(),
            truncated: false,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn component_id(&self) -> &str {
        &self.general_info.component_id
    }

    /// True for grouping/container nodes that are not real components.
    pub fn is_metadata(&self) -> bool {
        self.kind == NodeKind::Group
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Most severe issue on this node, or `Normal` when it has none.
    pub fn top_severity(&self) -> Severity {
        self.issues
            .iter()
            .map(|issue| issue.severity)
            .max()
            .unwrap_or(Severity::Normal)
    }
}

/// An n-ary dependency tree with ordered children.
#[derive(Debug, Clone)]
pub struct DependencyTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl DependencyTree {
    /// Create a tree containing only the given root node.
    pub fn new(general_info: GeneralInfo, kind: NodeKind) -> Self {
        Self {
            nodes: vec![Node::new(general_info, kind)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Append a new child under `parent`, setting its parent link.
    pub fn add_child(&mut self, parent: NodeId, general_info: GeneralInfo, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = Node::new(general_info, kind);
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Component ids on the path from the root down to `id`, inclusive.
    pub fn ancestor_ids(&self, id: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            path.push(node.component_id().to_string());
            current = node.parent;
        }
        path.reverse();
        path
    }

    /// Lazy pre-order traversal of `from` and all of its descendants.
    pub fn walk(&self, from: NodeId) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![from],
        }
    }

    /// Recursively expand `from` by asking `children_of` for the direct
    /// children of each component id.
    ///
    /// The ancestor path is carried by value per branch, so sibling subtrees
    /// cannot interfere with each other. A child whose component id already
    /// appears on the path from the root to its parent is added as a
    /// truncated, childless leaf and is not expanded further. This terminates
    /// on any cyclic input.
    pub fn grow<F>(&mut self, from: NodeId, children_of: &F)
    where
        F: Fn(&str) -> Vec<GeneralInfo>,
    {
        let mut ancestors: HashSet<String> = HashSet::new();
        for id in self.ancestor_ids(from) {
            ancestors.insert(id);
        }
        self.grow_inner(from, ancestors, children_of);
    }

    fn grow_inner<F>(&mut self, node: NodeId, ancestors: HashSet<String>, children_of: &F)
    where
        F: Fn(&str) -> Vec<GeneralInfo>,
    {
        let component_id = self.node(node).component_id().to_string();
        for child_info in children_of(&component_id) {
            if ancestors.contains(&child_info.component_id) {
                let child = self.add_child(node, child_info, NodeKind::Dependency);
                self.node_mut(child).truncated = true;
                continue;
            }
            let child = self.add_child(node, child_info, NodeKind::Dependency);
            let mut child_ancestors = ancestors.clone();
            child_ancestors.insert(self.node(child).component_id().to_string());
            self.grow_inner(child, child_ancestors, children_of);
        }
    }

    /// Append a whole subtree (its root and all descendants) under this
    /// tree's root, preserving child order. Returns the id of the merged
    /// subtree's root within this tree.
    pub fn merge(&mut self, subtree: &DependencyTree) -> NodeId {
        let offset = self.nodes.len();
        for node in &subtree.nodes {
            let mut copied = node.clone();
            copied.parent = node.parent.map(|p| NodeId(p.0 + offset));
            copied.children = node.children.iter().map(|c| NodeId(c.0 + offset)).collect();
            self.nodes.push(copied);
        }
        let merged_root = NodeId(subtree.root.0 + offset);
        self.nodes[merged_root.0].parent = Some(self.root);
        let root = self.root;
        self.nodes[root.0].children.push(merged_root);
        merged_root
    }

    fn subtree_eq(&self, id: NodeId, other: &DependencyTree, other_id: NodeId) -> bool {
        let a = self.node(id);
        let b = other.node(other_id);
        if a.general_info != b.general_info
            || a.kind != b.kind
            || a.scopes != b.scopes
            || a.issues != b.issues
            || a.licenses != b.licenses
            || a.truncated != b.truncated
            || a.children.len() != b.children.len()
        {
            return false;
        }
        a.children
            .iter()
            .zip(b.children.iter())
            .all(|(&ca, &cb)| self.subtree_eq(ca, other, cb))
    }
}

/// Structural equality: same shape and same node content, independent of
/// arena index layout.
impl PartialEq for DependencyTree {
    fn eq(&self, other: &Self) -> bool {
        self.subtree_eq(self.root, other, other.root)
    }
}

impl Eq for DependencyTree {}

/// Pre-order iterator over a subtree. See [`DependencyTree::walk`].
pub struct Walk<'a> {
    tree: &'a DependencyTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        // Reverse so the leftmost child is visited first.
        for &child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}
