//! Test data factories

#![allow(dead_code)]

use depscan::domain::{DependencyTree, GeneralInfo, Issue, License, NodeKind, Severity};
use depscan::infrastructure::remote::{ArtifactDescriptor, ComponentSummary};

pub fn info(id: &str) -> GeneralInfo {
    GeneralInfo::new(id)
}

pub fn issue(id: &str, severity: Severity) -> Issue {
    Issue::new(id, format!("summary of {id}"), severity)
}

pub fn license(name: &str) -> License {
    License::new(name)
}

pub fn descriptor(name: &str) -> ArtifactDescriptor {
    ArtifactDescriptor {
        repo: "build-info".to_string(),
        path: format!("{name}.json"),
        name: name.to_string(),
        created: 1_700_000_000_000,
    }
}

pub fn summary_for_sha1(sha1: &str, issues: Vec<Issue>, licenses: Vec<License>) -> ComponentSummary {
    ComponentSummary {
        component_id: format!("cmp://{sha1}"),
        sha1: sha1.to_string(),
        sha256: format!("{sha1}-256"),
        parent_sha256: Vec::new(),
        issues,
        licenses,
    }
}

pub fn summary_for_component(
    component_id: &str,
    issues: Vec<Issue>,
    licenses: Vec<License>,
) -> ComponentSummary {
    ComponentSummary {
        component_id: component_id.to_string(),
        sha1: format!("{component_id}-sha1"),
        sha256: format!("{component_id}-sha256"),
        parent_sha256: Vec::new(),
        issues,
        licenses,
    }
}

/// One build subtree: an artifact root with two modules, each holding one
/// direct dependency with one transitive dependency beneath it.
///
/// The root's component id equals `key` so the build-scan cache can key the
/// whole build by it.
pub fn two_module_build(key: &str) -> DependencyTree {
    let mut tree = DependencyTree::new(
        GeneralInfo::new(key).with_sha1(format!("{key}-sha1")),
        NodeKind::Artifact,
    );
    let root = tree.root();
    for module in ["module-1", "module-2"] {
        let module_id = format!("{key}/{module}");
        let module_node = tree.add_child(root, GeneralInfo::new(&module_id), NodeKind::Group);
        let direct = tree.add_child(
            module_node,
            GeneralInfo::new(format!("{module_id}/direct")).with_sha1(format!("{module_id}-direct")),
            NodeKind::Dependency,
        );
        tree.add_child(
            direct,
            GeneralInfo::new(format!("{module_id}/transitive"))
                .with_sha1(format!("{module_id}-transitive")),
            NodeKind::Dependency,
        );
    }
    tree
}

/// A flat project tree with `count` dependencies under one group root.
pub fn flat_project(count: usize) -> DependencyTree {
    let mut tree = DependencyTree::new(GeneralInfo::new("project"), NodeKind::Group);
    let root = tree.root();
    for index in 0..count {
        tree.add_child(
            root,
            GeneralInfo::new(format!("dep-{index}")).with_sha1(format!("dep-{index}-sha1")),
            NodeKind::Dependency,
        );
    }
    tree
}

/// Component ids of every node, in walk order.
pub fn component_ids(tree: &DependencyTree) -> Vec<String> {
    tree.walk(tree.root())
        .map(|id| tree.node(id).component_id().to_string())
        .collect()
}
