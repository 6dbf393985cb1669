//! Mock implementations of the remote service contracts

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use depscan::application::ProgressReporter;
use depscan::domain::DependencyTree;
use depscan::infrastructure::remote::{
    ArtifactDescriptor, BuildInfoFetcher, BuildParseError, BuildTreeParser, ComponentSummary,
    RemoteArtifactLister, RemoteError, VulnerabilityDetailsService, VulnerabilitySummaryService,
};

/// Progress reporter that swallows events so test output stays quiet.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn progress(&self, _completed: u64, _total: u64) {}
}

/// Lister returning a fixed set of descriptors, recording searched patterns.
pub struct MockLister {
    descriptors: Vec<ArtifactDescriptor>,
    patterns: Mutex<Vec<String>>,
}

impl MockLister {
    pub fn new(descriptors: Vec<ArtifactDescriptor>) -> Self {
        Self {
            descriptors,
            patterns: Mutex::new(Vec::new()),
        }
    }

    pub fn searched_patterns(&self) -> Vec<String> {
        self.patterns.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteArtifactLister for MockLister {
    async fn search(&self, pattern: &str) -> Result<Vec<ArtifactDescriptor>, RemoteError> {
        self.patterns.lock().unwrap().push(pattern.to_string());
        Ok(self.descriptors.clone())
    }
}

/// Fetcher that echoes the requested url, counting downloads. `failing()`
/// builds one whose every download errors.
pub struct MockFetcher {
    fail: bool,
    downloads: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            fail: false,
            downloads: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            downloads: AtomicUsize::new(0),
        }
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BuildInfoFetcher for MockFetcher {
    async fn download(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RemoteError::InvalidResponse(format!(
                "download of {url} failed"
            )));
        }
        Ok(url.as_bytes().to_vec())
    }
}

/// Parser returning pre-built trees by build key, ignoring the raw payload.
pub struct FixtureParser {
    trees: HashMap<String, DependencyTree>,
}

impl FixtureParser {
    pub fn new() -> Self {
        Self {
            trees: HashMap::new(),
        }
    }

    pub fn with_tree(mut self, key: impl Into<String>, tree: DependencyTree) -> Self {
        self.trees.insert(key.into(), tree);
        self
    }
}

impl BuildTreeParser for FixtureParser {
    fn parse(&self, _raw: &[u8], key: &str) -> Result<DependencyTree, BuildParseError> {
        self.trees
            .get(key)
            .cloned()
            .ok_or_else(|| BuildParseError(format!("no fixture for build {key}")))
    }
}

/// Details service keyed by full build key (`"{name}_{number}"`). A build
/// without a registered response yields `Ok(None)`.
pub struct MockDetailsService {
    responses: HashMap<String, Vec<ComponentSummary>>,
    calls: AtomicUsize,
}

impl MockDetailsService {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_response(
        mut self,
        key: impl Into<String>,
        components: Vec<ComponentSummary>,
    ) -> Self {
        self.responses.insert(key.into(), components);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VulnerabilityDetailsService for MockDetailsService {
    async fn details_for_build(
        &self,
        name: &str,
        number: &str,
    ) -> Result<Option<Vec<ComponentSummary>>, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.responses.get(&format!("{name}_{number}")).cloned())
    }
}

/// Summary service keyed by component id, recording the size of every
/// requested batch.
pub struct MockSummaryService {
    by_component: HashMap<String, ComponentSummary>,
    batches: Mutex<Vec<usize>>,
}

impl MockSummaryService {
    pub fn new() -> Self {
        Self {
            by_component: HashMap::new(),
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn with_component(mut self, summary: ComponentSummary) -> Self {
        self.by_component
            .insert(summary.component_id.clone(), summary);
        self
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

#[async_trait]
impl VulnerabilitySummaryService for MockSummaryService {
    async fn summarize(
        &self,
        component_ids: &[String],
    ) -> Result<Vec<ComponentSummary>, RemoteError> {
        self.batches.lock().unwrap().push(component_ids.len());
        Ok(component_ids
            .iter()
            .filter_map(|id| self.by_component.get(id).cloned())
            .collect())
    }
}
