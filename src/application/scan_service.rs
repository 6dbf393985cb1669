//! Scan orchestration
//!
//! Two entry points share the cache, correlator, and tree machinery:
//!
//! - [`BuildScanService`] — the CI path. Enumerates remote builds, downloads
//!   and parses each into a per-build subtree (producers), fetches per-build
//!   scan details and merges correlated subtrees under one shared root
//!   (consumers). Backed by an age-bounded cache so re-scans of recent builds
//!   are skipped.
//! - [`ProjectScanService`] — the local path. Takes an externally built tree,
//!   fetches vulnerability summaries for its components in fixed-size
//!   batches, and correlates them on. Backed by a capacity-bounded cache so
//!   repeated local scans avoid redundant remote calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{PipelineConfig, RemoteConfig};
use crate::domain::{DependencyTree, GeneralInfo, NodeKind, ScannedArtifact, content_sha256};
use crate::infrastructure::cache::ScanCache;
use crate::infrastructure::remote::{
    ArtifactDescriptor, BuildInfoFetcher, BuildTreeParser, ComponentSummary, RemoteArtifactLister,
    VulnerabilityDetailsService, VulnerabilitySummaryService,
};

use super::correlator::Correlator;
use super::errors::ScanError;
use super::pipeline::{Consumer, Pipeline, Producer, ProgressTracker};

/// One just-built subtree flowing from producer to consumer.
#[derive(Debug)]
pub struct BuildWorkItem {
    /// Logical key of the build, `"{name}_{number}"`.
    pub key: String,
    pub tree: DependencyTree,
}

/// Split a build key into its name and number parts.
///
/// The number is everything after the last underscore; a key without an
/// underscore has an empty number.
pub fn split_build_key(key: &str) -> (&str, &str) {
    match key.rsplit_once('_') {
        Some((name, number)) => (name, number),
        None => (key, ""),
    }
}

struct BuildProducer {
    pending: VecDeque<ArtifactDescriptor>,
    fetcher: Arc<dyn BuildInfoFetcher>,
    parser: Arc<dyn BuildTreeParser>,
    cache: Arc<Mutex<ScanCache>>,
    progress: Arc<ProgressTracker>,
}

#[async_trait]
impl Producer<BuildWorkItem> for BuildProducer {
    async fn produce(&mut self) -> Option<BuildWorkItem> {
        // Skip cached and failed builds without ending the source; every
        // descriptor accounts for one unit of progress either here or at the
        // consumer.
        while let Some(descriptor) = self.pending.pop_front() {
            let key = descriptor.name.clone();

            if self.cache.lock().await.contains(&key) {
                debug!(build = %key, "build already scanned, skipping");
                self.progress.complete_one();
                continue;
            }

            let url = format!("{}/{}", descriptor.repo, descriptor.path);
            let raw = match self.fetcher.download(&url).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(build = %key, error = %e, "failed to download build info, skipping");
                    self.progress.complete_one();
                    continue;
                }
            };

            match self.parser.parse(&raw, &key) {
                Ok(mut tree) => {
                    // The build artifact's own content hash is the hash of the
                    // downloaded build-info document; parsers that already set
                    // one win.
                    let root = tree.root();
                    if tree.node(root).general_info.sha256.is_empty() {
                        tree.node_mut(root).general_info.sha256 = content_sha256(&raw);
                    }
                    return Some(BuildWorkItem { key, tree });
                }
                Err(e) => {
                    warn!(build = %key, error = %e, "failed to parse build info, skipping");
                    self.progress.complete_one();
                }
            }
        }
        None
    }
}

struct BuildConsumer {
    details: Arc<dyn VulnerabilityDetailsService>,
    cache: Arc<Mutex<ScanCache>>,
    root: Arc<Mutex<DependencyTree>>,
}

#[async_trait]
impl Consumer<BuildWorkItem> for BuildConsumer {
    async fn consume(&mut self, mut item: BuildWorkItem) -> Result<(), ScanError> {
        let (name, number) = split_build_key(&item.key);

        match self.details.details_for_build(name, number).await? {
            Some(components) => {
                Correlator::apply(&mut item.tree, &components);
                // Commit complete per-component results; the cache file itself
                // is written only after the pipeline has drained.
                let mut cache = self.cache.lock().await;
                for id in item.tree.walk(item.tree.root()) {
                    let node = item.tree.node(id);
                    if node.is_metadata() || node.component_id().is_empty() {
                        continue;
                    }
                    cache.put(ScannedArtifact {
                        general_info: node.general_info.clone(),
                        issues: node.issues.clone(),
                        licenses: node.licenses.clone(),
                    });
                }
            }
            None => {
                // No scan data for this build; mark the whole subtree so the
                // UI still has a severity to render. Nothing is cached.
                debug!(build = %item.key, "no scan details available, marking unknown");
                Correlator::apply_unknown(&mut item.tree);
            }
        }

        // The shared root is the only cross-task mutable resource besides the
        // queue; the lock is scoped to this single append.
        self.root.lock().await.merge(&item.tree);
        Ok(())
    }
}

/// CI build-scan orchestration over the producer/consumer pipeline.
pub struct BuildScanService {
    lister: Arc<dyn RemoteArtifactLister>,
    fetcher: Arc<dyn BuildInfoFetcher>,
    details: Arc<dyn VulnerabilityDetailsService>,
    parser: Arc<dyn BuildTreeParser>,
    pipeline: PipelineConfig,
    remote: RemoteConfig,
}

impl BuildScanService {
    pub fn new(
        lister: Arc<dyn RemoteArtifactLister>,
        fetcher: Arc<dyn BuildInfoFetcher>,
        details: Arc<dyn VulnerabilityDetailsService>,
        parser: Arc<dyn BuildTreeParser>,
        pipeline: PipelineConfig,
        remote: RemoteConfig,
    ) -> Self {
        Self {
            lister,
            fetcher,
            details,
            parser,
            pipeline,
            remote,
        }
    }

    /// Scan every build matching `pattern` and return the canonical tree with
    /// one correlated subtree per build under the root.
    ///
    /// Cancellation unwinds cooperatively: already merged subtrees and
    /// committed cache entries are kept, and the partial tree is returned.
    /// The cache is persisted only after the pipeline has fully drained.
    pub async fn scan(
        &self,
        pattern: &str,
        cache: ScanCache,
        token: CancellationToken,
        progress: Arc<ProgressTracker>,
    ) -> Result<DependencyTree, ScanError> {
        let mut descriptors = self.lister.search(pattern).await?;
        if descriptors.len() > self.remote.max_results {
            debug!(
                found = descriptors.len(),
                cap = self.remote.max_results,
                "capping search results"
            );
            descriptors.truncate(self.remote.max_results);
        }
        info!(pattern = %pattern, builds = descriptors.len(), "starting build scan");
        progress.add_total(descriptors.len() as u64);

        let cache = Arc::new(Mutex::new(cache));
        let root = Arc::new(Mutex::new(DependencyTree::new(
            GeneralInfo::new(pattern),
            NodeKind::Group,
        )));

        let mut sources: Vec<VecDeque<ArtifactDescriptor>> =
            (0..self.pipeline.producers).map(|_| VecDeque::new()).collect();
        for (index, descriptor) in descriptors.into_iter().enumerate() {
            sources[index % self.pipeline.producers].push_back(descriptor);
        }

        let producers: Vec<Box<dyn Producer<BuildWorkItem>>> = sources
            .into_iter()
            .map(|pending| {
                Box::new(BuildProducer {
                    pending,
                    fetcher: Arc::clone(&self.fetcher),
                    parser: Arc::clone(&self.parser),
                    cache: Arc::clone(&cache),
                    progress: Arc::clone(&progress),
                }) as Box<dyn Producer<BuildWorkItem>>
            })
            .collect();

        let consumers: Vec<Box<dyn Consumer<BuildWorkItem>>> = (0..self.pipeline.consumers)
            .map(|_| {
                Box::new(BuildConsumer {
                    details: Arc::clone(&self.details),
                    cache: Arc::clone(&cache),
                    root: Arc::clone(&root),
                }) as Box<dyn Consumer<BuildWorkItem>>
            })
            .collect();

        let pipeline = Pipeline::new(self.pipeline.queue_capacity, token, Arc::clone(&progress));
        pipeline.run(producers, consumers).await?;

        // Drained; this is the well-defined completion point for persistence.
        cache.lock().await.write()?;

        let root = Arc::try_unwrap(root)
            .map_err(|_| ScanError::Channel("pipeline kept a reference to the shared root".into()))?
            .into_inner();
        info!(nodes = root.node_count(), "build scan finished");
        Ok(root)
    }
}

/// Local project-scan orchestration: batched summaries over one tree.
pub struct ProjectScanService {
    summary: Arc<dyn VulnerabilitySummaryService>,
    batch_size: usize,
}

impl ProjectScanService {
    pub fn new(summary: Arc<dyn VulnerabilitySummaryService>, batch_size: usize) -> Self {
        Self {
            summary,
            batch_size,
        }
    }

    /// Fetch scan results for every component of `tree` (cache first, remote
    /// for the misses, in batches) and correlate them onto the tree.
    ///
    /// Cancellation is checked once per batch; a cancelled scan keeps the
    /// entries committed so far and still correlates what it has.
    pub async fn scan(
        &self,
        tree: &mut DependencyTree,
        cache: &mut ScanCache,
        token: &CancellationToken,
    ) -> Result<(), ScanError> {
        let mut missing: Vec<String> = Vec::new();
        for id in tree.walk(tree.root()) {
            let node = tree.node(id);
            if node.is_metadata() || node.component_id().is_empty() {
                continue;
            }
            let component_id = node.component_id().to_string();
            if !cache.contains(&component_id) && !missing.contains(&component_id) {
                missing.push(component_id);
            }
        }
        info!(components = missing.len(), batch = self.batch_size, "fetching scan summaries");

        let mut fetched: Vec<ComponentSummary> = Vec::new();
        for chunk in missing.chunks(self.batch_size) {
            if token.is_cancelled() {
                debug!("project scan cancelled, keeping committed entries");
                break;
            }
            match self.summary.summarize(chunk).await {
                Ok(components) => {
                    for component in &components {
                        cache.put(artifact_from_summary(component));
                    }
                    fetched.extend(components);
                }
                Err(e) => {
                    warn!(error = %e, "summary request failed, skipping batch");
                }
            }
        }

        Correlator::apply(tree, &fetched);
        self.apply_cached(tree, cache);

        cache.write()?;
        Ok(())
    }

    /// Attach cached results to nodes the fresh response did not cover.
    fn apply_cached(&self, tree: &mut DependencyTree, cache: &mut ScanCache) {
        let ids: Vec<_> = tree.walk(tree.root()).collect();
        for id in ids {
            let node = tree.node(id);
            if node.is_metadata() || !node.issues.is_empty() || !node.licenses.is_empty() {
                continue;
            }
            let component_id = node.component_id().to_string();
            if let Some(artifact) = cache.get(&component_id) {
                let issues = artifact.issues.clone();
                let licenses = artifact.licenses.clone();
                let node = tree.node_mut(id);
                node.issues = issues;
                node.licenses = licenses;
            }
        }
    }
}

fn artifact_from_summary(component: &ComponentSummary) -> ScannedArtifact {
    ScannedArtifact {
        general_info: GeneralInfo::new(component.component_id.clone())
            .with_sha1(component.sha1.clone())
            .with_sha256(component.sha256.clone()),
        issues: component.issues.iter().cloned().collect(),
        licenses: component.licenses.iter().cloned().collect(),
    }
}
