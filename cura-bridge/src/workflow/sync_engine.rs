//! Batch synchronization engine
//!
//! Drives pagination over the asset store, submits each item's file to the
//! analysis service, and writes the classification back as tags, a star
//! rating, and an annotation. Items are processed strictly in order, one at
//! a time; one item's failure never aborts the batch.

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::types::{AnalysisResult, Analyzer, AssetItem, AssetStore};
use crate::workflow::summary::{BatchSummary, SkipReason, SyncOutcome, UpdateReport};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Map an aesthetic score (0-10) to a star rating (0-5)
///
/// Total over all inputs (NaN maps to 0) and monotonic non-decreasing.
/// Band edges are closed on the lower end; 0 means "no rating write".
pub fn map_score_to_rating(score: f64) -> u8 {
    if score >= 8.0 {
        5
    } else if score >= 7.0 {
        4
    } else if score >= 6.0 {
        3
    } else if score >= 5.0 {
        2
    } else if score >= 4.0 {
        1
    } else {
        0
    }
}

/// Merge service tags with detected subjects and visual style
///
/// Set semantics: duplicates collapse and input order carries no meaning
/// downstream. The result is sorted so output is deterministic.
pub fn merge_tags(result: &AnalysisResult) -> Vec<String> {
    let mut tags: BTreeSet<String> = result.tags.iter().cloned().collect();

    if let Some(analysis) = &result.analysis {
        if let Some(subjects) = &analysis.subjects {
            tags.extend(subjects.iter().cloned());
        }
        if let Some(style) = &analysis.visual_style {
            tags.insert(style.clone());
        }
    }

    tags.into_iter().collect()
}

/// Throttle between page fetches
///
/// The first wait returns immediately; each later wait blocks until the
/// minimum interval since the previous fetch has elapsed. This throttles
/// load on the asset store only - the analysis service is already bounded
/// by its per-call timeout and by being called once per item.
struct PageThrottle {
    last_fetch: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl PageThrottle {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_fetch: Mutex::new(None),
            min_interval,
        }
    }

    async fn wait(&self) {
        let mut last = self.last_fetch.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!("Page throttle: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Batch synchronization engine
///
/// Explicitly constructed with injected service implementations; owns the
/// running counters for exactly one batch at a time. Generic over the
/// service traits so tests can substitute in-memory fakes.
pub struct SyncEngine<S, A> {
    store: S,
    analyzer: A,
    config: BridgeConfig,
    throttle: PageThrottle,
}

impl<S: AssetStore, A: Analyzer> SyncEngine<S, A> {
    /// Create an engine over the given service implementations
    pub fn new(store: S, analyzer: A, config: BridgeConfig) -> Self {
        let throttle = PageThrottle::new(config.page_delay);
        Self {
            store,
            analyzer,
            config,
            throttle,
        }
    }

    /// Run one batch
    ///
    /// `limit` bounds the number of updated items; `process_all` ignores the
    /// limit and runs until the store is exhausted. The only error is the
    /// liveness precondition - everything below it is isolated per item and
    /// tallied in the summary.
    pub async fn run_batch(&self, limit: usize, process_all: bool) -> Result<BatchSummary> {
        info!("Connecting to asset store at {}", self.config.asset_store_url);
        let Some(service) = self.store.service_info().await else {
            return Err(BridgeError::StoreUnavailable(
                self.config.asset_store_url.clone(),
            ));
        };
        match &service.version {
            Some(version) => info!(version = %version, "Connected to asset store"),
            None => info!("Connected to asset store"),
        }

        let target = if process_all { None } else { Some(limit) };
        let mut summary = BatchSummary::default();
        if target == Some(0) {
            return Ok(summary);
        }
        let mut updated_count = 0usize;
        let mut offset = 0usize;

        loop {
            self.throttle.wait().await;

            let items = self
                .store
                .list_items(self.config.batch_size, offset)
                .await;
            if items.is_empty() {
                debug!(offset, "No more items");
                break;
            }

            for item in &items {
                let outcome = self.process_item(item).await;
                if matches!(outcome, SyncOutcome::Updated(_)) {
                    updated_count += 1;
                }
                summary.record(&outcome);

                if let Some(target) = target {
                    if updated_count >= target {
                        info!(updated = updated_count, "Reached item limit, stopping");
                        return Ok(summary);
                    }
                }
            }

            offset += self.config.batch_size;
        }

        Ok(summary)
    }

    /// Per-item pipeline: resolve file, analyze, write back
    async fn process_item(&self, item: &AssetItem) -> SyncOutcome {
        let Some(file_path) = self.store.item_file_path(&item.id).await else {
            warn!(item = %item.name, "Skipping item (no file path found)");
            return SyncOutcome::Skipped(SkipReason::NoFilePath);
        };

        info!(item = %item.name, "Processing");

        let bytes = match tokio::fs::read(&file_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(item = %item.name, path = %file_path.display(), "Failed to read file: {}", e);
                return SyncOutcome::Failed(format!(
                    "read {} failed: {}",
                    file_path.display(),
                    e
                ));
            }
        };

        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();

        let result = match self.analyzer.analyze(&file_name, bytes).await {
            Ok(Some(result)) => result,
            Ok(None) => {
                info!(item = %item.name, "Skipped (low score or filtered)");
                return SyncOutcome::Skipped(SkipReason::EmptyResult);
            }
            Err(e) => {
                error!(item = %item.name, "Analysis failed: {}", e);
                return SyncOutcome::Failed(e.to_string());
            }
        };

        SyncOutcome::Updated(self.apply_result(item, &result).await)
    }

    /// Write tags, rating, and annotation derived from one analysis result
    ///
    /// The three writes are independent: an earlier failure never blocks a
    /// later write. Failures are recorded in the report rather than
    /// reclassifying the item.
    async fn apply_result(&self, item: &AssetItem, result: &AnalysisResult) -> UpdateReport {
        let mut report = UpdateReport::default();

        if let Some(summary) = result.analysis.as_ref().and_then(|a| a.summary.as_deref()) {
            let ok = self.store.update_annotation(&item.id, summary).await;
            if ok {
                info!(item = %item.name, "Updated annotation");
            } else {
                warn!(item = %item.name, "Annotation write failed");
            }
            report.annotation_written = Some(ok);
        }

        let tags = merge_tags(result);
        report.tag_count = tags.len();
        if !tags.is_empty() {
            let ok = self.store.update_tags(&item.id, &tags).await;
            if ok {
                info!(item = %item.name, count = tags.len(), "Added tags");
            } else {
                warn!(item = %item.name, "Tag write failed");
            }
            report.tags_written = Some(ok);
        }

        let rating = map_score_to_rating(result.aesthetic);
        report.rating = rating;
        if rating > 0 {
            let ok = self.store.update_rating(&item.id, rating).await;
            if ok {
                info!(item = %item.name, rating, score = result.aesthetic, "Set rating");
            } else {
                warn!(item = %item.name, "Rating write failed");
            }
            report.rating_written = Some(ok);
        }

        report
    }
}
