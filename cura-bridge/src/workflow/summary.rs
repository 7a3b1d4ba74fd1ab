//! Per-item outcomes and the batch summary

use serde::Serialize;
use std::fmt;

/// Why an item was skipped without any write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The store could not resolve a local file for the item
    NoFilePath,
    /// The analysis service filtered the item out
    EmptyResult,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoFilePath => write!(f, "no file path"),
            SkipReason::EmptyResult => write!(f, "filtered or empty result"),
        }
    }
}

/// Per-sub-write status for an updated item
///
/// `None` means the write was not attempted (nothing to write); `Some(ok)`
/// records the attempt's result. The item still classifies as updated when
/// a sub-write fails, but the failure is visible here and tallied in the
/// batch summary instead of disappearing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateReport {
    /// Size of the deduplicated tag set
    pub tag_count: usize,
    /// Mapped star rating (0 = no rating write)
    pub rating: u8,
    /// Tag write status
    pub tags_written: Option<bool>,
    /// Rating write status
    pub rating_written: Option<bool>,
    /// Annotation write status
    pub annotation_written: Option<bool>,
}

impl UpdateReport {
    /// True when at least one attempted write failed
    pub fn has_failed_write(&self) -> bool {
        [self.tags_written, self.rating_written, self.annotation_written]
            .iter()
            .any(|w| *w == Some(false))
    }
}

/// What the pipeline did with one asset
#[derive(Debug, Clone, Serialize)]
pub enum SyncOutcome {
    /// Analysis succeeded and write-back was attempted
    Updated(UpdateReport),
    /// Nothing to do for this item
    Skipped(SkipReason),
    /// Analysis or file access failed; the batch continues
    Failed(String),
}

/// Aggregated counts for one batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    /// Items whose analysis succeeded and write-back was attempted
    pub updated: usize,
    /// Items with nothing to do
    pub skipped: usize,
    /// Items whose analysis or file access failed
    pub failed: usize,
    /// Updated items where at least one sub-write failed
    pub partial_writes: usize,
}

impl BatchSummary {
    /// Fold one item's outcome into the tallies
    pub fn record(&mut self, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Updated(report) => {
                self.updated += 1;
                if report.has_failed_write() {
                    self.partial_writes += 1;
                }
            }
            SyncOutcome::Skipped(_) => self.skipped += 1,
            SyncOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Total items the batch looked at
    pub fn total(&self) -> usize {
        self.updated + self.skipped + self.failed
    }

    pub fn display_string(&self) -> String {
        if self.partial_writes > 0 {
            format!(
                "{} updated ({} with failed writes), {} skipped, {} failed",
                self.updated, self.partial_writes, self.skipped, self.failed
            )
        } else {
            format!(
                "{} updated, {} skipped, {} failed",
                self.updated, self.skipped, self.failed
            )
        }
    }
}
