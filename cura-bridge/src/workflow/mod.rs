//! Batch synchronization workflow

pub mod summary;
pub mod sync_engine;

pub use summary::{BatchSummary, SkipReason, SyncOutcome, UpdateReport};
pub use sync_engine::{map_score_to_rating, merge_tags, SyncEngine};
