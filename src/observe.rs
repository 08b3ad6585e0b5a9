//! Injected diagnostics.
//!
//! Sources report their intermediate parse state through a `GuideObserver`
//! instead of reading environment switches themselves. The binary decides
//! which implementation to inject.

use chrono::NaiveDate;

use crate::model::Programme;
use crate::sources::lbc::RawScheduleBlock;
use crate::sources::mtv::ApiScheduleItem;

/// Callback surface for inspecting what each source parsed before the
/// results are folded into the canonical model. Every hook defaults to a
/// no-op, so implementors override only what they care about.
pub trait GuideObserver: Send + Sync {
    /// Blocks recognized in one day's listing text.
    fn text_blocks(&self, _date: NaiveDate, _blocks: &[RawScheduleBlock]) {}

    /// Raw items returned by the schedule API for one day.
    fn api_items(&self, _date: NaiveDate, _items: &[ApiScheduleItem]) {}

    /// A source finished its whole window.
    fn source_output(&self, _source: &str, _programmes: &[Programme]) {}
}

/// Default observer: ignores everything.
pub struct NoopObserver;

impl GuideObserver for NoopObserver {}

/// Dumps intermediate state at debug level.
pub struct TracingObserver;

impl GuideObserver for TracingObserver {
    fn text_blocks(&self, date: NaiveDate, blocks: &[RawScheduleBlock]) {
        tracing::debug!(%date, count = blocks.len(), ?blocks, "extracted listing blocks");
    }

    fn api_items(&self, date: NaiveDate, items: &[ApiScheduleItem]) {
        tracing::debug!(%date, count = items.len(), ?items, "raw api items");
    }

    fn source_output(&self, source: &str, programmes: &[Programme]) {
        tracing::debug!(source, count = programmes.len(), "source finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingObserver {
        blocks_seen: AtomicUsize,
    }

    impl GuideObserver for CountingObserver {
        fn text_blocks(&self, _date: NaiveDate, blocks: &[RawScheduleBlock]) {
            self.blocks_seen.fetch_add(blocks.len(), Ordering::Relaxed);
        }
    }

    #[test]
    fn hooks_default_to_noops_and_overrides_fire() {
        let observer = Arc::new(CountingObserver { blocks_seen: AtomicUsize::new(0) });
        let date = NaiveDate::from_ymd_opt(2026, 2, 20).expect("valid date");

        let blocks = vec![RawScheduleBlock {
            hour: 7,
            minute: 0,
            duration_min: 30,
            title: "Morning Show".to_string(),
            description: None,
        }];
        observer.text_blocks(date, &blocks);
        observer.api_items(date, &[]); // default no-op
        observer.source_output("mtv", &[]); // default no-op

        assert_eq!(observer.blocks_seen.load(Ordering::Relaxed), 1);
    }
}
