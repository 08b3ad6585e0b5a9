//! Canonical programme model shared by every schedule source.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Deserialize;

/// Language tag applied to titles and descriptions unless configured.
pub const DEFAULT_LANGUAGE: &str = "en";

/// One scheduled broadcast, source-independent.
///
/// `start`/`stop` are resolved instants, not wall-clock strings. Ordering
/// and comparisons always go through the instant, so entries from zones
/// with different offsets interleave correctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Programme {
    pub channel_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Tz>,
    pub stop: DateTime<Tz>,
    pub language: String,
}

/// Static channel descriptor, supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Concatenate per-source outputs and order by start instant.
///
/// The sort is stable, so programmes with equal starts keep the order the
/// sources were gathered in.
pub fn merge(per_source: Vec<Vec<Programme>>) -> Vec<Programme> {
    let mut all: Vec<Programme> = per_source.into_iter().flatten().collect();
    all.sort_by(|a, b| a.start.cmp(&b.start));
    all
}
