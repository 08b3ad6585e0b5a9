//! MTV Lebanon: weekday-indexed JSON schedule API.
//!
//! `{base}/daysand` maps weekday names to schedule ids; `{base}/days/{id}`
//! returns that day's items. Items carry start times only, so stop times
//! are inferred from the next entry, with a one-hour fallback for the last
//! entry of a day.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use crate::fetch;
use crate::localtime;
use crate::model::{Programme, DEFAULT_LANGUAGE};
use crate::observe::{GuideObserver, NoopObserver};
use crate::sanitize;
use crate::sources::{ProgrammeSource, ScheduleWindow};

pub const DEFAULT_BASE_URL: &str = "https://www.mtv.com.lb/en/api/schedule";

/// Title used when the API omits a programme name.
pub const PLACEHOLDER_TITLE: &str = "Unknown";

const FALLBACK_STOP_MINUTES: i64 = 60;

static RE_LEADING_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})").expect("leading time regex"));

/// One `daysand` entry mapping a weekday title to its schedule id.
#[derive(Debug, Clone, Deserialize)]
pub struct DayIndexEntry {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Id")]
    pub id: u32,
}

/// One raw schedule item as served by `days/{id}`. Fields are optional
/// because the API pads placeholder rows with nulls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiScheduleItem {
    #[serde(rename = "Time", default)]
    pub time: Option<String>,
    #[serde(rename = "Program", default)]
    pub program: Option<ProgramInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramInfo {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}

/// Normalize one day's API items into programmes.
///
/// Items without a parseable leading `H:MM` token are dropped. The rest
/// are sorted by resolved start, then each stop is the next item's start;
/// the last item runs for one hour.
pub fn normalize_day(
    items: &[ApiScheduleItem],
    date: NaiveDate,
    tz: Tz,
    channel_id: &str,
    language: &str,
) -> Vec<Programme> {
    let mut parsed: Vec<(DateTime<Tz>, &ApiScheduleItem)> = items
        .iter()
        .filter_map(|item| {
            let raw = item.time.as_deref().unwrap_or("").trim();
            let caps = RE_LEADING_TIME.captures(raw)?;
            let hour = caps[1].parse().ok()?;
            let minute = caps[2].parse().ok()?;
            let start = localtime::resolve_local(tz, date, hour, minute)?;
            Some((start, item))
        })
        .collect();

    // Upstream order is not guaranteed and stop inference needs the real
    // sequence.
    parsed.sort_by_key(|(start, _)| *start);

    let mut out = Vec::with_capacity(parsed.len());
    for (i, (start, item)) in parsed.iter().enumerate() {
        let stop = match parsed.get(i + 1) {
            Some((next_start, _)) => *next_start,
            None => *start + Duration::minutes(FALLBACK_STOP_MINUTES),
        };
        let program = item.program.as_ref();
        let title = program
            .and_then(|p| p.name.as_deref())
            .and_then(sanitize::sanitize)
            .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string());
        let description = program
            .and_then(|p| p.description.as_deref())
            .and_then(sanitize::sanitize);

        out.push(Programme {
            channel_id: channel_id.to_string(),
            title,
            description,
            start: *start,
            stop,
            language: language.to_string(),
        });
    }
    out
}

/// Weekday-indexed schedule API, one id lookup then one fetch per date.
pub struct MtvSource {
    channel_id: String,
    base_url: String,
    language: String,
    client: Client,
    observer: Arc<dyn GuideObserver>,
}

impl MtvSource {
    pub fn new(channel_id: impl Into<String>) -> Result<Self> {
        Ok(Self {
            channel_id: channel_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            client: fetch::client()?,
            observer: Arc::new(NoopObserver),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn GuideObserver>) -> Self {
        self.observer = observer;
        self
    }

    async fn fetch_day_map(&self) -> Result<HashMap<String, u32>> {
        let url = format!("{}/daysand", self.base_url);
        let entries: Vec<DayIndexEntry> = fetch::get_json(&self.client, &url).await?;
        Ok(entries.into_iter().map(|e| (e.title, e.id)).collect())
    }

    async fn fetch_day(&self, day_id: u32) -> Result<Vec<ApiScheduleItem>> {
        let url = format!("{}/days/{}", self.base_url, day_id);
        fetch::get_json(&self.client, &url).await
    }
}

#[async_trait]
impl ProgrammeSource for MtvSource {
    async fn collect(&self, window: &ScheduleWindow) -> Result<Vec<Programme>> {
        let day_map = self.fetch_day_map().await?;
        let mut programmes = Vec::new();
        for &date in &window.dates {
            let weekday = date.format("%A").to_string();
            let Some(&day_id) = day_map.get(&weekday) else {
                tracing::warn!(%date, %weekday, "weekday missing from schedule index; day skipped");
                continue;
            };
            let items = self.fetch_day(day_id).await?;
            self.observer.api_items(date, &items);

            let day = normalize_day(&items, date, window.tz, &self.channel_id, &self.language);
            tracing::debug!(%date, items = items.len(), programmes = day.len(), "mtv day parsed");
            programmes.extend(day);
        }
        self.observer.source_output(self.name(), &programmes);
        tracing::info!(days = window.dates.len(), programmes = programmes.len(), "mtv schedule collected");
        Ok(programmes)
    }

    fn name(&self) -> &'static str {
        "mtv"
    }
}
