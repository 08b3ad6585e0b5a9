//! LBC International: daily schedule pages parsed from visible page text.
//!
//! The listing carries no useful markup structure, so the page is
//! flattened to text lines and scanned for the repeating block shape:
//!
//! ```text
//! 19:30
//! Duration: 35 min
//! Ma Fi Metlo
//! Comedy panel, season premiere.
//! ```
//!
//! The description line is optional. A small state machine walks the
//! lines, treats incomplete blocks as noise, and rescans the line after a
//! finished block so back-to-back blocks are all recognized.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::fetch;
use crate::localtime;
use crate::model::{Programme, DEFAULT_LANGUAGE};
use crate::observe::{GuideObserver, NoopObserver};
use crate::sanitize;
use crate::sources::{ProgrammeSource, ScheduleWindow};

pub const DEFAULT_BASE_URL: &str = "https://www.lbcgroup.tv";

static RE_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("time regex"));
static RE_DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Duration:\s*(\d+)\s*min").expect("duration regex"));
static RE_DURATION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Duration:").expect("duration marker regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// One recognized listing block, before timezone resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawScheduleBlock {
    pub hour: u32,
    pub minute: u32,
    pub duration_min: u32,
    pub title: String,
    pub description: Option<String>,
}

/// Strict time token: the whole line is `H:MM` or `HH:MM` with hour 0-24
/// (24 is the upstream end-of-day convention) and minute 0-59.
fn parse_time_token(line: &str) -> Option<(u32, u32)> {
    let caps = RE_TIME.captures(line)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    if hour > 24 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Shape-only time check used by the description guard. `27:95` still
/// "looks like" a time and therefore ends a block.
fn looks_like_time(line: &str) -> bool {
    RE_TIME.is_match(line)
}

/// Duration marker anywhere in the line, e.g. `Duration: 35 min`.
fn parse_duration_marker(line: &str) -> Option<u32> {
    RE_DURATION.captures(line)?[1].parse().ok()
}

enum Scan {
    SeekTime,
    ExpectDuration { start: usize, hour: u32, minute: u32 },
    ExpectTitle { start: usize, hour: u32, minute: u32, duration_min: u32 },
    MaybeDescription { block: RawScheduleBlock },
}

/// Scan normalized text lines for schedule blocks.
///
/// Recognition needs a strict time line immediately followed by a duration
/// line and a non-empty title line. An optional fourth line becomes the
/// description unless it looks like the next time token or another
/// duration marker. Anything that breaks the shape is skipped as noise.
pub fn extract_blocks(lines: &[String]) -> Vec<RawScheduleBlock> {
    let mut blocks = Vec::new();
    let mut state = Scan::SeekTime;
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx].as_str();
        match state {
            Scan::SeekTime => {
                if let Some((hour, minute)) = parse_time_token(line) {
                    state = Scan::ExpectDuration { start: idx, hour, minute };
                }
                idx += 1;
            }
            Scan::ExpectDuration { start, hour, minute } => match parse_duration_marker(line) {
                Some(duration_min) => {
                    state = Scan::ExpectTitle { start, hour, minute, duration_min };
                    idx += 1;
                }
                None => {
                    // Candidate time was noise; this line is rescanned as a
                    // fresh candidate.
                    state = Scan::SeekTime;
                }
            },
            Scan::ExpectTitle { start, hour, minute, duration_min } => {
                let title = line.trim();
                if title.is_empty() {
                    // Incomplete block; resume right after its time line.
                    state = Scan::SeekTime;
                    idx = start + 1;
                } else {
                    state = Scan::MaybeDescription {
                        block: RawScheduleBlock {
                            hour,
                            minute,
                            duration_min,
                            title: title.to_string(),
                            description: None,
                        },
                    };
                    idx += 1;
                }
            }
            Scan::MaybeDescription { mut block } => {
                // A line shaped like a time token or carrying a duration
                // marker belongs to the next block, not this description.
                // Either way the line is rescanned, so back-to-back blocks
                // are not skipped.
                if !looks_like_time(line) && !RE_DURATION_MARKER.is_match(line) {
                    block.description = Some(line.to_string());
                }
                blocks.push(block);
                state = Scan::SeekTime;
            }
        }
    }

    // Input ended right after a title line; the block still counts.
    if let Scan::MaybeDescription { block } = state {
        blocks.push(block);
    }

    blocks
}

/// Flatten a schedule page into trimmed, whitespace-normalized visible
/// text lines. Empty lines are dropped.
pub fn visible_text_lines(html: &str) -> Vec<String> {
    static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("body selector"));

    let doc = Html::parse_document(html);
    let Some(body) = doc.select(&BODY).next() else {
        return Vec::new();
    };
    let text: String = body.text().collect();
    text.lines()
        .map(|line| RE_WS.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Daily listing pages, one fetch per civil date in the window.
pub struct LbcSource {
    channel_id: String,
    channel_num: u32,
    base_url: String,
    language: String,
    client: Client,
    observer: Arc<dyn GuideObserver>,
}

impl LbcSource {
    pub fn new(channel_id: impl Into<String>, channel_num: u32) -> Result<Self> {
        Ok(Self {
            channel_id: channel_id.into(),
            channel_num,
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

    fn day_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/schedule-channels-date/{}/{}/en",
            self.base_url,
            self.channel_num,
            date.format("%Y/%m/%d"),
        )
    }

    /// Resolve one day's blocks into programmes. Blocks whose title
    /// sanitizes to nothing are dropped rather than defaulted, and
    /// zero-length blocks are treated as listing noise.
    pub fn day_programmes(&self, date: NaiveDate, tz: Tz, blocks: &[RawScheduleBlock]) -> Vec<Programme> {
        let mut out = Vec::with_capacity(blocks.len());
        for block in blocks {
            let Some(title) = sanitize::sanitize(&block.title) else {
                continue;
            };
            if block.duration_min == 0 {
                tracing::debug!(%date, title = %block.title, "zero-length block dropped");
                continue;
            }
            let Some(start) = localtime::resolve_local(tz, date, block.hour, block.minute) else {
                tracing::debug!(%date, hour = block.hour, minute = block.minute, "unresolvable wall time dropped");
                continue;
            };
            out.push(Programme {
                channel_id: self.channel_id.clone(),
                title,
                description: block.description.as_deref().and_then(sanitize::sanitize),
                start,
                stop: start + Duration::minutes(i64::from(block.duration_min)),
                language: self.language.clone(),
            });
        }
        out
    }
}

#[async_trait]
impl ProgrammeSource for LbcSource {
    async fn collect(&self, window: &ScheduleWindow) -> Result<Vec<Programme>> {
        let mut programmes = Vec::new();
        for &date in &window.dates {
            let url = self.day_url(date);
            let html = fetch::get_text(&self.client, &url).await?;
            let lines = visible_text_lines(&html);
            let blocks = extract_blocks(&lines);
            self.observer.text_blocks(date, &blocks);

            let day = self.day_programmes(date, window.tz, &blocks);
            tracing::debug!(%date, blocks = blocks.len(), programmes = day.len(), "lbc day parsed");
            programmes.extend(day);
        }
        self.observer.source_output(self.name(), &programmes);
        tracing::info!(days = window.dates.len(), programmes = programmes.len(), "lbc schedule collected");
        Ok(programmes)
    }

    fn name(&self) -> &'static str {
        "lbc"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Beirut;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn block(hour: u32, minute: u32, duration_min: u32, title: &str, desc: Option<&str>) -> RawScheduleBlock {
        RawScheduleBlock {
            hour,
            minute,
            duration_min,
            title: title.to_string(),
            description: desc.map(str::to_string),
        }
    }

    #[test]
    fn recognizes_a_full_block_with_description() {
        let got = extract_blocks(&lines(&[
            "19:30",
            "Duration: 35 min",
            "Ma Fi Metlo",
            "Comedy panel, season premiere.",
        ]));
        assert_eq!(got, [block(19, 30, 35, "Ma Fi Metlo", Some("Comedy panel, season premiere."))]);
    }

    #[test]
    fn next_time_line_is_not_swallowed_as_description() {
        // The line after the title is the next block's time token; it must
        // terminate this block and still be seen as a candidate.
        let got = extract_blocks(&lines(&["07:00", "Duration: 30 min", "Morning Show", "09:00"]));
        assert_eq!(got, [block(7, 0, 30, "Morning Show", None)]);
    }

    #[test]
    fn back_to_back_blocks_are_all_recognized() {
        let got = extract_blocks(&lines(&[
            "07:00",
            "Duration: 60 min",
            "News",
            "08:00",
            "Duration: 30 min",
            "Cartoons",
            "08:30",
            "Duration: 90 min",
            "Movie",
            "A family adventure.",
        ]));
        assert_eq!(
            got,
            [
                block(7, 0, 60, "News", None),
                block(8, 0, 30, "Cartoons", None),
                block(8, 30, 90, "Movie", Some("A family adventure.")),
            ]
        );
    }

    #[test]
    fn consumed_description_line_is_still_rescanned() {
        // A description that itself looks like garbage text followed
        // immediately by another block; the scanner resumes on the
        // description line and still finds the block after it.
        let got = extract_blocks(&lines(&[
            "10:00",
            "Duration: 30 min",
            "Show A",
            "About things.",
            "11:00",
            "Duration: 15 min",
            "Show B",
        ]));
        assert_eq!(
            got,
            [
                block(10, 0, 30, "Show A", Some("About things.")),
                block(11, 0, 15, "Show B", None),
            ]
        );
    }

    #[test]
    fn duration_marker_never_becomes_a_description() {
        let got = extract_blocks(&lines(&[
            "10:00",
            "Duration: 5 min",
            "Filler",
            "Duration: 99 min",
        ]));
        assert_eq!(got, [block(10, 0, 5, "Filler", None)]);
    }

    #[test]
    fn candidate_without_duration_line_is_noise() {
        let got = extract_blocks(&lines(&[
            "12:00",
            "Not a duration",
            "13:00",
            "Duration: 10 min",
            "Real Show",
        ]));
        assert_eq!(got, [block(13, 0, 10, "Real Show", None)]);
    }

    #[test]
    fn time_tokens_must_be_whole_line_and_in_range() {
        assert!(parse_time_token("19:30").is_some());
        assert_eq!(parse_time_token("24:00"), Some((24, 0)));
        assert_eq!(parse_time_token("25:00"), None);
        assert_eq!(parse_time_token("19:60"), None);
        assert_eq!(parse_time_token("19:30 extra"), None);
        assert_eq!(parse_time_token("at 19:30"), None);

        // Shape-only guard accepts out-of-range digits.
        assert!(looks_like_time("27:95"));
        assert!(!looks_like_time("27:95 pm"));
    }

    #[test]
    fn duration_matches_anywhere_case_insensitively() {
        assert_eq!(parse_duration_marker("Duration: 35 min"), Some(35));
        assert_eq!(parse_duration_marker("duration:120min"), Some(120));
        assert_eq!(parse_duration_marker("Approx. Duration: 5 MIN left"), Some(5));
        assert_eq!(parse_duration_marker("Duration: soon"), None);
        // Digits beyond u32 do not panic, the candidate just fails.
        assert_eq!(parse_duration_marker("Duration: 99999999999999999999 min"), None);
    }

    #[test]
    fn block_at_end_of_input_without_description_counts() {
        let got = extract_blocks(&lines(&["23:15", "Duration: 45 min", "Late Night"]));
        assert_eq!(got, [block(23, 15, 45, "Late Night", None)]);

        // A dangling time or time+duration pair does not.
        assert!(extract_blocks(&lines(&["23:15"])).is_empty());
        assert!(extract_blocks(&lines(&["23:15", "Duration: 45 min"])).is_empty());
    }

    #[test]
    fn flattens_page_text_into_normalized_lines() {
        let html = r#"
            <html><head><title>Schedule</title></head><body>
            <nav>Home</nav>
            <div class="grid">
              <span>19:30</span>
              <p>Duration:   35    min</p>
              <h3>  Ma   Fi Metlo </h3>
              <p>Comedy panel.</p>
            </div>
            </body></html>
        "#;
        let lines = visible_text_lines(html);
        assert_eq!(lines, ["Home", "19:30", "Duration: 35 min", "Ma Fi Metlo", "Comedy panel."]);
    }

    #[test]
    fn flattened_page_feeds_the_extractor() {
        let html = "<body><div>18:00</div>\n<div>Duration: 30 min</div>\n<div>Evening News</div></body>";
        let blocks = extract_blocks(&visible_text_lines(html));
        assert_eq!(blocks, [block(18, 0, 30, "Evening News", None)]);
    }

    #[test]
    fn day_url_is_zero_padded() {
        let source = LbcSource::new("lbcinternational.lb", 1).expect("client builds");
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).expect("valid date");
        assert_eq!(
            source.day_url(date),
            "https://www.lbcgroup.tv/schedule-channels-date/1/2026/03/05/en"
        );
    }

    #[test]
    fn day_programmes_apply_duration_and_sanitation_policies() {
        let source = LbcSource::new("lbcinternational.lb", 1).expect("client builds");
        let date = NaiveDate::from_ymd_opt(2026, 2, 20).expect("valid date");
        let blocks = [
            block(19, 30, 35, "Ma Fi Metlo", Some("<p>Comedy &amp; panel</p>")),
            block(20, 5, 0, "Zero Length", None),
            block(21, 0, 30, "<i></i>", None),
        ];

        let got = source.day_programmes(date, Beirut, &blocks);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].title, "Ma Fi Metlo");
        assert_eq!(got[0].description.as_deref(), Some("Comedy & panel"));
        assert_eq!(got[0].channel_id, "lbcinternational.lb");
        assert_eq!(localtime::format_xmltv(&got[0].start), "20260220193000 +0200");
        assert_eq!(localtime::format_xmltv(&got[0].stop), "20260220200500 +0200");
    }

    #[test]
    fn end_of_day_block_rolls_into_next_date() {
        let source = LbcSource::new("lbcinternational.lb", 1).expect("client builds");
        let date = NaiveDate::from_ymd_opt(2026, 2, 20).expect("valid date");
        let got = source.day_programmes(date, Beirut, &[block(24, 0, 30, "Overnight", None)]);
        assert_eq!(got.len(), 1);
        assert_eq!(localtime::format_xmltv(&got[0].start), "20260221000000 +0200");
    }
}
