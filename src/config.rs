//! Guide configuration: channels, window, zone, upstream endpoints.
//!
//! Resolution order: `$EPG_CONFIG_PATH` if set, then `config/epg.toml`,
//! then `config/epg.json`. TOML and JSON carry the same shape.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::model::Channel;
use crate::sources::{lbc, mtv};

const ENV_PATH: &str = "EPG_CONFIG_PATH";
const DEFAULT_TOML: &str = "config/epg.toml";
const DEFAULT_JSON: &str = "config/epg.json";

#[derive(Debug, Clone, Deserialize)]
pub struct GuideConfig {
    /// Zone every wall-clock time in both feeds is interpreted in.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    /// Civil dates to cover, starting from today in `timezone`.
    #[serde(default = "default_days_ahead")]
    pub days_ahead: u32,
    /// Where the finished document is written.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Value of the document's generator-info-name attribute.
    #[serde(default = "default_generator")]
    pub generator: String,
    /// Language tag stamped on titles and descriptions.
    #[serde(default = "default_language")]
    pub language: String,
    /// Channel declarations emitted ahead of the programmes.
    #[serde(default)]
    pub channels: Vec<Channel>,
    pub mtv: MtvConfig,
    pub lbc: LbcConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MtvConfig {
    pub channel_id: String,
    #[serde(default = "default_mtv_base")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LbcConfig {
    pub channel_id: String,
    /// Channel number segment of the daily listing URL.
    #[serde(default = "default_lbc_channel_num")]
    pub channel_num: u32,
    #[serde(default = "default_lbc_base")]
    pub base_url: String,
}

fn default_timezone() -> Tz {
    chrono_tz::Asia::Beirut
}

fn default_days_ahead() -> u32 {
    7
}

fn default_output() -> PathBuf {
    PathBuf::from("docs/epg.xml")
}

fn default_generator() -> String {
    "Lebanon EPG (MTV + LBCI) - Asia/Beirut".to_string()
}

fn default_language() -> String {
    crate::model::DEFAULT_LANGUAGE.to_string()
}

fn default_mtv_base() -> String {
    mtv::DEFAULT_BASE_URL.to_string()
}

fn default_lbc_base() -> String {
    lbc::DEFAULT_BASE_URL.to_string()
}

fn default_lbc_channel_num() -> u32 {
    1
}

impl GuideConfig {
    /// Load configuration using the env override, then repo-local files.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(ENV_PATH) {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(anyhow!("{ENV_PATH} points to a non-existent file: {}", path.display()));
            }
            return Self::load_from(&path);
        }

        for candidate in [DEFAULT_TOML, DEFAULT_JSON] {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from(path);
            }
        }

        Err(anyhow!(
            "no configuration found; set {ENV_PATH} or provide {DEFAULT_TOML}"
        ))
    }

    /// Load from an explicit path; format picked by extension, TOML default.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let cfg: Self = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("parsing json config {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("parsing toml config {}", path.display()))?
        };
        cfg.validate()
    }

    fn validate(self) -> Result<Self> {
        if self.mtv.channel_id.trim().is_empty() {
            return Err(anyhow!("mtv.channel_id must be non-empty"));
        }
        if self.lbc.channel_id.trim().is_empty() {
            return Err(anyhow!("lbc.channel_id must be non-empty"));
        }
        if let Some(bad) = self
            .channels
            .iter()
            .find(|c| c.id.trim().is_empty() || c.name.trim().is_empty())
        {
            return Err(anyhow!("channel entry needs id and name (got id {:?})", bad.id));
        }
        Ok(self)
    }
}
