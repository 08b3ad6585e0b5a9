//! EPG Builder - Binary Entrypoint
//! Fetches both broadcasters' schedules for the coming week, merges them,
//! and writes the XMLTV guide document.
//!
//! See `README.md` for configuration and `config/epg.toml` for an example.

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use epg_builder::observe::{GuideObserver, NoopObserver, TracingObserver};
use epg_builder::{build_guide, GuideConfig};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("epg_builder=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Intermediate-state dumping is opt-in via EPG_DEBUG_DUMP=1; the pipeline
/// itself never reads the environment.
fn pick_observer() -> Arc<dyn GuideObserver> {
    let dump = std::env::var("EPG_DEBUG_DUMP").ok().is_some_and(|v| v == "1");
    if dump {
        Arc::new(TracingObserver)
    } else {
        Arc::new(NoopObserver)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op elsewhere.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = GuideConfig::load()?;
    let xml = build_guide(&cfg, pick_observer()).await?;

    if let Some(parent) = cfg.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    fs::write(&cfg.output, &xml)
        .with_context(|| format!("writing {}", cfg.output.display()))?;

    tracing::info!(path = %cfg.output.display(), bytes = xml.len(), "guide written");
    Ok(())
}
