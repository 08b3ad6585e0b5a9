//! Guide assembly: run every source over the window, merge, serialize.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;

use crate::config::GuideConfig;
use crate::model::{self, Programme};
use crate::observe::GuideObserver;
use crate::sources::lbc::LbcSource;
use crate::sources::mtv::MtvSource;
use crate::sources::{ProgrammeSource, ScheduleWindow};
use crate::xmltv;

/// Collect from all sources concurrently.
///
/// Handles are awaited in spawn order, so per-source outputs come back in
/// a deterministic sequence regardless of which finishes first. Any source
/// failure fails the whole build.
pub async fn collect_all(
    sources: Vec<Box<dyn ProgrammeSource>>,
    window: &ScheduleWindow,
) -> Result<Vec<Vec<Programme>>> {
    let handles: Vec<(&'static str, JoinHandle<Result<Vec<Programme>>>)> = sources
        .into_iter()
        .map(|source| {
            let window = window.clone();
            let name = source.name();
            (name, tokio::spawn(async move { source.collect(&window).await }))
        })
        .collect();

    let mut per_source = Vec::with_capacity(handles.len());
    for (name, handle) in handles {
        let programmes = handle
            .await
            .with_context(|| format!("{name} source task panicked"))?
            .with_context(|| format!("{name} source failed"))?;
        per_source.push(programmes);
    }
    Ok(per_source)
}

/// Build the complete guide document for the configured window.
pub async fn build_guide(cfg: &GuideConfig, observer: Arc<dyn GuideObserver>) -> Result<String> {
    let window = ScheduleWindow::next_days(cfg.timezone, cfg.days_ahead);
    let sources = build_sources(cfg, observer)?;

    let per_source = collect_all(sources, &window).await?;
    let programmes = model::merge(per_source);
    tracing::info!(
        programmes = programmes.len(),
        channels = cfg.channels.len(),
        days = window.dates.len(),
        "guide merged"
    );

    xmltv::serialize(&cfg.channels, &programmes, &cfg.generator)
}

fn build_sources(cfg: &GuideConfig, observer: Arc<dyn GuideObserver>) -> Result<Vec<Box<dyn ProgrammeSource>>> {
    let mtv = MtvSource::new(cfg.mtv.channel_id.clone())?
        .with_base_url(cfg.mtv.base_url.clone())
        .with_language(cfg.language.clone())
        .with_observer(observer.clone());
    let lbc = LbcSource::new(cfg.lbc.channel_id.clone(), cfg.lbc.channel_num)?
        .with_base_url(cfg.lbc.base_url.clone())
        .with_language(cfg.language.clone())
        .with_observer(observer);
    Ok(vec![Box::new(mtv), Box::new(lbc)])
}
