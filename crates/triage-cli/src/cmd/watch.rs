use crate::cmd::list::{render, Layout};
use crate::context::{block_on, Context, Options};
use std::time::Duration;
use triage_core::{CacheEngine, TriageError, ViewDefinition};

/// Re-render a view every `interval`, reading through one cache engine so the
/// TTL decides when Asana is actually queried.
pub fn run(
    opts: &Options,
    key: &str,
    interval: Duration,
    count: Option<u32>,
    refresh: bool,
) -> anyhow::Result<()> {
    let ctx = Context::load(opts)?;
    let view = ctx.views.get(key)?;
    let engine = ctx.engine()?;
    block_on(watch_loop(&ctx, view, &engine, interval, count, refresh))?
}

async fn watch_loop(
    ctx: &Context,
    view: &ViewDefinition,
    engine: &CacheEngine,
    interval: Duration,
    count: Option<u32>,
    refresh: bool,
) -> anyhow::Result<()> {
    let mut tick = 0u32;
    loop {
        tick += 1;
        tracing::debug!(tick, stale = engine.is_stale(), "watch tick");

        let snapshot = match engine.get_snapshot(refresh).await {
            Ok(snapshot) => snapshot,
            // Keep showing the last good data; the render flags it as stale.
            Err(TriageError::FetchFailed(cause)) if engine.fetched_at().is_some() => {
                eprintln!("warning: refresh failed: {cause}");
                engine.snapshot()
            }
            Err(e) => return Err(e.into()),
        };

        if tick > 1 && !ctx.json {
            println!();
        }
        render(ctx, view, &snapshot, Layout::Table)?;

        if count.is_some_and(|n| tick >= n) {
            return Ok(());
        }
        tokio::time::sleep(interval).await;
    }
}
