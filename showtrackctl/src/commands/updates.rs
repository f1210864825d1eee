use std::sync::Arc;

use anyhow::{Context, Result};
use showtrack_core::{
    infra::{PosterBlobStore, PosterCacheRoot},
    providers::HttpPosterLoader,
    updates::{ReconcileOutcome, RepairReport, UpdateReconciler},
};
use showtrack_model::{FeedEntry, UpdatesFeed};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::App;

pub async fn run(app: &App) -> Result<()> {
    let settings = app.tmdb_settings()?;
    let posters = HttpPosterLoader::new(&settings)
        .context("failed to build poster client")?
        .with_cache(PosterBlobStore::new(PosterCacheRoot::new(
            app.config.storage.poster_cache_dir(),
        )));
    let state = app.state();

    let reconciler = UpdateReconciler::new(
        app.context.clone(),
        app.config.reconcile_options(),
        app.catalog_source()?,
        Arc::new(posters),
        app.scheduler(),
        state.clone(),
        state,
    );

    let mut phases = reconciler.subscribe();
    let watcher = tokio::spawn(async move {
        while phases.changed().await.is_ok() {
            let phase = *phases.borrow_and_update();
            debug!(%phase, "update check");
        }
    });

    let outcome = reconciler.reconcile().await;
    drop(reconciler);
    join_watcher(watcher).await;

    match outcome? {
        ReconcileOutcome::Updates { feed, repair, .. } => {
            print_feed(&feed);
            print_repair(&repair);
        }
        ReconcileOutcome::NoUpdates { since, repair, .. } => {
            match since {
                Some(since) => println!(
                    "No updates since {}",
                    since.format("%Y-%m-%d %H:%M UTC")
                ),
                None => println!("No updates"),
            }
            print_repair(&repair);
        }
    }
    Ok(())
}

/// Waits for the phase watcher; a panicked or aborted watcher is logged.
async fn join_watcher(watcher: JoinHandle<()>) {
    if let Err(err) = watcher.await {
        warn!("phase watcher ended abnormally: {err}");
    }
}

fn print_feed(feed: &UpdatesFeed) {
    for entry in &feed.entries {
        println!("{}", headline(entry));
        for name in &entry.new_episode_names {
            println!("    {name}");
        }
    }
}

fn headline(entry: &FeedEntry) -> String {
    let poster = if entry.poster.is_placeholder() { "" } else { " [poster]" };
    match &entry.new_season_name {
        Some(season) => format!(
            "{} ({}): new season \"{season}\"{poster}",
            entry.show_name, entry.show_id
        ),
        None => format!(
            "{} ({}) season {}: {} new episode(s){poster}",
            entry.show_name,
            entry.show_id,
            entry.season_number,
            entry.new_episode_names.len()
        ),
    }
}

fn print_repair(repair: &RepairReport) {
    if !repair.scheduled.is_empty() || !repair.failed.is_empty() {
        println!(
            "-- repaired {} missing reminder(s), {} failed, {} already pending",
            repair.scheduled.len(),
            repair.failed.len(),
            repair.already_pending
        );
    }
    if !repair.pruned.is_empty() {
        println!("-- cleared {} fired reminder(s)", repair.pruned.len());
    }
}
