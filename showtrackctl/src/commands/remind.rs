use anyhow::{Context, Result, bail};
use chrono::TimeDelta;
use showtrack_core::{
    episode_clock,
    providers::CatalogSource,
    reminders::ReminderStore,
};
use showtrack_model::{ReminderId, SeasonReminderStatus, ShowId};

use super::App;

pub async fn on(app: &App, show: ShowId, season_number: u32) -> Result<()> {
    let source = app.catalog_source()?;
    let language = app.context.language();
    let details = source.show_details(show, language).await?;
    let season = source.season(show, season_number, language).await?;

    if !episode_clock::has_future_episodes(&season, app.context.now()) {
        println!(
            "{} {}: every episode has aired, nothing to schedule",
            details.name,
            season.display_name()
        );
        return Ok(());
    }

    let report = app.scheduler().schedule(&details.name, &season).await;
    for id in &report.scheduled {
        println!("scheduled {id}");
    }
    for id in &report.failed {
        println!("failed    {id}");
    }
    if !report.is_clean() {
        bail!("{} reminder(s) could not be scheduled", report.failed.len());
    }
    Ok(())
}

pub async fn off(app: &App, show: ShowId, season_number: u32) -> Result<()> {
    let cancelled = app.scheduler().cancel(show, season_number).await?;
    println!(
        "Cancelled {} reminder(s) for show {show} season {season_number}",
        cancelled.len()
    );
    Ok(())
}

pub async fn status(app: &App, show: ShowId, season_number: u32) -> Result<()> {
    let source = app.catalog_source()?;
    let season = source
        .season(show, season_number, app.context.language())
        .await?;
    let label = match app.scheduler().season_status(&season).await? {
        SeasonReminderStatus::On => "on",
        SeasonReminderStatus::Off => "off",
        SeasonReminderStatus::NotApplicable => "not applicable (season has aired)",
    };
    println!("{}: reminders {label}", season.display_name());
    Ok(())
}

pub async fn snooze(app: &App, identifier: &str, delay: Option<&str>) -> Result<()> {
    let id: ReminderId = identifier
        .parse()
        .with_context(|| format!("invalid reminder identifier '{identifier}'"))?;
    let delay = match delay {
        Some(raw) => parse_delay(raw)?,
        None => app.config.reminders.default_snooze,
    };

    let reminder = app.scheduler().reschedule(&id, delay).await?;
    println!(
        "{} now fires at {}",
        reminder.identifier,
        reminder.fire_at.format("%Y-%m-%d %H:%M UTC")
    );
    Ok(())
}

pub async fn list(app: &App) -> Result<()> {
    let mut reminders = app.reminder_store().pending_reminders().await?;
    reminders.sort_by(|a, b| {
        a.fire_at
            .cmp(&b.fire_at)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
    if reminders.is_empty() {
        println!("No pending reminders");
    }
    for reminder in reminders {
        println!(
            "{:<16}  {}  {}: {}",
            reminder.identifier,
            reminder.fire_at.format("%Y-%m-%d %H:%M"),
            reminder.title,
            reminder.body
        );
    }
    Ok(())
}

fn parse_delay(raw: &str) -> Result<TimeDelta> {
    let duration = humantime::parse_duration(raw)
        .with_context(|| format!("invalid delay '{raw}'"))?;
    TimeDelta::from_std(duration).with_context(|| format!("delay '{raw}' is out of range"))
}
