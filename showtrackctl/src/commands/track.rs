use anyhow::Result;
use showtrack_model::ShowId;

use super::App;

pub async fn add(app: &App, show: ShowId) -> Result<()> {
    if app.state().track(show).await? {
        println!("Tracking show {show}");
    } else {
        println!("Show {show} is already tracked");
    }
    Ok(())
}

pub async fn remove(app: &App, show: ShowId) -> Result<()> {
    if app.state().untrack(show).await? {
        println!("Stopped tracking show {show}");
    } else {
        println!("Show {show} was not tracked");
    }
    Ok(())
}

pub async fn list(app: &App) -> Result<()> {
    let snapshot = app.state().snapshot().await?;
    if snapshot.tracked.is_empty() {
        println!("No tracked shows");
    }
    for id in &snapshot.tracked {
        println!("{id}");
    }
    match snapshot.last_checked {
        Some(at) => println!("-- last checked {}", at.format("%Y-%m-%d %H:%M UTC")),
        None => println!("-- never checked"),
    }
    Ok(())
}
