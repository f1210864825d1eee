use anyhow::Result;
use showtrack_core::catalog::{CatalogPager, PageLoad};
use showtrack_model::{
    CatalogRepresentation, FilterSpec, RepresentationKind, ShowSummary,
};

use super::App;

fn pager(app: &App) -> Result<CatalogPager> {
    Ok(CatalogPager::new(app.catalog_source()?, app.context.clone()))
}

pub async fn popular(app: &App, pages: u32) -> Result<()> {
    let pager = pager(app)?;
    let first = pager.load_first(CatalogRepresentation::Popular).await?;
    page_on(&pager, RepresentationKind::Popular, first, pages).await
}

pub async fn upcoming(app: &App, pages: u32) -> Result<()> {
    let pager = pager(app)?;
    let first = pager.load_first(CatalogRepresentation::Upcoming).await?;
    page_on(&pager, RepresentationKind::Upcoming, first, pages).await
}

pub async fn search(app: &App, query: &str, pages: u32) -> Result<()> {
    let pager = pager(app)?;
    let first = pager.search(query).await?;
    page_on(&pager, RepresentationKind::Search, first, pages).await
}

pub async fn discover(app: &App, filter: FilterSpec, pages: u32) -> Result<()> {
    let pager = pager(app)?;
    pager.switch_filter(filter);
    let first = pager.load_more(RepresentationKind::Filtered).await?;
    page_on(&pager, RepresentationKind::Filtered, first, pages).await
}

/// Loads up to `pages` pages in total, then prints the accumulated list.
async fn page_on(
    pager: &CatalogPager,
    kind: RepresentationKind,
    first: PageLoad,
    pages: u32,
) -> Result<()> {
    let mut last = first;
    for _ in 1..pages.max(1) {
        if last.is_exhausted() {
            break;
        }
        last = pager.load_more(kind).await?;
    }

    let cursor = pager.cursor(kind);
    for show in pager.items(kind) {
        println!("{}", format_row(&show));
    }
    match cursor.total_pages() {
        Some(total) => println!(
            "-- {} shows, {} of {} pages loaded{}",
            cursor.len(),
            cursor.next_page().saturating_sub(1).min(total),
            total,
            if cursor.is_exhausted() { " (end)" } else { "" }
        ),
        None => println!("-- nothing loaded"),
    }
    Ok(())
}

fn format_row(show: &ShowSummary) -> String {
    let vote = show
        .vote
        .map(|vote| format!("{vote:.1}"))
        .unwrap_or_else(|| "-".into());
    let aired = show.air_date.as_deref().unwrap_or("unknown");
    format!(
        "{:>8}  {:<40}  {:>4}  {}",
        show.id,
        show.display_name(),
        vote,
        aired
    )
}
