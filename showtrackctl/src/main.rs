use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use showtrack_config::ConfigLoader;
use showtrack_model::{ShowId, SortKey};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::App;

#[derive(Parser)]
#[command(
    name = "showtrackctl",
    version,
    about = "Browse TV catalogs and manage episode reminders"
)]
struct Cli {
    /// Configuration file (defaults to showtrack.toml or $SHOWTRACK_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Environment file loaded before reading variables
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Page through a catalog representation
    Browse {
        #[command(subcommand)]
        target: BrowseTarget,
    },
    /// Manage the tracked-show list used by update checks
    Track {
        #[command(subcommand)]
        action: TrackAction,
    },
    /// Schedule, cancel, inspect and snooze episode reminders
    Remind {
        #[command(subcommand)]
        action: RemindAction,
    },
    /// Run one update check across tracked shows and repair missed reminders
    Updates,
}

#[derive(Subcommand)]
enum BrowseTarget {
    /// Most popular shows
    Popular {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Shows with episodes airing after today
    Upcoming {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Free-text search
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Filtered discovery
    Discover {
        #[arg(long, value_enum, default_value = "popularity")]
        sort: SortArg,
        /// Genre id; repeat for several genres
        #[arg(long = "genre")]
        genres: Vec<u32>,
        /// Original language (ISO 639-1)
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        min_year: Option<i32>,
        #[arg(long)]
        max_year: Option<i32>,
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Popularity,
    AirDate,
    Votes,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Popularity => SortKey::Popularity,
            SortArg::AirDate => SortKey::AirDateDesc,
            SortArg::Votes => SortKey::Votes,
        }
    }
}

#[derive(Subcommand)]
enum TrackAction {
    /// Start tracking a show
    Add { show: ShowId },
    /// Stop tracking a show
    Remove { show: ShowId },
    /// List tracked show ids
    List,
}

#[derive(Subcommand)]
enum RemindAction {
    /// Schedule reminders for every future episode of a season
    On { show: ShowId, season: u32 },
    /// Cancel every reminder of a season
    Off { show: ShowId, season: u32 },
    /// Show whether a season has reminders
    Status { show: ShowId, season: u32 },
    /// Push a pending reminder back
    Snooze {
        /// Reminder identifier, e.g. 1399.8.6
        identifier: String,
        /// Delay such as 10m or 1h (defaults to reminders.default_snooze)
        #[arg(long)]
        delay: Option<String>,
    },
    /// List pending reminders
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = cli.env_file {
        loader = loader.with_env_file(path);
    }
    let load = loader.load()?;
    for warning in load.warnings.iter() {
        match &warning.hint {
            Some(hint) => warn!(hint = %hint, "{}", warning.message),
            None => warn!("{}", warning.message),
        }
    }
    let app = App::new(load.config);

    match cli.command {
        Command::Browse { target } => match target {
            BrowseTarget::Popular { pages } => {
                commands::browse::popular(&app, pages).await
            }
            BrowseTarget::Upcoming { pages } => {
                commands::browse::upcoming(&app, pages).await
            }
            BrowseTarget::Search { query, pages } => {
                commands::browse::search(&app, &query, pages).await
            }
            BrowseTarget::Discover {
                sort,
                genres,
                language,
                min_year,
                max_year,
                pages,
            } => {
                let mut filter = showtrack_model::FilterSpec::new(sort.into())
                    .with_years(min_year, max_year);
                for genre in genres {
                    filter = filter.with_genre(genre);
                }
                if let Some(language) = language {
                    filter = filter.with_original_language(language);
                }
                commands::browse::discover(&app, filter, pages).await
            }
        },
        Command::Track { action } => match action {
            TrackAction::Add { show } => commands::track::add(&app, show).await,
            TrackAction::Remove { show } => {
                commands::track::remove(&app, show).await
            }
            TrackAction::List => commands::track::list(&app).await,
        },
        Command::Remind { action } => match action {
            RemindAction::On { show, season } => {
                commands::remind::on(&app, show, season).await
            }
            RemindAction::Off { show, season } => {
                commands::remind::off(&app, show, season).await
            }
            RemindAction::Status { show, season } => {
                commands::remind::status(&app, show, season).await
            }
            RemindAction::Snooze { identifier, delay } => {
                commands::remind::snooze(&app, &identifier, delay.as_deref())
                    .await
            }
            RemindAction::List => commands::remind::list(&app).await,
        },
        Command::Updates => commands::updates::run(&app).await,
    }
}
