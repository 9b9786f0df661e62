pub mod history;
pub mod model;
pub mod suggest;
pub mod ui;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::time::Duration;

use history::{HistoryStore, JsonHistoryStore};
use model::types::{DateRange, FormAction, SuggestItem};
use suggest::{CatalogSource, SuggestSource};
use ui::form::SearchForm;

static LONG_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{} (built {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown")
    )
});

fn long_version() -> &'static str {
    &LONG_VERSION
}

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "trip-search",
    version,
    long_version = long_version(),
    about = "Terminal travel search with destination autocomplete"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive search form
    Tui {
        /// Render once and exit (headless-friendly)
        #[arg(long, default_value_t = false)]
        once: bool,

        /// Override the data dir (history, UI state)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Simulated source latency in milliseconds
        #[arg(long)]
        latency_ms: Option<u64>,
    },
    /// Print suggestions for a query as JSON
    Suggest {
        query: String,

        /// Cap the number of rows printed
        #[arg(long, default_value_t = 8)]
        limit: usize,
    },
    /// Print trending destinations as JSON
    Trending,
    /// Show or clear the persisted destination history
    History {
        #[arg(long, default_value_t = false)]
        clear: bool,

        /// Override the data dir
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a full search non-interactively and print the payload
    Plan {
        /// Destination text, resolved against the suggestion source
        #[arg(long)]
        destination: String,

        /// Check-in date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Check-out date (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        #[arg(long, default_value_t = 1)]
        guests: u32,

        /// Override the data dir (the chosen destination is recorded)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Tui {
            once,
            data_dir,
            latency_ms,
        } => {
            if once
                && std::env::var("TUI_HEADLESS")
                    .map(|v| v == "1")
                    .unwrap_or(false)
            {
                return run_tui_headless().await;
            }
            ui::tui::run_tui(data_dir, once, latency_ms.map(Duration::from_millis))
        }
        Commands::Suggest { query, limit } => {
            let query = query.trim().to_string();
            if query.is_empty() {
                bail!("query must be non-empty");
            }
            let mut items = CatalogSource::new().suggest(&query).await?;
            items.truncate(limit);
            println!("{}", serde_json::to_string_pretty(&items)?);
            Ok(())
        }
        Commands::Trending => {
            let items = CatalogSource::new().trending().await?;
            println!("{}", serde_json::to_string_pretty(&items)?);
            Ok(())
        }
        Commands::History { clear, data_dir } => {
            let data_dir = data_dir.unwrap_or_else(default_data_dir);
            let mut store = JsonHistoryStore::open_default(&data_dir);
            if clear {
                store.clear();
                println!("history cleared");
            } else {
                println!("{}", serde_json::to_string_pretty(&store.load())?);
            }
            Ok(())
        }
        Commands::Plan {
            destination,
            start,
            end,
            guests,
            data_dir,
        } => run_plan(&destination, start, end, guests, data_dir).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "trips", &mut std::io::stdout());
            Ok(())
        }
        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut out = std::io::stdout();
            man.render(&mut out)?;
            Ok(())
        }
    }
}

/// Sanity pass over the sources without touching the terminal, used by
/// `trips tui --once` under TUI_HEADLESS=1.
async fn run_tui_headless() -> Result<()> {
    let source = CatalogSource::new();
    let trending = source.trending().await?;
    let suggested = source.suggest("a").await?;
    println!(
        "sources ok: {} trending, {} suggestions",
        trending.len(),
        suggested.len()
    );
    Ok(())
}

/// The headless counterpart of pressing SEARCH: resolve the destination
/// the way the control's Enter key would, drive the coordinator through
/// its named actions, and print the submission payload.
async fn run_plan(
    destination: &str,
    start: NaiveDate,
    end: NaiveDate,
    guests: u32,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    let text = destination.trim();
    if text.is_empty() {
        bail!("destination must be non-empty");
    }
    let range = DateRange::new(start, end).context("invalid stay")?;

    let source = CatalogSource::new();
    let matches = source.suggest(text).await?;
    let chosen = matches
        .into_iter()
        .find(|item| item.label.eq_ignore_ascii_case(text))
        .unwrap_or_else(|| SuggestItem::free(text));

    let data_dir = data_dir.unwrap_or_else(default_data_dir);
    let mut store = JsonHistoryStore::open_default(&data_dir);
    store.record(chosen.clone());

    let mut form = SearchForm::new();
    form.complete_destination(chosen);
    form.apply(FormAction::SetDates(range));
    form.apply(FormAction::SetGuests(guests));

    let mut payload = None;
    if !form.submit(|state| payload = Some(state.clone())) {
        bail!("search is incomplete");
    }
    if let Some(state) = payload {
        println!("{}", serde_json::to_string_pretty(&state)?);
    }
    Ok(())
}

pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("io", "trip-search", "trip-search")
        .expect("project dirs available")
        .data_dir()
        .to_path_buf()
}
