//! napari hub search CLI
//!
//! Runs the discovery pipeline over a plugin index file and prints one page
//! of results. Provides:
//! - `search`: query, filters, sort and page, given as a hub URL or as flags
//! - `options`: filter options available in the index

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use hub_core::config::{Config, Directories};
use hub_core::filter::FilterOptions;
use hub_core::highlight::{self, Segment};
use hub_core::index::IndexStore;
use hub_core::query::{History, QueryCodec, QueryStore, UrlQueryCodec, filter_param};
use hub_core::search::SearchResult;
use hub_core::{HubSearch, ResultPage, SortType};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// napari hub plugin search
#[derive(Parser)]
#[command(name = "hub")]
#[command(about = "Search, filter and sort a napari hub plugin index")]
#[command(version)]
#[command(after_help = "\
Examples:
  hub search --index plugins.json --query video
  hub search --index plugins.json --url 'https://napari-hub.org/?search=segment&sort=totalInstalls'
  hub search --index plugins.json --filter operatingSystem=mac --filter license=oss --page 2
  hub options --index plugins.json
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one page of results
    Search {
        /// Plugin index JSON (defaults to the cached index)
        #[arg(long, value_name = "FILE")]
        index: Option<PathBuf>,

        /// Hub URL or query string to start from
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// Search text
        #[arg(long)]
        query: Option<String>,

        /// Sort token: relevance, recentlyUpdated, firstReleased, pluginName, totalInstalls
        #[arg(long, value_parser = parse_sort)]
        sort: Option<SortType>,

        /// 1-based page number
        #[arg(long)]
        page: Option<usize>,

        /// Enable a filter option, as a URL parameter (e.g. `python=3.10`)
        #[arg(long = "filter", value_name = "PARAM=VALUE")]
        filters: Vec<String>,

        /// Config file (defaults to ~/.config/napari-hub/config.json)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// List filter options found in the index
    Options {
        /// Plugin index JSON (defaults to the cached index)
        #[arg(long, value_name = "FILE")]
        index: Option<PathBuf>,

        /// Print options as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_sort(s: &str) -> Result<SortType, String> {
    s.parse().map_err(|e| format!("{e}"))
}

/// Remembers the last location written by the query store
#[derive(Clone, Default)]
struct LocationBar(Rc<RefCell<String>>);

impl History for LocationBar {
    fn replace(&mut self, query_string: &str) {
        debug!("Location: ?{query_string}");
        query_string.clone_into(&mut self.0.borrow_mut());
    }
}

fn setup_logging() {
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hub={default_level},hub_core={default_level}")));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(cfg!(debug_assertions)),
        )
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging();

    match cli.command {
        Commands::Search {
            index,
            url,
            query,
            sort,
            page,
            filters,
            config,
            json,
        } => {
            let args = SearchArgs {
                url,
                query,
                sort,
                page,
                filters,
                json,
            };
            run_search(index, config, &args)
        }
        Commands::Options { index, json } => run_options(index, json),
    }
}

struct SearchArgs {
    url: Option<String>,
    query: Option<String>,
    sort: Option<SortType>,
    page: Option<usize>,
    filters: Vec<String>,
    json: bool,
}

fn resolve_index_path(index: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = index {
        return Ok(path);
    }
    let dirs = Directories::new().context("Could not determine home directory")?;
    if !dirs.index_cache.exists() {
        bail!(
            "No index given and no cached index at {}. Pass --index <FILE>.",
            dirs.index_cache.display()
        );
    }
    Ok(dirs.index_cache)
}

fn load_index(index: Option<PathBuf>) -> Result<IndexStore> {
    let path = resolve_index_path(index)?;
    IndexStore::load(&path)
        .with_context(|| format!("Failed to load plugin index from {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match Directories::new() {
            Some(dirs) => dirs.config_file,
            None => return Ok(Config::default()),
        },
    };
    Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))
}

fn run_search(index: Option<PathBuf>, config: Option<PathBuf>, args: &SearchArgs) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let codec = UrlQueryCodec::new(config.search.default_sort);

    let location = LocationBar::default();
    let initial = args.url.as_deref().unwrap_or("");
    let mut store = QueryStore::new(Box::new(codec), initial)
        .with_history(Box::new(location.clone()));
    *location.0.borrow_mut() = store.encoded();

    if let Some(query) = &args.query {
        store.set_query(query);
    }
    for param in &args.filters {
        let decoded = codec.decode(param);
        if decoded.filters.is_empty() {
            warn!("Ignoring filter '{param}'");
            continue;
        }
        for (key, options) in decoded.filters.active() {
            for option in options {
                store.set_filter(key, option, true);
            }
        }
    }
    if let Some(sort) = args.sort {
        store.set_sort(sort);
    }
    if let Some(page) = args.page {
        store.set_page(page);
    }

    let mut hub = HubSearch::new(load_index(index)?, &config)?;
    let state = store.state().clone();
    let page = hub.run(&state);
    info!(
        "{} results, page {}/{}",
        page.total_count, page.page, page.total_pages
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page.view())?);
    } else {
        let url = location.0.borrow().clone();
        print_page(&page, &url);
    }
    Ok(())
}

fn bold(segments: &[Segment]) -> String {
    highlight::render(segments, BOLD, RESET)
}

fn print_result(result: &SearchResult<'_>) {
    let record = result.record;
    let label = bold(&highlight::label_segments(result));
    if record.display_name.is_some() {
        println!("{label} ({})", record.name);
    } else {
        println!("{label}");
    }

    let summary = bold(&highlight::summary_segments(result));
    if !summary.is_empty() {
        println!("    {summary}");
    }

    let authors: Vec<String> = highlight::author_segments(result)
        .iter()
        .map(|segments| bold(segments))
        .collect();
    if !authors.is_empty() {
        println!("    by {}", authors.join(", "));
    }

    let mut details = Vec::new();
    if !record.version.is_empty() {
        details.push(format!("v{}", record.version));
    }
    if !record.release_date.is_empty() {
        details.push(format!("released {}", record.release_date));
    }
    details.push(format!("{} installs", record.total_installs));
    println!("    {}", details.join(" | "));
}

fn print_page(page: &ResultPage<'_>, url: &str) {
    if page.items.is_empty() {
        println!("No plugins match.");
    }
    for result in &page.items {
        print_result(result);
        println!();
    }

    println!(
        "{} plugins, page {} of {}",
        page.total_count, page.page, page.total_pages
    );
    if !url.is_empty() {
        println!("?{url}");
    }
}

fn run_options(index: Option<PathBuf>, json: bool) -> Result<()> {
    let index = load_index(index)?;
    let options = FilterOptions::from_records(index.records());

    if json {
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    for (key, entries) in options.iter() {
        println!("{} ({}):", key, filter_param(key));
        for entry in entries {
            if entry.count > 0 {
                println!("  {} ({})", entry.option, entry.count);
            } else {
                println!("  {}", entry.option);
            }
        }
    }
    Ok(())
}
