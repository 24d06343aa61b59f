//! reelscout - OMDb movie catalog search CLI.

/// Application configuration (TOML).
mod config;
/// Terminal UI components.
mod tui;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::AppConfig;
use crate::tui::run_browser;
use reelscout_api::omdb::{CatalogApi, MovieKind, OmdbClient};
use reelscout_core::{
    FavoritesStore, PageLink, SearchSession, Theme, ThemePreference, error_suggestion,
    visible_pages,
};
use reelscout_db::SqliteStore;

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Search the catalog by title.
    Search(SearchArgs),
    /// Show the full record of one title.
    Details(DetailsArgs),
    /// Manage saved favorites.
    Favorites(FavoritesCommand),
    /// Show or change the colour theme.
    Theme(ThemeCommand),
    /// Browse the catalog interactively via TUI.
    Browse(BrowseArgs),
    /// Print a shell completion script.
    Completions(CompletionsArgs),
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Title to search for.
    #[arg(long, short)]
    query: String,

    /// First page to fetch (1-based).
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Number of pages to accumulate, starting at --page.
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Show only results from this year (exact match, e.g. 2008 or 2008–2013).
    #[arg(long)]
    year: Option<String>,

    /// Show only results of this type (movie, series, episode).
    #[arg(long = "type")]
    kind: Option<MovieKind>,
}

/// Arguments for the `details` subcommand.
#[derive(clap::Args)]
struct DetailsArgs {
    /// IMDb id (e.g. tt0468569).
    #[arg(long)]
    id: String,
}

/// Arguments for the `favorites` subcommand.
#[derive(clap::Args)]
struct FavoritesCommand {
    /// Favorites subcommand to run.
    #[command(subcommand)]
    command: FavoritesSubcommands,
}

/// Available favorites subcommands.
#[derive(Subcommand)]
enum FavoritesSubcommands {
    /// List saved favorites.
    List,
    /// Look up a title and save it.
    Add(FavoriteIdArgs),
    /// Remove a saved title.
    Remove(FavoriteIdArgs),
    /// Remove every saved title.
    Clear,
}

/// Id argument shared by `favorites add` and `favorites remove`.
#[derive(clap::Args)]
struct FavoriteIdArgs {
    /// IMDb id (e.g. tt0468569).
    #[arg(long)]
    id: String,
}

/// Arguments for the `theme` subcommand.
#[derive(clap::Args)]
struct ThemeCommand {
    /// Theme subcommand to run.
    #[command(subcommand)]
    command: ThemeSubcommands,
}

/// Available theme subcommands.
#[derive(Subcommand)]
enum ThemeSubcommands {
    /// Show the active theme.
    Show,
    /// Set the theme.
    Set(ThemeSetArgs),
    /// Switch between light and dark.
    Toggle,
}

/// Arguments for the `theme set` subcommand.
#[derive(clap::Args)]
struct ThemeSetArgs {
    /// `light` or `dark`.
    theme: Theme,
}

/// Arguments for the `browse` subcommand.
#[derive(clap::Args)]
struct BrowseArgs {
    /// Search to run on start.
    #[arg(long, short)]
    query: Option<String>,
}

/// Arguments for the `completions` subcommand.
#[derive(clap::Args)]
struct CompletionsArgs {
    /// Target shell.
    shell: Shell,
}

/// Loads the config file for `dir`.
///
/// # Errors
///
/// Returns an error if the config path cannot be resolved or the file is invalid.
fn load_config(dir: Option<&Path>) -> Result<AppConfig> {
    AppConfig::load_for(dir).context("failed to load config")
}

/// Builds an OMDb client from config.
///
/// A missing API key is not an error here; lookups fail with a
/// configuration message instead.
///
/// # Errors
///
/// Returns an error if the base URL is invalid or the client fails to build.
fn build_omdb_client(config: &AppConfig) -> Result<OmdbClient> {
    let mut builder = OmdbClient::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(key) = config.api_key() {
        builder = builder.api_key(key);
    }
    if let Some(raw) = &config.omdb.base_url {
        let url = Url::parse(raw).with_context(|| format!("invalid [omdb] base_url: {raw}"))?;
        builder = builder.base_url(url);
    }
    builder.build().context("failed to build OMDb client")
}

/// Renders the pagination window, e.g. `1 … 4 [5] 6 … 10`.
fn fmt_pages(current: u32, total: u32) -> String {
    visible_pages(current, total)
        .into_iter()
        .map(|link| match link {
            PageLink::Page(n) if n == current => format!("[{n}]"),
            PageLink::Page(n) => n.to_string(),
            PageLink::Ellipsis => String::from("\u{2026}"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the config is invalid or any page lookup fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&Path>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_omdb_client(&config)?;

    let mut session = SearchSession::new();
    session
        .start_search(&client, args.query.as_str(), args.page)
        .await;
    for _ in 1..args.pages {
        if session.last_error().is_some() || !session.load_more(&client).await {
            break;
        }
    }

    if let Some(message) = session.last_error() {
        tracing::info!("{}", error_suggestion(message));
        anyhow::bail!("search failed: {message}");
    }

    session.set_filters(args.year.clone().unwrap_or_default(), args.kind);
    let visible = session.visible_results();

    tracing::info!("IMDb ID\t\tYear\t\tType\tTitle");
    for movie in &visible {
        tracing::info!(
            "{}\t{:<10}\t{}\t{}",
            movie.id,
            movie.year,
            movie.kind,
            movie.title
        );
    }

    if session.has_active_filters() {
        tracing::info!(
            "Showing {} of {} loaded results",
            visible.len(),
            session.results().len()
        );
    }
    tracing::info!(
        "Page {} of {} ({} results)",
        session.current_page(),
        session.total_pages(),
        session.total_results()
    );
    let pages = fmt_pages(session.current_page(), session.total_pages());
    if !pages.is_empty() {
        tracing::info!("Pages: {pages}");
    }
    if session.can_load_more() {
        tracing::info!(
            "More results: --page {} or --pages {}",
            session.current_page().saturating_add(1),
            args.pages.saturating_add(1)
        );
    }

    Ok(())
}

/// Runs the `details` subcommand.
///
/// # Errors
///
/// Returns an error if the config is invalid or the lookup fails.
#[instrument(skip_all)]
async fn run_details(args: &DetailsArgs, dir: Option<&Path>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_omdb_client(&config)?;

    let detail = match client.fetch_detail(&args.id).await {
        Ok(detail) => detail,
        Err(e) => {
            tracing::info!("{}", error_suggestion(&e.to_string()));
            return Err(e).with_context(|| format!("failed to fetch details for {}", args.id));
        }
    };

    let summary = &detail.summary;
    tracing::info!("{} ({})", summary.title, summary.year);
    tracing::info!("  IMDb ID:   {}", summary.id);
    tracing::info!("  Type:      {}", summary.kind.label());
    tracing::info!(
        "  Rating:    {}",
        detail
            .rating_value()
            .map_or_else(|| String::from("-"), |r| format!("{r}/10"))
    );
    tracing::info!("  Released:  {}", detail.release_date);
    tracing::info!("  Runtime:   {}", detail.runtime);
    tracing::info!("  Genre:     {}", detail.genres().join(", "));
    tracing::info!("  Director:  {}", detail.director);
    tracing::info!("  Cast:      {}", detail.actor_list().join(", "));
    tracing::info!(
        "  Poster:    {}",
        summary.poster_url().unwrap_or("No poster available")
    );
    tracing::info!("  Plot:      {}", detail.plot);

    Ok(())
}

/// Runs the `favorites` subcommands.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or a lookup for `add` fails.
#[instrument(skip_all)]
async fn run_favorites(cmd: &FavoritesSubcommands, dir: Option<&Path>) -> Result<()> {
    let store = SqliteStore::open(dir).context("failed to open database")?;
    let mut favorites = FavoritesStore::load(&store);

    match cmd {
        FavoritesSubcommands::List => {
            if favorites.is_empty() {
                tracing::info!("No favorites yet. Add one with `favorites add --id <IMDb ID>`.");
                return Ok(());
            }
            tracing::info!("IMDb ID\t\tYear\t\tType\tTitle");
            for movie in favorites.items() {
                tracing::info!(
                    "{}\t{:<10}\t{}\t{}",
                    movie.id,
                    movie.year,
                    movie.kind,
                    movie.title
                );
            }
            tracing::info!("Total: {} favorites", favorites.len());
        }
        FavoritesSubcommands::Add(args) => {
            if favorites.contains(&args.id) {
                tracing::info!("{} is already a favorite", args.id);
                return Ok(());
            }
            let config = load_config(dir)?;
            let client = build_omdb_client(&config)?;
            let detail = client
                .fetch_detail(&args.id)
                .await
                .with_context(|| format!("failed to fetch details for {}", args.id))?;
            let title = detail.summary.title.clone();
            favorites.add(detail.summary);
            tracing::info!("Added {} ({title})", args.id);
        }
        FavoritesSubcommands::Remove(args) => {
            if favorites.remove(&args.id) {
                tracing::info!("Removed {}", args.id);
            } else {
                tracing::info!("{} is not a favorite", args.id);
            }
        }
        FavoritesSubcommands::Clear => {
            let count = favorites.len();
            favorites.clear();
            tracing::info!("Removed {count} favorites");
        }
    }

    Ok(())
}

/// Runs the `theme` subcommands.
///
/// # Errors
///
/// Returns an error if the config or database cannot be opened.
#[instrument(skip_all)]
fn run_theme(cmd: &ThemeSubcommands, dir: Option<&Path>) -> Result<()> {
    let config = load_config(dir)?;
    let store = SqliteStore::open(dir).context("failed to open database")?;
    let mut preference = ThemePreference::load(&store, config.ui.theme);

    match cmd {
        ThemeSubcommands::Show => {}
        ThemeSubcommands::Set(args) => preference.set(args.theme),
        ThemeSubcommands::Toggle => {
            preference.toggle();
        }
    }
    tracing::info!("Theme: {}", preference.get());

    Ok(())
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if setup or the TUI fails.
#[instrument(skip_all)]
async fn run_browse(args: &BrowseArgs, dir: Option<&Path>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_omdb_client(&config)?;
    let store = SqliteStore::open(dir).context("failed to open database")?;

    if !client.has_api_key() {
        tracing::warn!("No OMDb API key configured; searches will fail until one is set.");
    }

    run_browser(
        Arc::new(client),
        &store,
        config.ui.theme,
        args.query.clone(),
    )
    .await
    .context("browser TUI failed")
}

/// Runs the `completions` subcommand.
fn run_completions(args: &CompletionsArgs) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_owned();
    clap_complete::generate(args.shell, &mut cmd, name, &mut io::stdout());
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let dir = cli.dir.as_deref();
    match cli.command {
        Commands::Search(args) => run_search(&args, dir).await,
        Commands::Details(args) => run_details(&args, dir).await,
        Commands::Favorites(cmd) => run_favorites(&cmd.command, dir).await,
        Commands::Theme(cmd) => run_theme(&cmd.command, dir),
        Commands::Browse(args) => run_browse(&args, dir).await,
        Commands::Completions(args) => {
            run_completions(&args);
            Ok(())
        }
    }
}
