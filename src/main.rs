//! # Article Atlas CLI (`atlas`)
//!
//! The `atlas` binary manages the article database, runs ranking queries
//! from the terminal, and starts the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! atlas --config ./config/atlas.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `atlas init` | Create the SQLite database and run schema migrations |
//! | `atlas import <file>` | Load articles from a JSON array |
//! | `atlas list` | Paginated article listing with optional search |
//! | `atlas get <id>` | Show one article |
//! | `atlas keywords` | Most frequent keywords |
//! | `atlas years` | Article counts per publication year |
//! | `atlas trending` | One trending article per recent year |
//! | `atlas similar <id>` | Articles sharing keywords with an article |
//! | `atlas random` | Random sample of articles |
//! | `atlas chat <id> <message>` | Ask a question about an article's PDF |
//! | `atlas serve` | Start the HTTP server |

use article_atlas::{articles, chat, config, import, migrate, ranking, server};
use article_atlas_core::trending::TrendingParams;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Article Atlas CLI: serve, rank and explore a corpus of scientific articles.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file.
#[derive(Parser)]
#[command(
    name = "atlas",
    about = "Article Atlas: serve, rank and explore a corpus of scientific articles",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/atlas.toml")]
    config: PathBuf,

    /// Logging verbosity level (overridden by `RUST_LOG`).
    #[arg(long, global = true, default_value = "warn", value_name = "LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the `articles` table. Running it
    /// again is safe. Without a config file the defaults are used
    /// (`./data/atlas.sqlite`).
    Init,

    /// Import articles from a JSON file.
    ///
    /// The file must contain a JSON array of article objects. Articles whose
    /// DOI is already stored replace the existing row.
    Import {
        /// Path to the JSON file.
        path: PathBuf,
    },

    /// List articles page by page.
    List {
        /// Page number, starting at 1.
        #[arg(long, default_value_t = 1)]
        page: i64,

        /// Articles per page (defaults to `[listing].default_page_size`).
        #[arg(long)]
        page_size: Option<i64>,

        /// Only list articles whose title or abstract contains this text.
        #[arg(long)]
        query: Option<String>,
    },

    /// Show one article by id.
    Get {
        /// Article id.
        id: i64,
    },

    /// Show the most frequent keywords.
    Keywords {
        /// Number of keywords (defaults to `[ranking].keyword_limit`).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show article counts per publication year.
    Years,

    /// Show one trending article per recent year.
    ///
    /// A year's most-cited article qualifies when it reaches both the
    /// absolute citation floor and the percentile floor. Missing slots are
    /// backfilled with the best article of other years.
    Trending {
        /// Number of years, 1 to 10.
        #[arg(long)]
        years: Option<usize>,

        /// Absolute citation floor.
        #[arg(long)]
        min_citations: Option<i64>,

        /// Percentile floor in [0, 1].
        #[arg(long)]
        min_percentile: Option<f64>,
    },

    /// Show articles that share keywords with an article.
    Similar {
        /// Article id.
        id: i64,

        /// Number of results (defaults to `[ranking].similar_limit`).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show a random sample of articles.
    Random {
        /// Number of articles (defaults to `[ranking].random_limit`).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Ask the assistant a question about an article's PDF.
    ///
    /// Requires `[chat] provider = "openai"` and `OPENAI_API_KEY`.
    Chat {
        /// Article id.
        id: i64,
        /// The question.
        message: String,
    },

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

fn setup_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    // `init` works without a config file; it then uses the built-in defaults.
    let cfg = match cli.command {
        Commands::Init if !cli.config.exists() => {
            info!(path = %cli.config.display(), "config file not found, using defaults");
            config::Config::minimal()
        }
        _ => config::load_config(&cli.config)?,
    };

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Import { path } => {
            import::run_import(&cfg, &path).await?;
        }
        Commands::List {
            page,
            page_size,
            query,
        } => {
            articles::run_list(&cfg, page, page_size, query).await?;
        }
        Commands::Get { id } => {
            articles::run_get(&cfg, id).await?;
        }
        Commands::Keywords { limit } => {
            ranking::run_keywords(&cfg, limit).await?;
        }
        Commands::Years => {
            ranking::run_years(&cfg).await?;
        }
        Commands::Trending {
            years,
            min_citations,
            min_percentile,
        } => {
            let defaults = cfg.ranking.trending_params();
            let params = TrendingParams {
                years: years.unwrap_or(defaults.years),
                min_citations: min_citations.unwrap_or(defaults.min_citations),
                min_percentile: min_percentile.unwrap_or(defaults.min_percentile),
            };
            ranking::run_trending(&cfg, params).await?;
        }
        Commands::Similar { id, limit } => {
            ranking::run_similar(&cfg, id, limit).await?;
        }
        Commands::Random { limit } => {
            ranking::run_random(&cfg, limit).await?;
        }
        Commands::Chat { id, message } => {
            chat::run_chat(&cfg, id, &message).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
