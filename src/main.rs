//! # KnowMap CLI (`knowmap`)
//!
//! Upload documents, inspect the entity co-occurrence graph, run semantic
//! search, and start the HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! knowmap --config ./config/knowmap.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `knowmap init` | Create the SQLite database and pin the embedding dimensionality |
//! | `knowmap upload <file>...` | Ingest text files |
//! | `knowmap search "<query>"` | Rank documents by semantic similarity |
//! | `knowmap graph` | Print the entity co-occurrence graph (JSON or DOT) |
//! | `knowmap list` | List stored documents |
//! | `knowmap stats` | Index statistics |
//! | `knowmap serve` | Start the HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! knowmap init
//! knowmap upload notes/*.txt --owner alice@example.com
//! knowmap search "cloud migration plan" --limit 3
//! knowmap graph --format dot --output graph.dot
//! RUST_LOG=knowmap=debug knowmap serve
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use knowmap::graph::GraphFormat;
use knowmap::{config, documents, graph, ingest, migrate, search, server, stats};

/// KnowMap: entity co-occurrence graphs and semantic search over uploaded documents.
#[derive(Parser)]
#[command(name = "knowmap", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/knowmap.toml`. See `config/knowmap.example.toml`.
    #[arg(long, global = true, default_value = "./config/knowmap.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent. Fails if the database was created with a different
    /// embedding dimensionality or model than the one configured.
    Init,

    /// Upload one or more text files.
    Upload {
        /// Files to ingest; each file name becomes the document's source name.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Owner (user id) recorded on every uploaded document.
        #[arg(long, env = "KNOWMAP_OWNER")]
        owner: String,
    },

    /// Search stored documents by semantic similarity.
    Search {
        query: String,

        /// Maximum number of results (defaults to `retrieval.top_k`).
        #[arg(long)]
        limit: Option<usize>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the entity co-occurrence graph.
    Graph {
        #[arg(long, value_enum, default_value_t = GraphFormat::Json)]
        format: GraphFormat,

        /// Write to a file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List stored documents.
    List {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show index statistics.
    Stats,

    /// Start the HTTP server on `server.bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("knowmap=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let dims = migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully ({} dims).", dims);
        }
        Commands::Upload { files, owner } => {
            ingest::run_upload(&cfg, &files, &owner).await?;
        }
        Commands::Search { query, limit, json } => {
            search::run_search(&cfg, &query, limit, json).await?;
        }
        Commands::Graph { format, output } => {
            graph::run_graph(&cfg, format, output.as_deref()).await?;
        }
        Commands::List { json } => {
            documents::run_list(&cfg, json).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
