//! CatalogQL CLI - Generate a GraphQL schema from engine catalogs
//!
//! Usage:
//!   catalogql schema [--fixture <file.json>] [--format sdl|json]
//!   catalogql query <catalog> <schema> <table> [--limit N] [--filter JSON]... [--dry-run]
//!   catalogql joins <catalog> [--strategy same-schema|global] [--json]
//!   catalogql cache stats|clear [--catalog <name>]
//!   catalogql sanitize <name>...
//!   catalogql restore <name>...
//!
//! Examples:
//!   catalogql schema --fixture catalog.json
//!   catalogql query hive sales orders --filter '{"field":"age","operator":"gt","intValue":30}'
//!   catalogql joins hive --strategy global

use clap::{Parser, Subcommand, ValueEnum};
use catalogql::cache::{self, connection_namespace, MemoryMetadataCache, MetadataStore, SqliteMetadataCache};
use catalogql::config::Settings;
use catalogql::ident::{restore, sanitize};
use catalogql::joins::{JoinDetector, JoinStrategy};
use catalogql::metadata::{MetadataSource, MetadataWalker, StaticMetadataSource, WorkerMetadataSource};
use catalogql::query::{FilterInput, TableQueryService};
use catalogql::schema::{sdl, SchemaBuilder};
use catalogql::worker::WorkerClient;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "catalogql")]
#[command(about = "CatalogQL - Expose SQL engine catalogs as a generated GraphQL schema")]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Named connection from the config file
    #[arg(long, global = true)]
    connection: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover catalogs and print the generated schema
    Schema {
        /// Read metadata from a JSON fixture instead of the engine
        #[arg(long)]
        fixture: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "sdl")]
        format: SchemaFormat,

        /// Re-query the engine, ignoring cached metadata
        #[arg(long)]
        refresh: bool,
    },

    /// Query one table with optional filters
    Query {
        catalog: String,
        schema: String,
        table: String,

        /// Maximum number of rows
        #[arg(short, long)]
        limit: Option<i64>,

        /// Filter as JSON, e.g. '{"field":"name","operator":"eq","stringValue":"Bob"}'
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Read metadata from a JSON fixture instead of the engine
        #[arg(long)]
        fixture: Option<PathBuf>,

        /// Print the SQL and parameters without executing
        #[arg(long)]
        dry_run: bool,
    },

    /// Detect join candidates within a catalog
    Joins {
        catalog: String,

        /// Comparison scope (defaults to the config file setting)
        #[arg(short, long)]
        strategy: Option<StrategyArg>,

        /// Read metadata from a JSON fixture instead of the engine
        #[arg(long)]
        fixture: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Re-query the engine, ignoring cached metadata
        #[arg(long)]
        refresh: bool,
    },

    /// Inspect or clear the metadata cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Encode names into GraphQL-safe identifiers
    Sanitize { names: Vec<String> },

    /// Decode sanitized identifiers back to raw names
    Restore { names: Vec<String> },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show entry count and size for the active connection
    Stats,
    /// Remove cached metadata
    Clear {
        /// Only this catalog
        #[arg(long)]
        catalog: Option<String>,
    },
}

#[derive(Clone, ValueEnum)]
enum SchemaFormat {
    /// GraphQL SDL
    Sdl,
    /// JSON description of the generated types
    Json,
}

#[derive(Clone, ValueEnum)]
enum StrategyArg {
    SameSchema,
    Global,
}

impl From<StrategyArg> for JoinStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::SameSchema => JoinStrategy::SameSchema,
            StrategyArg::Global => JoinStrategy::Global,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let ctx = Context {
        settings,
        connection: cli.connection,
    };

    let result = match cli.command {
        Commands::Schema {
            fixture,
            format,
            refresh,
        } => cmd_schema(&ctx, fixture, format, refresh).await,
        Commands::Query {
            catalog,
            schema,
            table,
            limit,
            filters,
            fixture,
            dry_run,
        } => cmd_query(&ctx, &catalog, &schema, &table, limit, &filters, fixture, dry_run).await,
        Commands::Joins {
            catalog,
            strategy,
            fixture,
            json,
            refresh,
        } => cmd_joins(&ctx, &catalog, strategy, fixture, json, refresh).await,
        Commands::Cache { action } => cmd_cache(&ctx, action),
        Commands::Sanitize { names } => {
            names.iter().for_each(|n| println!("{}", sanitize(n)));
            Ok(())
        }
        Commands::Restore { names } => {
            names.iter().for_each(|n| println!("{}", restore(n)));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: Option<&Path>) -> CliResult<Settings> {
    Ok(match path {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    })
}

struct Context {
    settings: Settings,
    connection: Option<String>,
}

/// Metadata source plus the cache that sits in front of it.
struct Backend {
    source: Arc<dyn MetadataSource>,
    cache: Arc<dyn MetadataStore>,
}

impl Context {
    /// `(driver, connection string)` of the selected connection.
    fn connection(&self) -> CliResult<(String, String)> {
        let conn = match &self.connection {
            Some(name) => self.settings.get_connection(name)?,
            None => self
                .settings
                .default_connection()
                .map(|(_, conn)| conn)
                .ok_or("no connections configured; add a [connections.<name>] section or pass --fixture")?,
        };
        Ok((conn.driver.clone(), conn.resolved_connection_string()?))
    }

    fn open_cache(&self) -> CliResult<SqliteMetadataCache> {
        let (driver, connection_string) = self.connection()?;
        let namespace = connection_namespace(&driver, &connection_string)?;
        let cache = match self.settings.cache.resolved_path()? {
            Some(path) => SqliteMetadataCache::open_at(path, namespace)?,
            None => SqliteMetadataCache::open(namespace)?,
        };
        Ok(cache)
    }

    async fn backend(&self, fixture: Option<&Path>) -> CliResult<Backend> {
        if let Some(path) = fixture {
            return Ok(Backend {
                source: Arc::new(StaticMetadataSource::from_file(path)?),
                cache: Arc::new(MemoryMetadataCache::new()),
            });
        }

        let (driver, connection_string) = self.connection()?;
        let client = WorkerClient::spawn_with_settings(&self.settings.worker).await?;
        Ok(Backend {
            source: Arc::new(WorkerMetadataSource::new(
                Arc::new(client),
                driver,
                connection_string,
            )),
            cache: Arc::new(self.open_cache()?),
        })
    }

    async fn walker(&self, fixture: Option<&Path>, refresh: bool) -> CliResult<MetadataWalker> {
        let backend = self.backend(fixture).await?;
        let mut options = self.settings.walker_options();
        options.use_cache &= !refresh;
        Ok(MetadataWalker::new(backend.source, backend.cache, options))
    }
}

async fn cmd_schema(
    ctx: &Context,
    fixture: Option<PathBuf>,
    format: SchemaFormat,
    refresh: bool,
) -> CliResult<()> {
    let walker = ctx.walker(fixture.as_deref(), refresh).await?;
    let schema = SchemaBuilder::new(&walker, &ctx.settings.discovery).build().await?;

    match format {
        SchemaFormat::Sdl => print!("{}", sdl::render(&schema)),
        SchemaFormat::Json => println!("{}", serde_json::to_string_pretty(&schema)?),
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn cmd_query(
    ctx: &Context,
    catalog: &str,
    schema: &str,
    table: &str,
    limit: Option<i64>,
    filters: &[String],
    fixture: Option<PathBuf>,
    dry_run: bool,
) -> CliResult<()> {
    let filters = filters
        .iter()
        .map(|f| serde_json::from_str::<FilterInput>(f).map_err(|e| format!("invalid filter '{}': {}", f, e)))
        .collect::<Result<Vec<_>, _>>()?;

    // Dry runs never touch the engine.
    let source: Arc<dyn MetadataSource> = if dry_run && fixture.is_none() {
        Arc::new(StaticMetadataSource::new())
    } else {
        ctx.backend(fixture.as_deref()).await?.source
    };
    let service = TableQueryService::new(source).with_default_limit(ctx.settings.query.default_limit);

    if dry_run {
        let query = service.prepare(catalog, schema, table, limit, &filters)?;
        println!("{}", query.sql);
        if !query.params.is_empty() {
            println!("-- params: {}", serde_json::to_string(&query.params)?);
        }
        return Ok(());
    }

    let rows = service.query_table(catalog, schema, table, limit, &filters).await?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

async fn cmd_joins(
    ctx: &Context,
    catalog: &str,
    strategy: Option<StrategyArg>,
    fixture: Option<PathBuf>,
    json: bool,
    refresh: bool,
) -> CliResult<()> {
    let walker = ctx.walker(fixture.as_deref(), refresh).await?;
    let strategy = strategy.map(JoinStrategy::from).unwrap_or(ctx.settings.joins.strategy);
    let candidates = JoinDetector::new(strategy).detect_catalog(&walker, catalog).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
    } else if candidates.is_empty() {
        println!("No join candidates found in '{}'.", catalog);
    } else {
        for candidate in &candidates {
            println!("{}", candidate);
        }
    }
    Ok(())
}

fn cmd_cache(ctx: &Context, action: CacheAction) -> CliResult<()> {
    let store = ctx.open_cache()?;

    match action {
        CacheAction::Stats => {
            let stats = store.stats()?;
            println!("Namespace: {}", store.namespace());
            println!("Entries:   {}", stats.entry_count);
            println!("Size:      {} bytes", stats.total_size_bytes);
        }
        CacheAction::Clear { catalog } => {
            let removed = cache::invalidate(&store, catalog.as_deref())?;
            println!("Removed {} cache entries.", removed);
        }
    }
    Ok(())
}
