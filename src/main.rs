use std::{path::PathBuf, sync::Arc};

use clap::Parser;

pub mod config;
pub mod db;
pub mod models;
pub mod observability;
pub mod strike;

use config::AppConfig;
use db::DbPool;
use strike::{StrikeArgs, StrikeOutcome, Striker, cutoff_for, start_strike_worker};

#[derive(Parser, Debug)]
#[command(version, about = "Remove old post revisions from a CMS content database", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to config file (defaults to ./revision-strike.toml, then
    /// ~/.config/revision-strike/revision-strike.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Remove old post revisions once
    Clean {
        /// Remove revisions on posts published at least this many days ago
        #[arg(long)]
        days: Option<u32>,
        /// The maximum number of revisions to delete in this run
        #[arg(long)]
        limit: Option<u32>,
        /// One or more post types (comma-separated) for which revisions
        /// should be struck
        #[arg(long = "post-type")]
        post_type: Option<String>,
        /// Number of most-recent revisions to retain per post
        #[arg(long)]
        keep: Option<u32>,
        /// Enable verbose logging of deleted revisions
        #[arg(long)]
        verbose: bool,
        /// Report what would be deleted without deleting anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Count all eligible revisions, then remove them in a single
    /// exhaustive pass
    CleanAll {
        /// Remove revisions on posts published at least this many days ago
        #[arg(long)]
        days: Option<u32>,
        /// One or more post types (comma-separated) for which revisions
        /// should be struck
        #[arg(long = "post-type")]
        post_type: Option<String>,
        /// Number of most-recent revisions to retain per post
        #[arg(long)]
        keep: Option<u32>,
        /// Enable verbose logging of deleted revisions
        #[arg(long)]
        verbose: bool,
        /// Report what would be deleted without deleting anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the number of revisions eligible for removal
    Count {
        /// Count revisions on posts published at least this many days ago
        #[arg(long)]
        days: Option<u32>,
        /// One or more post types (comma-separated) to count
        #[arg(long = "post-type")]
        post_type: Option<String>,
    },
    /// Run the scheduler in the foreground, striking on the configured
    /// cadence
    Run,
    /// Run database migrations and exit
    ///
    /// Only needed when revision-strike owns the content tables (demos,
    /// testing). Skip this when pointing at an existing CMS database.
    Migrate,
    /// Initialize a new configuration file
    Init {
        /// Path to create the config file (defaults to
        /// ~/.config/revision-strike/revision-strike.toml)
        #[arg(short, long)]
        output: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Default configuration for a first run against a local SQLite database.
fn default_config_toml() -> &'static str {
    r#"# Revision Strike Configuration

# Content database holding the posts and revisions to prune.
[database]
type = "sqlite"
path = "content.db"

[strike]
days = 30
limit = 50
post_types = ["post"]
keep = 0

[strike.scheduler]
enabled = true
interval_hours = 24

[strike.safety]
dry_run = false

# [observability.logging]
# level = "info"        # trace|debug|info|warn|error
# format = "compact"    # pretty|compact|json
"#
}

/// Get the default config directory path.
fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("revision-strike"))
}

/// Get the default config file path.
fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("revision-strike.toml"))
}

/// Resolve the config path from the explicit flag, the current directory,
/// or the default location.
fn resolve_config_path(explicit_path: Option<&str>) -> Result<PathBuf, String> {
    if let Some(path) = explicit_path {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(format!("Config file not found: {}", path.display()));
        }
        return Ok(path);
    }

    let cwd_config = PathBuf::from("revision-strike.toml");
    if cwd_config.exists() {
        return Ok(cwd_config);
    }

    if let Some(default_path) = default_config_path()
        && default_path.exists()
    {
        return Ok(default_path);
    }

    Err("No config file found. Run `revision-strike init` to create one, \
         or pass --config <path>."
        .to_string())
}

/// Load and parse the configuration, exiting with a message on failure.
fn load_config(explicit_path: Option<&str>) -> AppConfig {
    let config_path = match resolve_config_path(explicit_path) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match AppConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Failed to load config from {}: {}",
                config_path.display(),
                e
            );
            std::process::exit(1);
        }
    }
}

fn init_tracing_or_exit(config: &AppConfig) {
    if let Err(e) = observability::init_tracing(&config.observability) {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }
}

/// Connect to the configured database, exiting with a message on failure.
async fn connect_db(config: &AppConfig) -> DbPool {
    if config.database.is_none() {
        eprintln!(
            "Error: Database is not configured. Add a [database] section to the config file."
        );
        std::process::exit(1);
    }

    match DbPool::from_config(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    }
}

/// Split a comma-separated post-type list, trimming whitespace around each
/// tag and dropping empties.
fn parse_post_types(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn resolve_strike_args(
    config: &AppConfig,
    days: Option<u32>,
    limit: Option<u32>,
    post_type: Option<&str>,
    keep: Option<u32>,
    dry_run: bool,
) -> StrikeArgs {
    let mut args = StrikeArgs::from_config(&config.strike);
    if let Some(days) = days {
        args.days = days;
    }
    if let Some(limit) = limit {
        args.limit = limit;
    }
    if let Some(post_type) = post_type {
        args.post_types = parse_post_types(post_type);
    }
    if let Some(keep) = keep {
        args.keep = keep;
    }
    args.dry_run = args.dry_run || dry_run;
    args
}

/// Bump logging to debug so each deleted revision ID is printed.
fn apply_verbose(config: &mut AppConfig, verbose: bool) {
    if verbose && config.observability.logging.level > config::LogLevel::Debug {
        config.observability.logging.level = config::LogLevel::Debug;
    }
}

/// Print the outcome of a pass and return the process exit code.
fn report_outcome(stats: &strike::RunStatistics, dry_run: bool) -> i32 {
    if dry_run {
        match stats.found {
            0 => println!("DRY RUN: no revisions matched your criteria."),
            1 => println!("DRY RUN: one post revision would be deleted."),
            n => println!("DRY RUN: {} post revisions would be deleted.", n),
        }
        return 0;
    }

    match stats.outcome() {
        StrikeOutcome::NoMatches => {
            println!("No errors occurred, but no post revisions were removed.");
            0
        }
        StrikeOutcome::NoneDeleted => {
            eprintln!("Something went wrong deleting post revisions, please try again!");
            1
        }
        StrikeOutcome::Deleted(1) => {
            println!("One post revision was deleted successfully.");
            0
        }
        StrikeOutcome::Deleted(n) => {
            println!("{} post revisions were deleted successfully.", n);
            0
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Command::Clean {
            days,
            limit,
            post_type,
            keep,
            verbose,
            dry_run,
        } => {
            run_clean(
                args.config.as_deref(),
                days,
                limit,
                post_type,
                keep,
                verbose,
                dry_run,
            )
            .await;
        }
        Command::CleanAll {
            days,
            post_type,
            keep,
            verbose,
            dry_run,
        } => {
            run_clean_all(
                args.config.as_deref(),
                days,
                post_type,
                keep,
                verbose,
                dry_run,
            )
            .await;
        }
        Command::Count { days, post_type } => {
            run_count(args.config.as_deref(), days, post_type).await;
        }
        Command::Run => {
            run_scheduler(args.config.as_deref()).await;
        }
        Command::Migrate => {
            run_migrate(args.config.as_deref()).await;
        }
        Command::Init { output, force } => {
            run_init(output, force);
        }
    }
}

async fn run_clean(
    explicit_config_path: Option<&str>,
    days: Option<u32>,
    limit: Option<u32>,
    post_type: Option<String>,
    keep: Option<u32>,
    verbose: bool,
    dry_run: bool,
) {
    let mut config = load_config(explicit_config_path);
    apply_verbose(&mut config, verbose);
    init_tracing_or_exit(&config);

    let pool = connect_db(&config).await;
    let striker = Striker::new(pool.revisions());
    let run = resolve_strike_args(&config, days, limit, post_type.as_deref(), keep, dry_run);

    match striker.strike(&run).await {
        Ok(stats) => {
            let code = report_outcome(&stats, run.dry_run);
            std::process::exit(code);
        }
        Err(e) => {
            eprintln!("Failed to strike revisions: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_clean_all(
    explicit_config_path: Option<&str>,
    days: Option<u32>,
    post_type: Option<String>,
    keep: Option<u32>,
    verbose: bool,
    dry_run: bool,
) {
    let mut config = load_config(explicit_config_path);
    apply_verbose(&mut config, verbose);
    init_tracing_or_exit(&config);

    let pool = connect_db(&config).await;
    let striker = Striker::new(pool.revisions());
    let mut run = resolve_strike_args(&config, days, None, post_type.as_deref(), keep, dry_run);

    // Count every eligible revision and use that as the limit, forcing
    // full exhaustion in a single call.
    let count = match pool
        .revisions()
        .count_eligible(&run.post_types, cutoff_for(run.days))
        .await
    {
        Ok(count) => count,
        Err(e) => {
            eprintln!("Failed to count eligible revisions: {}", e);
            std::process::exit(1);
        }
    };

    if count == 0 {
        println!("No errors occurred, but no post revisions were removed.");
        return;
    }
    run.limit = count.min(u32::MAX as i64) as u32;

    match striker.strike(&run).await {
        Ok(stats) => {
            let code = report_outcome(&stats, run.dry_run);
            std::process::exit(code);
        }
        Err(e) => {
            eprintln!("Failed to strike revisions: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_count(
    explicit_config_path: Option<&str>,
    days: Option<u32>,
    post_type: Option<String>,
) {
    let config = load_config(explicit_config_path);
    init_tracing_or_exit(&config);

    let pool = connect_db(&config).await;
    let run = resolve_strike_args(&config, days, None, post_type.as_deref(), None, false);

    match pool
        .revisions()
        .count_eligible(&run.post_types, cutoff_for(run.days))
        .await
    {
        Ok(count) => {
            println!("{}", count);
        }
        Err(e) => {
            eprintln!("Failed to count eligible revisions: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_scheduler(explicit_config_path: Option<&str>) {
    let config = load_config(explicit_config_path);
    init_tracing_or_exit(&config);

    if !config.strike.scheduler.enabled {
        eprintln!(
            "Error: the scheduler is disabled. Set strike.scheduler.enabled = true in the \
             config file, or use `revision-strike clean` for a one-shot pass."
        );
        std::process::exit(1);
    }

    let pool = connect_db(&config).await;
    let striker = Arc::new(Striker::new(pool.revisions()));

    tokio::select! {
        _ = start_strike_worker(striker, config.strike.clone()) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, exiting");
        }
    }
}

async fn run_migrate(explicit_config_path: Option<&str>) {
    let config = load_config(explicit_config_path);
    init_tracing_or_exit(&config);

    let pool = connect_db(&config).await;
    match pool.run_migrations().await {
        Ok(()) => {
            println!("Migrations completed successfully.");
        }
        Err(e) => {
            eprintln!("Migration failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Create a default configuration file (non-interactive).
fn run_init(output: Option<String>, force: bool) {
    let Some(output_path) = output.map(PathBuf::from).or_else(default_config_path) else {
        eprintln!("Could not determine default config path. Please specify one with --output.");
        std::process::exit(1);
    };

    if output_path.exists() && !force {
        eprintln!(
            "Config file already exists: {}\nUse --force to overwrite.",
            output_path.display()
        );
        std::process::exit(1);
    }

    // Create parent directories if needed
    if let Some(parent) = output_path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        eprintln!("Failed to create directory {}: {}", parent.display(), e);
        std::process::exit(1);
    }

    if let Err(e) = std::fs::write(&output_path, default_config_toml()) {
        eprintln!("Failed to write config file: {}", e);
        std::process::exit(1);
    }

    println!("Created config file: {}", output_path.display());
    println!();
    println!("Point the [database] section at your content database, then run:");
    println!("  revision-strike clean --config {}", output_path.display());
}
