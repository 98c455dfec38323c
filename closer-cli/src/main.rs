use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use closer_core::TaskStore;
use closer_seed::{
    bootstrap, generate, write_ranked_csv, write_ranked_json, write_snapshot_json,
    BootstrapOptions, DEFAULT_SEED_COUNT,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod report;
mod session;
mod state;

use config::{load_config, Config};

#[derive(Parser, Debug)]
#[command(
    name = "closer",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CLOSER_BUILD_SHA"), ")"),
    about = "Sales task tracker: ranked tasks and performance metrics"
)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load tasks and print the metrics summary plus the top-ranked tasks
    Report {
        /// Snapshot file, http(s) URL, or "none" (defaults to config)
        #[arg(long)]
        source: Option<String>,

        /// Number of ranked tasks to print (defaults to config)
        #[arg(long)]
        limit: Option<usize>,

        /// Print the full view as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Write a synthetic task snapshot
    Seed {
        #[arg(long, default_value_t = DEFAULT_SEED_COUNT)]
        count: usize,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Output path (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Export the ranked task view
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        #[arg(long)]
        source: Option<String>,

        /// Output path (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Interactive session: add, update, delete and undo against one in-memory store
    Session {
        #[arg(long)]
        source: Option<String>,
    },

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config to ~/.closer/config.toml
    Init,
    /// Print the effective config
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!(build = env!("CLOSER_BUILD_SHA"), "closer starting");

    let cfg = load_config()?;

    match cli.command {
        Command::Report { source, limit, json } => {
            let store = load_store(&cfg, source.as_deref()).await?;
            if json {
                let stdout = io::stdout();
                serde_json::to_writer_pretty(stdout.lock(), &store.view())
                    .context("serialize view")?;
                println!();
            } else {
                let tz = cfg.timezone()?;
                println!("# Closer report\n");
                println!("{}", report::render_metrics(&store.metrics()));
                print!(
                    "{}",
                    report::render_ranked(&store.derived_sorted(), limit.unwrap_or(cfg.display.limit), tz)
                );
            }
        }

        Command::Seed { count, seed, out } => {
            let tasks = generate(count, seed, chrono::Utc::now());
            with_output(out.as_ref(), |w| write_snapshot_json(w, &tasks))?;
            if let Some(p) = &out {
                info!(count = tasks.len(), path = %p.display(), "snapshot written");
                println!("Wrote {} tasks to {}", tasks.len(), p.display());
            }
        }

        Command::Export { format, source, out } => {
            let store = load_store(&cfg, source.as_deref()).await?;
            let ranked = store.derived_sorted();
            with_output(out.as_ref(), |w| match format {
                ExportFormat::Csv => write_ranked_csv(w, &ranked),
                ExportFormat::Json => write_ranked_json(w, &ranked),
            })?;
        }

        Command::Session { source } => {
            let opts = cfg.bootstrap_options(source.as_deref());
            let mut store = TaskStore::new();
            bootstrap(&mut store, &opts).await;

            let mut session = session::Session::new(store, cfg.timezone()?, cfg.display.limit);
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            session.run(stdin.lock(), &mut stdout)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}\n", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Bootstrap a store, failing the command if the load failed.
async fn load_store(cfg: &Config, source: Option<&str>) -> Result<TaskStore> {
    let opts: BootstrapOptions = cfg.bootstrap_options(source);
    let mut store = TaskStore::new();
    bootstrap(&mut store, &opts).await;
    if let Some(err) = store.error() {
        bail!("{err} (source: {})", opts.source);
    }
    Ok(store)
}

fn with_output<F>(path: Option<&PathBuf>, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    match path {
        Some(p) => {
            let f = File::create(p).with_context(|| format!("create {}", p.display()))?;
            let mut w = BufWriter::new(f);
            write(&mut w)?;
            w.flush().with_context(|| format!("write {}", p.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut w = stdout.lock();
            write(&mut w)?;
            writeln!(w)?;
        }
    }
    Ok(())
}
