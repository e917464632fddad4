use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use layoutgen::{commands, ProjectConfig, CONFIG_FILE_NAME};
use layoutgen_core::EngineRevision;

#[derive(Parser)]
#[command(name = "layoutgen")]
#[command(about = "Generate ABI-stable C value types and layout checks for engine bindings", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Project configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Catalog definition file (TOML or JSON), overrides the config
    #[arg(long, global = true, conflicts_with = "revision")]
    catalog: Option<PathBuf>,

    /// Built-in engine revision, overrides the config
    #[arg(long, global = true)]
    revision: Option<EngineRevision>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the C header and native layout assertions
    Emit {
        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Also write the declarations as JSON under this file name
        #[arg(long)]
        declarations: Option<String>,
    },

    /// Record the current layouts as a baseline snapshot
    Snapshot {
        /// Snapshot file (defaults to the configured baseline)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare the current layouts against a baseline snapshot
    Check {
        /// Baseline snapshot (defaults to the configured baseline)
        #[arg(short, long)]
        baseline: Option<PathBuf>,
    },

    /// List every type with its external name and layout
    List {
        #[arg(short, long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ListFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG takes precedence over the flags
    let level = if cli.debug {
        tracing::Level::TRACE
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.debug) // Show target module in debug mode
        .with_writer(std::io::stderr)
        .init();

    let mut config = ProjectConfig::load_or_default(&cli.config)?;
    if let Some(catalog) = cli.catalog {
        config.catalog = Some(catalog);
    }
    if let Some(revision) = cli.revision {
        config.catalog = None;
        config.revision = revision;
    }

    let catalog = commands::load_catalog(&config)?;

    match cli.command {
        Commands::Emit {
            output_dir,
            declarations,
        } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if declarations.is_some() {
                config.declarations = declarations;
            }
            for path in commands::emit(&config, &catalog)? {
                println!("{}", path.display());
            }
            Ok(())
        }
        Commands::Snapshot { output } => {
            let output = output.unwrap_or_else(|| config.baseline.clone());
            let snapshot = commands::snapshot(&catalog, &output)?;
            println!("{} {}", snapshot.fingerprint()?, output.display());
            Ok(())
        }
        Commands::Check { baseline } => {
            let baseline = baseline.unwrap_or_else(|| config.baseline.clone());
            let report = commands::check(&catalog, &baseline)?;
            println!("{}", report.format_summary());

            if report.is_breaking() {
                error!(
                    "{} layout break(s) against {:?}",
                    report.layout_breaks().count(),
                    baseline
                );
                std::process::exit(1);
            }
            info!("Layouts are compatible with {:?}", baseline);
            Ok(())
        }
        Commands::List { format } => {
            let output = match format {
                ListFormat::Table => commands::list(&catalog)?,
                ListFormat::Json => commands::list_json(&catalog)?,
            };
            print!("{}", output);
            Ok(())
        }
    }
}
