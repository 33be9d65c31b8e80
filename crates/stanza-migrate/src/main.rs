//! stanza-migrate CLI
//!
//! Command-line driver for schema introspection and reconciliation.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use stanza_migrate::executor::Reconciler;
use stanza_migrate::snapshot;

/// Converge a live database onto a declared schema.
#[derive(Parser)]
#[command(name = "stanza-migrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database connection URL (mysql:// or postgres://).
    #[arg(short, long, env = "DATABASE_URL")]
    database: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SQL needed to converge the database onto a schema.
    Plan {
        /// Declared schema snapshot (JSON).
        #[arg(short, long)]
        schema: PathBuf,

        /// Never emit DROP COLUMN statements.
        #[arg(long)]
        skip_drop_column: bool,
    },

    /// Apply the SQL needed to converge the database onto a schema.
    Apply {
        /// Declared schema snapshot (JSON).
        #[arg(short, long)]
        schema: PathBuf,

        /// Never emit DROP COLUMN statements.
        #[arg(long)]
        skip_drop_column: bool,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,
    },

    /// Write the live schema to a snapshot file.
    Introspect {
        /// Output snapshot path (JSON).
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let reconciler = Reconciler::connect(&cli.database).await?;

    match cli.command {
        Commands::Plan {
            schema,
            skip_drop_column,
        } => {
            let declared = snapshot::load(&schema)?;
            let operations = reconciler.plan(&declared, skip_drop_column).await?;
            if operations.is_empty() {
                info!("Schema is up to date.");
            }
            for operation in &operations {
                println!("{};", operation.sql());
            }
        }

        Commands::Apply {
            schema,
            skip_drop_column,
            dry_run,
        } => {
            let declared = snapshot::load(&schema)?;
            let reconciler = reconciler.dry_run(dry_run);
            let operations = reconciler.plan(&declared, skip_drop_column).await?;
            if operations.is_empty() {
                info!("Schema is up to date.");
            } else {
                reconciler.apply(&operations).await?;
            }
        }

        Commands::Introspect { out } => {
            let live = reconciler.introspect().await?;
            snapshot::store(&out, &live)?;
            info!(
                tables = live.tables.len(),
                path = %out.display(),
                "Snapshot written"
            );
        }
    }

    Ok(())
}
