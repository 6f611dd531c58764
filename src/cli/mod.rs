use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::application::LedgerService;
use crate::domain::parse_local_datetime;
use crate::mcp::McpServer;
use crate::tools::TransferTools;

/// Directory created under the per-user data directory.
pub const APP_DIR_NAME: &str = "finledger";

/// Database file name inside [`APP_DIR_NAME`].
pub const DATABASE_FILE_NAME: &str = "finledger.db";

/// finledger - income/expense ledger for AI agents
#[derive(Parser)]
#[command(name = "finledger")]
#[command(about = "A personal income/expense ledger exposed as MCP tools over stdio")]
#[command(version)]
pub struct Cli {
    /// Database file path (defaults to <data dir>/finledger/finledger.db)
    #[arg(short, long, env = "FINLEDGER_DATABASE", global = true)]
    pub database: Option<PathBuf>,

    /// Log filter, e.g. "info" or "finledger=debug,sqlx=warn"
    #[arg(long, env = "FINLEDGER_LOG", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the ledger tools over stdio (default)
    Serve,

    /// Create the database and apply migrations, then exit
    Init,

    /// Export transfers in a date range
    Export {
        /// Start date, inclusive (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        from: String,

        /// End date, inclusive (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        to: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        init_logging(&self.log_level)?;

        let database = match self.database {
            Some(path) => path,
            None => default_database_path()?,
        };
        ensure_parent_dir(&database)?;

        let service = LedgerService::init(&database)
            .await
            .with_context(|| format!("Failed to open ledger at {}", database.display()))?;
        let count = service.repository().count().await?;
        tracing::info!(database = %database.display(), transfers = count, "ledger ready");

        let result = match self.command.unwrap_or(Commands::Serve) {
            Commands::Serve => run_serve_command(&service).await,
            Commands::Init => {
                eprintln!("Database initialized: {}", database.display());
                Ok(())
            }
            Commands::Export {
                from,
                to,
                format,
                output,
            } => run_export_command(&service, &from, &to, format, output.as_deref()).await,
        };

        service.repository().close().await;
        result
    }
}

/// Logs go to stderr: stdout carries protocol traffic.
fn init_logging(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter)
        .with_context(|| format!("Invalid log filter '{}'", filter))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("Failed to initialize logging: {err}"))
}

/// `<per-user data dir>/finledger/finledger.db`
pub fn default_database_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("Could not determine the user data directory")?;
    Ok(data_dir.join(APP_DIR_NAME).join(DATABASE_FILE_NAME))
}

fn ensure_parent_dir(database: &Path) -> Result<()> {
    if let Some(parent) = database.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
    }
    Ok(())
}

async fn run_serve_command(service: &LedgerService) -> Result<()> {
    let server = McpServer::new(TransferTools::new(service.clone()));
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tracing::info!("serving MCP tools on stdio");
    server.serve_until(stdin, stdout, interrupted()).await
}

async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("interrupted, shutting down"),
        Err(err) => {
            tracing::warn!("cannot listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    }
}

async fn run_export_command(
    service: &LedgerService,
    from: &str,
    to: &str,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let from = parse_local_datetime(from)?;
    let to = parse_local_datetime(to)?;
    let exporter = Exporter::new(service);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match format {
        ExportFormat::Csv => exporter.export_transfers_csv(from, to, writer).await?,
        ExportFormat::Json => exporter.export_transfers_json(from, to, writer).await?,
    };

    if output.is_some() {
        eprintln!("Exported {} transfers", count);
    }
    Ok(())
}
