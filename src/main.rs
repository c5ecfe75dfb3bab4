pub mod connect;
pub mod engine;
pub mod error;
pub mod executor;
pub mod prompt;
pub mod provision;

use clap::Parser;
use engine::ProvisioningEngine;
use error::{CliError, Result};
use executor::DryRun;
use provision::{Dialect, Operation, ProvisioningError, policy_for};
use std::io;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Create or remove database users on an RDS instance
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// add-user, add-service-user or remove-user
    #[arg(short, long)]
    operation: Option<Operation>,

    /// mysql or postgres
    #[arg(short, long)]
    dialect: Option<Dialect>,

    /// Host name of the RDS instance
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Master username
    #[arg(short, long)]
    username: Option<String>,

    /// Database to connect to
    #[arg(long, value_name = "DATABASE NAME")]
    database: Option<String>,

    /// Print the statements without connecting or asking for the master password
    #[arg(long)]
    dry_run: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Cancelled) => {
            eprintln!("Cancelled.");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "rdsuser=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(io::stderr)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let mut prompter = prompt::Prompter::new()?;
    let operation = match args.operation {
        Some(operation) => operation,
        None => prompter.operation()?,
    };
    let dialect = match args.dialect {
        Some(dialect) => dialect,
        None => prompter.dialect()?,
    };
    // fail before asking for credentials
    if operation == Operation::AddServiceUser && !policy_for(dialect).supports_service_user() {
        return Err(ProvisioningError::UnsupportedOperation { operation, dialect }.into());
    }

    let config = prompter.connection(
        dialect,
        args.endpoint,
        args.username,
        args.database,
        !args.dry_run,
    )?;
    println!();

    if args.dry_run {
        println!("Dry run, nothing is sent to {}", config.redacted_dsn());
        let request = prompter.request(operation, dialect, &config.database)?;
        let mut engine = ProvisioningEngine::new(DryRun::default(), io::stdout());
        engine.run(request).await?;
        return Ok(());
    }

    let conn = config.connect().await?;
    println!("Connection to RDS instance confirmed.");
    let request = prompter.request(operation, dialect, &config.database)?;

    let mut engine = ProvisioningEngine::new(conn, io::stdout());
    let outcome = engine.run(request).await;
    let (conn, _) = engine.into_parts();
    if let Err(e) = conn.close().await {
        warn!(error = %e, "could not close connection");
    }
    Ok(outcome?)
}
