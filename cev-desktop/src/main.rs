//! cev-desktop - Chemical Equipment Visualizer client

use anyhow::Result;
use cev_desktop::charts;
use cev_desktop::sample::write_sample_csv;
use cev_desktop::{ApiClient, ClientConfig, UploadOutcome, UploadWorker, DEFAULT_API_URL};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(
    name = "cev-desktop",
    version,
    about = "Chemical Equipment Visualizer client"
)]
struct Cli {
    /// API base URL
    #[arg(long, env = "CEV_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    #[arg(long, env = "CEV_API_USERNAME", default_value = "admin", global = true)]
    username: String,

    #[arg(
        long,
        env = "CEV_API_PASSWORD",
        default_value = "admin123",
        hide_env_values = true,
        global = true
    )]
    password: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload a CSV file and show its summary
    Upload { file: PathBuf },
    /// List the retained uploads, newest first
    History {
        /// Show full details of the newest upload
        #[arg(long)]
        details: bool,
    },
    /// Download the PDF report for an upload (latest by default)
    Report {
        #[arg(long)]
        id: Option<i64>,

        /// Destination file (defaults to the server-suggested name)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Write the bundled sample dataset
    Sample {
        #[arg(long, short, default_value = "sample_equipment_data.csv")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!(
        "cev-desktop v{} using {}",
        env!("CARGO_PKG_VERSION"),
        cli.api_url
    );

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Command::Sample { output } = &cli.command {
        write_sample_csv(output)?;
        println!("Sample data written to {}", output.display());
        return Ok(());
    }

    let client = ApiClient::new(ClientConfig {
        base_url: cli.api_url,
        username: cli.username,
        password: cli.password,
    })?;

    match cli.command {
        Command::Upload { file } => {
            let rx = UploadWorker::spawn(client, file);
            match UploadWorker::wait(rx).await {
                UploadOutcome::Success(response) => {
                    println!("{}\n", response.message);
                    println!("{}", charts::statistics_panel(&response.data));
                    println!("{}", charts::type_distribution_chart(&response.data));
                    println!("{}", charts::averages_chart(&response.data));
                }
                UploadOutcome::Failure(message) => anyhow::bail!(message),
            }
        }
        Command::History { details } => {
            let history = client.history().await?;
            if history.data.is_empty() {
                println!("No uploads yet.");
            }
            for upload in &history.data {
                println!("{}", charts::history_line(upload));
            }
            if let (true, Some(newest)) = (details, history.data.first()) {
                println!("\n{}", charts::details(newest));
            }
        }
        Command::Report { id, output } => {
            let report = client.download_report(id).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(&report.filename));
            tokio::fs::write(&path, &report.bytes).await?;
            info!("Wrote {} bytes", report.bytes.len());
            println!("PDF report saved to {}", path.display());
        }
        Command::Sample { .. } => {}
    }

    Ok(())
}
