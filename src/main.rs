//! printgate command-line entry point.
//!
//! `printgate serve` runs the HTTP service; `printgate analyze` runs the font
//! fidelity analysis on a local source document and its converted PDF.

use clap::{Args, Parser, Subcommand};
use printgate::{Document, FontFidelityAnalyzer, ServiceConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "printgate", version, about = "Malware-gated PDF conversion with font fidelity reporting")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP conversion service.
    Serve(ServeArgs),
    /// Compare the fonts of a source document with those of its PDF.
    Analyze(AnalyzeArgs),
}

// Each flag overrides the matching field of `ServiceConfig::default()`.
#[derive(Debug, Args)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "PRINTGATE_BIND")]
    bind: Option<String>,

    /// Conversion route of the Gotenberg service.
    #[arg(long, env = "GOTENBERG_URL")]
    conversion_url: Option<String>,

    /// Scan endpoint of the AV service.
    #[arg(long, env = "EXTERNAL_AV_URL")]
    av_url: Option<String>,

    /// Seconds to wait for a conversion before answering 504.
    #[arg(long, env = "CONVERSION_TIMEOUT_SECS")]
    conversion_timeout_secs: Option<u64>,

    /// Seconds to wait for a scan before treating the AV service as unavailable.
    #[arg(long, env = "AV_TIMEOUT_SECS")]
    av_timeout_secs: Option<u64>,

    /// Largest accepted upload in bytes.
    #[arg(long, env = "MAX_UPLOAD_BYTES")]
    max_upload_bytes: Option<usize>,
}

impl ServeArgs {
    fn into_config(self) -> ServiceConfig {
        let mut config = ServiceConfig::default();
        if let Some(bind) = self.bind {
            config = config.with_bind_address(bind);
        }
        if let Some(url) = self.conversion_url {
            config = config.with_conversion_url(url);
        }
        if let Some(url) = self.av_url {
            config = config.with_av_url(url);
        }
        if let Some(secs) = self.conversion_timeout_secs {
            config = config.with_conversion_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.av_timeout_secs {
            config = config.with_av_timeout(Duration::from_secs(secs));
        }
        if let Some(bytes) = self.max_upload_bytes {
            config = config.with_max_upload_bytes(bytes);
        }
        config
    }
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// The document that was converted (only `.docx` font tables are read).
    source: PathBuf,
    /// The PDF produced from it.
    pdf: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Serve(args) => run_server(args.into_config()),
        Command::Analyze(args) => run_analysis(&args.source, &args.pdf),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "printgate failed");
            ExitCode::FAILURE
        }
    }
}

fn run_server(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(printgate::server::serve(config))?;
    Ok(())
}

fn run_analysis(source_path: &Path, pdf_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let filename = source_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let source = Document::new(filename, std::fs::read(source_path)?);
    let pdf = std::fs::read(pdf_path)?;

    let report = FontFidelityAnalyzer::new().analyze(&source, &pdf);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
