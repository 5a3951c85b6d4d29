//! Delver CLI - iterative, LLM-directed web research from the command line

use clap::Parser;
use delver_core::{
    init_logging, log_operation_error, log_operation_start, log_operation_success, DelverConfig,
    LoggingConfig,
};
use delver_providers::{
    create_auto_client, DecisionClient, GoogleSearchClient, JinaReaderExtractor, ReportSink,
    SiumaiDecisionClient,
};
use delver_research::{ResearchConfig, ResearchEngine};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "delver")]
#[command(about = "Iterative, LLM-directed web research")]
#[command(version = "0.1.0")]
struct Cli {
    /// Research topic (prompted for when omitted)
    topic: Option<String>,

    /// Maximum research iterations (prompted for when omitted; default 10)
    #[arg(short = 'n', long)]
    max_iterations: Option<usize>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report output path (overrides the configured location)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a default configuration file and exit
    #[arg(long)]
    init_config: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::default();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if cli.init_config {
        return write_default_config(cli.config);
    }

    let config = load_config(cli.config.as_deref())?;
    config.validate()?;

    let topic = match cli.topic {
        Some(topic) => topic,
        None => prompt("Enter your research topic: ")?,
    };
    if topic.trim().is_empty() {
        anyhow::bail!("No research topic provided");
    }

    let iteration_limit = match cli.max_iterations {
        Some(limit) => limit,
        None => {
            let raw = prompt("Maximum number of iterations (default 10): ")?;
            raw.parse().ok().filter(|n| *n > 0).unwrap_or(10)
        }
    };

    log_operation_start!("research", topic = %topic, iteration_limit = iteration_limit);

    let llm: Arc<dyn DecisionClient> = if config.llm.provider == "auto" {
        Arc::new(create_auto_client().await?)
    } else {
        Arc::new(SiumaiDecisionClient::new(config.llm.clone()).await?)
    };
    let search = Arc::new(GoogleSearchClient::new(config.search.clone())?);
    let extractor = Arc::new(JinaReaderExtractor::new(config.extractor.clone())?);

    let research_config = ResearchConfig {
        iteration_limit,
        ..ResearchConfig::default()
    };
    let engine = ResearchEngine::new(research_config, llm, search, extractor);

    let report = match engine.run(&topic).await {
        Ok(report) => report,
        Err(e) => {
            log_operation_error!("research", e);
            return Err(e.into());
        }
    };

    log_operation_success!(
        "research",
        iterations = report.iterations_run,
        contexts = report.contexts_gathered
    );

    println!("\n==== FINAL REPORT ====\n");
    println!("{}", report.content);

    let output_path = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&config.report.output_path));
    let sink = ReportSink::new(output_path);
    if let Err(e) = sink.write(&report.content) {
        log_operation_error!("report_write", e);
    }

    Ok(())
}

/// Read one trimmed line from stdin after printing a prompt
fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{}", message);
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Explicit path, then the default location, then built-in defaults
fn load_config(path: Option<&Path>) -> anyhow::Result<DelverConfig> {
    if let Some(path) = path {
        return Ok(DelverConfig::from_file(path)?);
    }

    if let Some(default_path) = DelverConfig::default_path() {
        if default_path.exists() {
            return Ok(DelverConfig::from_file(default_path)?);
        }
    }

    Ok(DelverConfig::default())
}

fn write_default_config(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = match path.or_else(DelverConfig::default_path) {
        Some(path) => path,
        None => anyhow::bail!("Could not determine a configuration file location"),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    DelverConfig::default().save_to_file(&path)?;

    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
