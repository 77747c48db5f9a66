//! CLI entry point for the linkscout tool.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use indicatif::ProgressBar;
use linkscout_core::{
    Analyzer, DeepAuditor, FallbackPolicy, GeminiOracle, HeadProbe, SearchRequest, StaticRenderer,
    VerificationOutcome, build_default_source_chain,
};
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!(
        filename = %args.filename,
        filetype = %args.filetype,
        mode = %args.mode,
        "Linkscout starting"
    );

    let request = SearchRequest::new(args.filename.as_str(), args.filetype.as_str(), args.mode);

    // Environment-based oracle configuration is the setup layer's concern.
    let oracle = GeminiOracle::from_env();
    if !oracle.is_configured() {
        warn!("GEMINI_API_KEY not set; page audits degrade to fallback verdicts");
    }

    let fallback = if args.strict {
        FallbackPolicy::FailClosed
    } else {
        FallbackPolicy::FailOpen
    };

    let auditor = DeepAuditor::new(Arc::new(StaticRenderer::new()), Arc::new(oracle), fallback);
    let analyzer = Analyzer::new(build_default_source_chain(), HeadProbe::new(), auditor);

    let spinner = if args.quiet {
        None
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_message("Scanning candidates...");
        spinner.enable_steady_tick(Duration::from_millis(120));
        Some(spinner)
    };

    let results = analyzer.run(&request).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    info!(verified = results.len(), "Search complete");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No verified links found for \"{}\".", args.filename);
    } else {
        print_results(&results);
    }

    Ok(())
}

fn print_results(results: &[VerificationOutcome]) {
    for (rank, outcome) in results.iter().enumerate() {
        println!(
            "{:>2}. [{:>3}] {:<4} {}",
            rank + 1,
            outcome.trust_score,
            outcome.link_type,
            outcome.title
        );
        println!("      {}", outcome.download_link);
        println!("      {}", outcome.snippet);
    }
}
