mod apply;
mod browser;
mod cli;
mod config;
mod errors;
mod llm_client;
mod models;
mod pipeline;
mod resume;
mod search;
#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Args;
use crate::config::Config;
use crate::pipeline::RunSetup;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        error!("{e:#}");
        println!("\nError: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // .env is loaded here, before clap reads its env fallbacks
    let config = Config::from_env()?;
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::new(args.log_directive(config.rust_log.as_deref())))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting applybot v{}", env!("CARGO_PKG_VERSION"));
    args.print_banner();

    let request = args.run_request();
    let setup = RunSetup {
        config: &config,
        resume_path: &args.resume,
        api_key: args.api_key.clone(),
        headless: config.headless && !args.headful,
    };
    let summary = pipeline::execute(setup, &request).await?;

    info!("Summary: {summary}");
    println!("Thank you for using the Automated Job Application Bot!");
    Ok(())
}
