mod cli;
mod commands;
mod config;
mod console;

use std::process::ExitCode;

use anyhow::Context as _;
use banana_client::ApiClient;
use clap::Parser;
use tracing::{debug, info};

use crate::{cli::Cli, commands::Context, config::BananaConfig};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("banana error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1) Config
    let mut cfg = BananaConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(url) = cli.base_url {
        cfg.api.base_url = url;
    }

    // 2) Logger
    if cli.verbose {
        cfg.log = cfg.log.with_level("debug");
    } else if cli.quiet {
        cfg.log = cfg.log.with_level("error");
    }
    banana_observe::logger_init(&cfg.log)?;
    debug!(base_url = %cfg.api.base_url, "configuration loaded");

    // 3) Client + poller
    let client = ApiClient::new(&cfg.client_config())?;
    let poll = cfg.poll_config()?;
    let ctx = Context::new(client, poll, cli.output, cli.quiet);

    // 4) Ctrl-C stops every running poll session
    let registry = ctx.registry.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let cancelled = registry.cancel_all();
            info!(cancelled, "interrupted, polling stopped");
        }
    });

    let result = commands::dispatch(cli.command, &ctx).await;
    interrupt.abort();
    ctx.registry.cancel_all();
    result
}
