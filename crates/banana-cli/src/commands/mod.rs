mod jobs;
mod library;
mod settings;

use std::sync::Arc;

use anyhow::Context as _;
use banana_client::ApiClient;
use banana_core::{PollConfig, PollRegistry, Poller};
use serde::Serialize;

use crate::{
    cli::{Commands, OutputFormat},
    console::{Console, ConsoleNotifier},
};

/// Shared state of a command invocation.
pub struct Context {
    pub client: ApiClient,
    pub poller: Poller,
    pub registry: PollRegistry,
    pub console: Console,
    pub output: OutputFormat,
}

impl Context {
    pub fn new(client: ApiClient, poll: PollConfig, output: OutputFormat, quiet: bool) -> Self {
        let console = Console::new(output, quiet);
        let notifier = Arc::new(ConsoleNotifier {
            console: console.clone(),
        });
        let poller = Poller::new(Arc::new(client.clone()), notifier).with_config(poll);
        Self {
            client,
            poller,
            registry: PollRegistry::new(),
            console,
            output,
        }
    }

    /// Print `value` as JSON, or `text()` in text mode.
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
        match self.output {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(value).context("failed to encode output")?;
                println!("{json}");
            }
            OutputFormat::Text => {
                let text = text();
                if !text.is_empty() {
                    println!("{text}");
                }
            }
        }
        Ok(())
    }
}

pub async fn dispatch(command: Commands, ctx: &Context) -> anyhow::Result<()> {
    match command {
        Commands::Material { action } => jobs::material(action, ctx).await,
        Commands::Task { action } => jobs::task(action, ctx).await,
        Commands::Settings { action } => settings::handle(action, ctx).await,
        Commands::Materials { action } => library::materials(action, ctx).await,
        Commands::Projects { action } => library::projects(action, ctx).await,
        Commands::Files { action } => library::files(action, ctx).await,
        Commands::Templates { action } => library::templates(action, ctx).await,
    }
}
