use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use chorus_core::{
    AnthropicAdapter, Fanout, GoogleAdapter, OpenAiAdapter, OpenRouterAdapter, ProviderAdapter,
};
use chorus_gateway::GatewayServer;
use config::ChorusConfig;

#[derive(Parser)]
#[command(name = "chorus")]
#[command(version)]
#[command(about = "Ask several hosted LLMs the same question at once")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the fanout HTTP server
    Serve {
        /// Bind address (overrides CHORUS_BIND)
        #[arg(long)]
        bind: Option<String>,

        /// Port (overrides CHORUS_PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Send a one-shot prompt to every provider and print the replies
    Ask {
        /// The prompt to send
        prompt: String,
    },

    /// Show the configured providers
    Providers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = ChorusConfig::from_env();

    match cli.command {
        Commands::Serve { bind, port } => cmd_serve(config, bind, port).await,
        Commands::Ask { prompt } => cmd_ask(config, &prompt).await,
        Commands::Providers => cmd_providers(&config),
    }
}

/// Build the four adapters from config. The set and its display names are
/// fixed; which of them answer with real replies depends only on which
/// credentials were supplied.
fn build_fanout(config: &ChorusConfig) -> Fanout {
    let p = &config.providers;
    let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![
        Arc::new(OpenAiAdapter::new(
            p.openai.api_key.clone(),
            p.openai.model.clone(),
            p.openai.base_url.clone(),
        )),
        Arc::new(AnthropicAdapter::new(
            p.anthropic.api_key.clone(),
            p.anthropic.model.clone(),
            p.anthropic.base_url.clone(),
        )),
        Arc::new(GoogleAdapter::new(
            p.google.api_key.clone(),
            p.google.model.clone(),
            p.google.base_url.clone(),
        )),
        Arc::new(OpenRouterAdapter::new(
            p.openrouter.api_key.clone(),
            p.openrouter.model.clone(),
            p.openrouter.base_url.clone(),
        )),
    ];
    Fanout::new(adapters)
}

async fn cmd_serve(config: ChorusConfig, bind: Option<String>, port: Option<u16>) -> Result<()> {
    let fanout = Arc::new(build_fanout(&config));
    for name in fanout.provider_names() {
        info!("provider registered: {}", name);
    }

    let bind = bind.unwrap_or(config.gateway.bind);
    let port = port.unwrap_or(config.gateway.port);
    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address {bind}:{port}"))?;

    GatewayServer::new(addr, fanout).run().await
}

async fn cmd_ask(config: ChorusConfig, prompt: &str) -> Result<()> {
    let fanout = build_fanout(&config);
    let names = fanout.provider_names();
    let replies = fanout.ask_all(prompt).await;

    for name in names {
        println!("── {name} ──");
        match replies.get(&name) {
            Some(text) => println!("{text}"),
            None => println!("(no answer available)"),
        }
        println!();
    }
    Ok(())
}

fn cmd_providers(config: &ChorusConfig) -> Result<()> {
    let p = &config.providers;
    for (name, cfg) in [
        ("ChatGPT", &p.openai),
        ("Claude", &p.anthropic),
        ("Gemini", &p.google),
        ("MetaAI", &p.openrouter),
    ] {
        let state = if cfg.api_key.is_some() {
            "configured"
        } else {
            "not configured"
        };
        println!("{name:<10} {:<40} {state}", cfg.model);
    }
    Ok(())
}
