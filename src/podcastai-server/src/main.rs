//! PodcastAI - transcription to podcast service
//!
//! Serves the podcast generation API, or generates a single script from the
//! command line.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use podcastai_core::{Config, PodcastOrchestrator, PodcastRequest, Presenter};
use podcastai_server::console::print_script;
use podcastai_server::observability::{TracingConfig, init_tracing};
use podcastai_server::{AppState, create_router};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(
    name = "podcastai",
    version,
    about = "Turn transcriptions into multi-presenter podcasts",
    long_about = "Generates podcast scripts with an OpenAI-compatible LLM and voices them with a text-to-speech provider."
)]
struct Cli {
    /// Path to a TOML config file (defaults are used when omitted)
    #[arg(short, long, global = true, value_name = "PATH", env = "PODCASTAI_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve(ServeArgs),
    /// Generate one script and print it
    Script(ScriptArgs),
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, value_name = "HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,
}

#[derive(Args)]
struct ScriptArgs {
    /// File containing the transcription
    #[arg(short, long, value_name = "PATH")]
    transcription_file: PathBuf,

    /// Presenter as NAME or NAME:PERSONALITY (specify once per presenter)
    #[arg(short = 'p', long = "presenter", action = ArgAction::Append, value_name = "PRESENTER")]
    presenters: Vec<String>,

    /// Podcast style, e.g. "Tech News"
    #[arg(short, long, value_name = "STYLE")]
    style: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env();

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => serve(config, args).await,
        Command::Script(args) => script(config, args).await,
    }
}

async fn serve(mut config: Config, args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_tracing(TracingConfig::default());

    if config.script.api_key.is_empty() {
        tracing::warn!("No script API key set (SCRIPT_API_KEY / GEMINI_API_KEY); generation calls may fail");
    }
    if config.speech.api_key.is_empty() {
        tracing::warn!("No speech API key set (SPEECH_API_KEY / ELEVENLABS_API_KEY); synthesis calls may fail");
    }

    let config = Arc::new(config);
    let orchestrator = PodcastOrchestrator::from_config(Arc::clone(&config))?;
    let router = create_router(AppState::new(orchestrator, Arc::clone(&config)));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(
        %addr,
        files_dir = %config.storage.files_dir.display(),
        model = %config.script.model,
        "Listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}

async fn script(config: Config, args: ScriptArgs) -> Result<(), Box<dyn std::error::Error>> {
    let transcription = std::fs::read_to_string(&args.transcription_file)?;

    if config.script.api_key.is_empty() {
        eprintln!(
            "{}",
            "Warning: SCRIPT_API_KEY / GEMINI_API_KEY not set. API calls may fail.".yellow()
        );
    }

    let presenters: Vec<Presenter> = args
        .presenters
        .iter()
        .map(|p| match p.split_once(':') {
            Some((name, personality)) => Presenter::new(name.trim(), personality.trim()),
            None => Presenter::new(p.trim(), ""),
        })
        .collect();

    let orchestrator = PodcastOrchestrator::from_config(Arc::new(config))?;
    let request = PodcastRequest {
        transcription,
        style: args.style,
        presenters,
        return_base64: false,
    };

    match orchestrator.script_only(&request).await {
        Ok(script) => {
            print_script(&script);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}
