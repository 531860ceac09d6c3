//! doubletap: repeat a copy or select to ask the assistant about it.
//!
//! `doubletap listen` reads newline-delimited JSON events from stdin (as
//! written by a platform capture helper) and runs the pipeline for every
//! double action. `doubletap exec` runs one pipeline invocation directly.

mod input;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use assist_core::{Action, ActionKind, ContentPayload, ContentType, ImageFormat};
use clap::{Args, Parser, Subcommand};
use futures::Stream;
use orchestrator::{AssistConfig, JsonLinesSink, Orchestrator, TriggerDispatcher};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use trigger_detector::{RawEvent, TriggerDetector, TriggerListener};

use crate::input::EventLine;

#[derive(Debug, Parser)]
#[command(name = "doubletap")]
#[command(about = "Trigger AI translation, explanation and summaries by repeating a copy")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read JSON events from stdin and run the pipeline on every double action
    Listen(ListenArgs),
    /// Run the pipeline once and print the result as JSON
    Exec(ExecArgs),
}

#[derive(Debug, Args)]
struct ListenArgs {
    /// Trigger window in milliseconds (overrides DOUBLETAP_TRIGGER_WINDOW_MS)
    #[arg(long)]
    window_ms: Option<u64>,

    /// Bind a trigger kind to an action, e.g. `drag=summarize` (repeatable)
    #[arg(long = "bind", value_parser = parse_binding)]
    bindings: Vec<(ActionKind, Action)>,

    /// Remove a default binding, e.g. `select` (repeatable)
    #[arg(long)]
    unbind: Vec<String>,
}

#[derive(Debug, Args)]
struct ExecArgs {
    /// Action to perform: translate, explain, summarize or analyze
    #[arg(long, default_value = "translate")]
    action: Action,

    /// Text to process
    #[arg(long, conflicts_with_all = ["file", "image"])]
    text: Option<String>,

    /// File(s) to process (repeatable)
    #[arg(long, conflicts_with = "image")]
    file: Vec<PathBuf>,

    /// Image file to process as clipboard image bytes
    #[arg(long)]
    image: Option<PathBuf>,
}

fn parse_binding(value: &str) -> Result<(ActionKind, Action), String> {
    let (kind, action) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KIND=ACTION, got '{}'", value))?;
    let kind = match kind.parse::<ActionKind>() {
        Ok(kind) => kind,
        Err(never) => match never {},
    };
    Ok((kind, action.parse()?))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries results
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AssistConfig::from_env();

    match cli.command {
        Command::Listen(args) => listen(config, args).await,
        Command::Exec(args) => exec(config, args).await,
    }
}

async fn listen(mut config: AssistConfig, args: ListenArgs) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(ms) = args.window_ms {
        config.trigger_window = Duration::from_millis(ms);
    }
    if !config.has_api_key() {
        warn!("KIMI_API_KEY is not set; every trigger will report api_key_missing");
    }

    let window = config.trigger_window;
    let orchestrator = Arc::new(Orchestrator::from_config(config)?);

    let mut dispatcher = TriggerDispatcher::new(orchestrator, JsonLinesSink::new(io::stdout()));
    for (kind, action) in args.bindings {
        dispatcher = dispatcher.bind(kind, action);
    }
    for kind in &args.unbind {
        let kind = match kind.parse::<ActionKind>() {
            Ok(kind) => kind,
            Err(never) => match never {},
        };
        dispatcher = dispatcher.unbind(&kind);
    }

    info!("Listening for double actions on stdin (window: {} ms)", window.as_millis());
    let listener = TriggerListener::new(TriggerDetector::new(window), dispatcher);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let stats = listener.run_with_shutdown(stdin_events(), shutdown).await;
    info!(
        "Listener stopped: {} events, {} dispatched, {} dropped",
        stats.observed, stats.dispatched, stats.dropped
    );

    Ok(())
}

/// Stream of events parsed from stdin. Bad lines are logged and skipped.
fn stdin_events() -> impl Stream<Item = RawEvent> + Send {
    let lines = BufReader::new(tokio::io::stdin()).lines();

    futures::stream::unfold(lines, |mut lines| async move {
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    return None;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let event = match EventLine::parse(&line) {
                Ok(parsed) => parsed.into_event().await,
                Err(e) => Err(e),
            };
            match event {
                Ok(event) => return Some((event, lines)),
                Err(e) => warn!("Skipping event: {}", e),
            }
        }
    })
}

async fn exec(config: AssistConfig, args: ExecArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (content, content_type) = if let Some(text) = args.text {
        (ContentPayload::text(text), Some(ContentType::Text))
    } else if let Some(path) = args.image {
        let format = path
            .extension()
            .and_then(|e| ImageFormat::from_extension(&e.to_string_lossy()))
            .ok_or("unsupported image extension")?;
        let data = tokio::fs::read(&path).await?;
        (ContentPayload::image(data, format), Some(ContentType::Image))
    } else if !args.file.is_empty() {
        (ContentPayload::files(args.file), Some(ContentType::FilePaths))
    } else {
        return Err("one of --text, --file or --image is required".into());
    };

    let orchestrator = Orchestrator::from_config(config)?;
    let result = orchestrator.execute(content, args.action, content_type).await;

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
