//! CLI entrypoint for synapse
//!
//! Wires the layers together with dependency injection and dispatches to
//! either the interactive REPL or the one-shot runner.
//!
//! Exit codes: 0 on success, 1 when the tool turn ceiling ends the
//! conversation, 2 on unrecoverable transport, schema, or configuration
//! errors.

mod demo_tools;
mod progress;
mod repl;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use synapse_application::{Conversation, ConversationError, TranscriptLogger};
use synapse_infrastructure::{
    ConfigError, ConfigLoader, JsonlTranscript, RegistryInvoker, SchemaGenerator, SessionConfig,
    ToolRegistry, build_provider,
};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use demo_tools::register_task_tray;
use progress::ConsoleProgress;
use repl::ChatRepl;

#[derive(Parser)]
#[command(name = "synapse", about = "Tool-calling chat for hosted models", version)]
struct Cli {
    /// One-shot prompt; omit for the interactive REPL
    prompt: Option<String>,

    /// Path to a config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip all config files and use built-in defaults
    #[arg(long)]
    no_config: bool,

    /// Provider family: anthropic or openai
    #[arg(long)]
    provider: Option<String>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// System prompt override
    #[arg(long)]
    system: Option<String>,

    /// Write a JSONL transcript to this path
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Ceiling on consecutive tool-requesting responses per round
    #[arg(long)]
    max_turns: Option<usize>,

    /// Suppress tool activity output
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(e: &anyhow::Error) -> ExitCode {
    match e.downcast_ref::<ConversationError>() {
        Some(ConversationError::MaxTurnsExceeded { .. }) => ExitCode::from(1),
        Some(ConversationError::Cancelled) => ExitCode::from(1),
        // Transport/schema failures and everything else unrecoverable
        _ => ExitCode::from(2),
    }
}

fn load_config(cli: &Cli) -> Result<SessionConfig, ConfigError> {
    let mut file = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    // CLI flags beat every file source
    if let Some(provider) = &cli.provider {
        file.provider.kind = provider.clone();
    }
    if let Some(model) = &cli.model {
        file.provider.model = Some(model.clone());
    }
    if let Some(system) = &cli.system {
        file.conversation.system_prompt = system.clone();
    }
    if let Some(path) = &cli.transcript {
        file.log.transcript = Some(path.clone());
    }
    if let Some(limit) = cli.max_turns {
        file.conversation.max_tool_turns = limit;
    }

    SessionConfig::resolve(file)
}

async fn run(cli: Cli, config: SessionConfig) -> anyhow::Result<()> {
    info!(provider = %config.kind, model = %config.model, "starting synapse");

    // === Dependency injection ===
    let mut registry = ToolRegistry::new();
    register_task_tray(&mut registry)?;
    // Fail fast on a bad signature instead of mid-conversation
    let descriptors = SchemaGenerator::generate_all(&registry)?;
    let invoker = Arc::new(RegistryInvoker::new(Arc::new(registry)));

    let provider = build_provider(
        config.kind,
        config.api_key.clone(),
        config.model.clone(),
        config.base_url.clone(),
    );

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let mut conversation = Conversation::new(provider, invoker, &config.system_prompt)
        .with_max_tool_turns(config.max_tool_turns)
        .with_cancellation(cancel);

    if !cli.quiet {
        conversation = conversation.with_progress(Arc::new(ConsoleProgress));
    }
    if let Some(path) = &config.transcript
        && let Some(transcript) = JsonlTranscript::new(path)
    {
        info!(path = %transcript.path().display(), "writing transcript");
        let transcript: Arc<dyn TranscriptLogger> = Arc::new(transcript);
        conversation = conversation.with_transcript(transcript);
    }

    match cli.prompt {
        Some(prompt) => {
            let result = conversation.send(&prompt).await;
            let usage = conversation.usage();
            match result {
                Ok(reply) => {
                    println!("{}", reply.text);
                    info!(requests = usage.requests, tokens = usage.total(), "done");
                    Ok(())
                }
                Err(e) => {
                    // The round ended early but the spend still happened
                    if matches!(e, ConversationError::MaxTurnsExceeded { .. }) {
                        eprintln!(
                            "{} requests, {} input + {} output = {} tokens",
                            usage.requests,
                            usage.input_tokens,
                            usage.output_tokens,
                            usage.total()
                        );
                    }
                    Err(e.into())
                }
            }
        }
        None => ChatRepl::new(conversation, descriptors).run().await,
    }
}
