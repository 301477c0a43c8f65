//! CLI entrypoint for agent-duet
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use duet_application::{ConversationLogger, ConversationStore, NoConversationLogger, Orchestrator};
use duet_infrastructure::config::{FileConfig, MemoryBackend, validate_steps};
use duet_infrastructure::{
    ConfigLoader, FileStep, InMemoryConversationStore, JsonlConversationLogger,
    JsonlConversationStore, OpenAiCompletionGateway,
};
use duet_presentation::{ChatRepl, Cli, Command, ConsoleFormatter, OutputFormat, ScriptRunner, ScriptStep};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };

    let log_dir = config.logging.dir.as_ref().and(config.logging.resolved_dir());
    let _guard = init_logging(cli.verbose, log_dir.as_deref());

    info!("Starting agent-duet");

    let issues = config.validate();
    for issue in &issues {
        if issue.is_error() {
            error!("{}", issue.message);
        } else {
            warn!("{}", issue.message);
        }
    }
    if issues.iter().any(|i| i.is_error()) {
        bail!("configuration has errors; see messages above");
    }

    match cli.effective_command() {
        Command::Run {
            script,
            output,
            keep_going,
        } => {
            let (script_task, steps) = match &script {
                Some(path) => {
                    let script = ConfigLoader::load_script(path)
                        .with_context(|| format!("failed to load script {}", path.display()))?;
                    (script.session.main_task, script.steps)
                }
                None => (None, config.steps.clone()),
            };
            if steps.is_empty() {
                bail!("no steps to run: add [[steps]] to the configuration or pass --script");
            }

            let main_task = cli
                .task
                .clone()
                .or(script_task)
                .or_else(|| config.session.main_task.clone());
            let orchestrator = build_orchestrator(&config, main_task)?;
            check_steps(&steps, &orchestrator)?;

            run_script(&orchestrator, &steps, output, keep_going).await
        }
        Command::Chat => {
            let main_task = cli.task.clone().or_else(|| config.session.main_task.clone());
            let orchestrator = build_orchestrator(&config, main_task)?;
            ChatRepl::new(orchestrator).run().await?;
            Ok(())
        }
    }
}

/// Install the tracing subscriber.
///
/// Verbosity maps `-v` counts to levels unless `RUST_LOG` is set. With a log
/// directory, events are also written to a daily rolling file.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) if std::fs::create_dir_all(dir).is_ok() => {
            let appender = tracing_appender::rolling::daily(dir, "agent-duet.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

/// Build the orchestrator from configuration: provider, memory, transcript,
/// main task, credential and agents.
fn build_orchestrator(config: &FileConfig, main_task: Option<String>) -> Result<Orchestrator> {
    let Some(main_task) = main_task else {
        bail!("no main task: pass --task or set [session] main_task");
    };

    let openai = &config.providers.openai;
    let Some(api_key) = openai.resolve_api_key() else {
        bail!(
            "no API key: set {} or [providers.openai] api_key",
            openai.api_key_env
        );
    };

    let gateway = OpenAiCompletionGateway::new(Duration::from_secs(openai.timeout_secs))?
        .with_base_url(&openai.base_url);
    info!(base_url = gateway.base_url(), "Using OpenAI-compatible provider");

    let store: Arc<dyn ConversationStore> = match config.memory.parse_backend().0 {
        MemoryBackend::Memory => Arc::new(InMemoryConversationStore::new()),
        MemoryBackend::Jsonl => {
            let path = config
                .memory
                .resolved_path()
                .context("no data directory for the conversation store; set [memory] path")?;
            Arc::new(JsonlConversationStore::open(&path).with_context(|| {
                format!("failed to open conversation store {}", path.display())
            })?)
        }
    };
    info!(backend = store.backend(), "Conversation memory ready");

    let mut orchestrator = Orchestrator::new(Arc::new(gateway), store)
        .with_conversation_logger(conversation_logger(config))
        .with_main_task(main_task)?;
    orchestrator.set_credential(api_key)?;

    for entry in config.effective_agents() {
        let identity = entry
            .to_identity()
            .with_context(|| format!("invalid agent '{}'", entry.name))?;
        orchestrator.add_agent(identity)?;
    }

    Ok(orchestrator)
}

fn conversation_logger(config: &FileConfig) -> Arc<dyn ConversationLogger> {
    if !config.logging.conversation_log {
        return Arc::new(NoConversationLogger);
    }
    let Some(dir) = config.logging.resolved_dir() else {
        warn!("No log directory available; conversation log disabled");
        return Arc::new(NoConversationLogger);
    };
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("duet-{}.conversation.jsonl", timestamp));
    match JsonlConversationLogger::open(&path) {
        Some(logger) => {
            info!("Conversation log: {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoConversationLogger),
    }
}

fn check_steps(steps: &[FileStep], orchestrator: &Orchestrator) -> Result<()> {
    let names = orchestrator.agent_names();
    let known: HashSet<&str> = names.iter().map(String::as_str).collect();
    let issues = validate_steps(steps, &known);
    for issue in &issues {
        if issue.is_error() {
            error!("{}", issue.message);
        } else {
            warn!("{}", issue.message);
        }
    }
    if issues.iter().any(|i| i.is_error()) {
        bail!("script references unknown agents");
    }
    Ok(())
}

async fn run_script(
    orchestrator: &Orchestrator,
    steps: &[FileStep],
    output: OutputFormat,
    keep_going: bool,
) -> Result<()> {
    let steps: Vec<ScriptStep> = steps
        .iter()
        .map(|step| {
            let script_step = ScriptStep::new(step.agent.trim(), step.input.clone())
                .on_thread(step.thread_id());
            match &step.context_from {
                Some(from) => script_step.with_context_from(from.trim()),
                None => script_step,
            }
        })
        .collect();

    if output == OutputFormat::Text
        && let Some(task) = orchestrator.main_task()
    {
        println!(
            "{}",
            ConsoleFormatter::session_header(task.as_str(), &orchestrator.agent_names())
        );
    }

    let runner = ScriptRunner::new(orchestrator)
        .keep_going(keep_going)
        .echo(output);
    match runner.run(&steps).await {
        Ok(results) => {
            if output == OutputFormat::Json {
                println!("{}", ConsoleFormatter::results_json(&results));
            }
            let failed = results.iter().filter(|r| !r.is_success()).count();
            if failed > 0 {
                bail!("{} of {} steps failed", failed, results.len());
            }
            Ok(())
        }
        Err(e) => {
            if output == OutputFormat::Json {
                println!("{}", ConsoleFormatter::results_json(&e.completed));
            }
            eprintln!("{}", ConsoleFormatter::error(&e.source));
            Err(e.into())
        }
    }
}
