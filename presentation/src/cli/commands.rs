//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for scripted runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One formatted block per reply
    #[default]
    Text,
    /// A JSON array of step results
    Json,
}

/// CLI arguments for agent-duet
#[derive(Parser, Debug)]
#[command(name = "agent-duet")]
#[command(author, version, about = "Generator/critic duet - two LLM agents refine a text toward one goal")]
#[command(long_about = r#"
agent-duet coordinates two LLM agents (by default a generator and a critic).
Every turn is addressed explicitly: you pick the agent, the thread and, when
the turn builds on the other agent's work, the agent whose last reply is
handed over as context together with the main task.

Configuration files are loaded from (in priority order):
1. DUET_* environment variables
2. --config <path>     Explicit config file
3. ./duet.toml         Project-level config
4. ~/.config/agent-duet/config.toml   Global config

Example:
  agent-duet --task "Plan a product launch" chat
  agent-duet run --script demos/gtm.toml
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Main task shared by all agents (overrides [session] main_task)
    #[arg(short, long, global = true, value_name = "TEXT")]
    pub task: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the scripted session from [[steps]] (or --script)
    Run {
        /// TOML file with [[steps]] (and optionally [session])
        #[arg(short, long, value_name = "PATH")]
        script: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,

        /// Continue with the next step after a failed one
        #[arg(long)]
        keep_going: bool,
    },
    /// Start the interactive REPL (default)
    Chat,
}

impl Cli {
    /// The subcommand to run; `chat` when none was given.
    pub fn effective_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }
}
