//! REPL (Read-Eval-Print Loop) for driving the duet by hand

use crate::output::console::ConsoleFormatter;
use duet_application::Orchestrator;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;
use tracing::warn;

const HISTORY_CAPACITY: usize = 1000;

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Send `text` to `agent`; the thread defaults to the agent name.
    Talk {
        agent: String,
        thread: Option<String>,
        context_from: Option<String>,
        text: String,
    },
    Agents,
    Last { agent: String },
    History { agent: String, thread: Option<String> },
    Help,
    Quit,
}

impl ChatCommand {
    /// Parse one input line.
    ///
    /// ```text
    /// /to <agent> [<- <from>] <text>
    /// /thread <agent> <thread> [<- <from>] <text>
    /// ```
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let Some((command, rest)) = next_word(line) else {
            return Err("empty input".to_string());
        };

        match command {
            "/to" => {
                let (agent, rest) = next_word(rest).ok_or("usage: /to <agent> [<- <from>] <text>")?;
                Self::talk(agent, None, rest)
            }
            "/thread" => {
                let usage = "usage: /thread <agent> <thread> [<- <from>] <text>";
                let (agent, rest) = next_word(rest).ok_or(usage)?;
                let (thread, rest) = next_word(rest).ok_or(usage)?;
                Self::talk(agent, Some(thread), rest)
            }
            "/agents" => Ok(ChatCommand::Agents),
            "/last" => {
                let (agent, _) = next_word(rest).ok_or("usage: /last <agent>")?;
                Ok(ChatCommand::Last {
                    agent: agent.to_string(),
                })
            }
            "/history" => {
                let (agent, rest) = next_word(rest).ok_or("usage: /history <agent> [<thread>]")?;
                Ok(ChatCommand::History {
                    agent: agent.to_string(),
                    thread: next_word(rest).map(|(t, _)| t.to_string()),
                })
            }
            "/help" | "/h" | "/?" => Ok(ChatCommand::Help),
            "/quit" | "/exit" | "/q" => Ok(ChatCommand::Quit),
            other if other.starts_with('/') => Err(format!("Unknown command: {}", other)),
            _ => Err("Address an agent with /to <agent> <text>".to_string()),
        }
    }

    fn talk(agent: &str, thread: Option<&str>, rest: &str) -> Result<Self, String> {
        let (context_from, text) = match rest.strip_prefix("<-") {
            Some(after) => {
                let (from, text) = next_word(after).ok_or("missing agent name after '<-'")?;
                (Some(from.to_string()), text)
            }
            None => (None, rest),
        };
        if text.trim().is_empty() {
            return Err("missing message text".to_string());
        }
        Ok(ChatCommand::Talk {
            agent: agent.to_string(),
            thread: thread.map(str::to_string),
            context_from,
            text: text.trim().to_string(),
        })
    }
}

/// First whitespace-separated word and the remainder (left-trimmed).
fn next_word(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(end) => Some((&s[..end], s[end..].trim_start())),
        None => Some((s, "")),
    }
}

/// Interactive REPL over one orchestrator
pub struct ChatRepl {
    orchestrator: Orchestrator,
    history_path: Option<PathBuf>,
}

impl ChatRepl {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            history_path: dirs::data_dir().map(|p| p.join("agent-duet").join("history.txt")),
        }
    }

    /// Override where line history is kept; `None` disables it.
    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }

    /// Run the interactive REPL until `/quit` or Ctrl-D
    pub async fn run(&self) -> std::io::Result<()> {
        let mut editor = Reedline::create();
        if let Some(path) = &self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
                Ok(history) => editor = editor.with_history(Box::new(history)),
                Err(e) => warn!("Could not open REPL history {}: {}", path.display(), e),
            }
        }
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("duet".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match ChatCommand::parse(&line) {
                        Ok(ChatCommand::Quit) => {
                            println!("Bye!");
                            break;
                        }
                        Ok(command) => self.execute(command).await,
                        Err(message) => {
                            println!("{}", message);
                            println!("Type /help for available commands");
                        }
                    }
                }
                Signal::CtrlC => {
                    println!("^C");
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        let task = self
            .orchestrator
            .main_task()
            .map(|t| t.as_str().to_string())
            .unwrap_or_else(|| "(not set)".to_string());
        println!();
        println!(
            "{}",
            ConsoleFormatter::session_header(&task, &self.orchestrator.agent_names())
        );
        Self::print_help();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        println!("  /to <agent> [<- <from>] <text>           - Talk on the agent's own thread");
        println!("  /thread <agent> <thread> [<- <from>] <text> - Talk on a named thread");
        println!("  /agents                                  - List agents");
        println!("  /last <agent>                            - Show an agent's last reply");
        println!("  /history <agent> [<thread>]              - Show a thread");
        println!("  /help, /h, /?                            - Show this help");
        println!("  /quit, /exit, /q                         - Exit");
        println!();
    }

    async fn execute(&self, command: ChatCommand) {
        match command {
            ChatCommand::Talk {
                agent,
                thread,
                context_from,
                text,
            } => {
                let thread = thread.unwrap_or_else(|| agent.clone());
                match self
                    .orchestrator
                    .talk_to(&agent, &text, &thread, context_from.as_deref())
                    .await
                {
                    Ok(reply) => println!(
                        "{}",
                        ConsoleFormatter::reply(&agent, &thread, context_from.as_deref(), &reply)
                    ),
                    Err(e) => eprintln!("{}", ConsoleFormatter::error(&e)),
                }
            }
            ChatCommand::Agents => {
                println!();
                for name in self.orchestrator.agent_names() {
                    match self.orchestrator.identity(&name) {
                        Some(identity) => println!("  - {} ({})", name, identity.model()),
                        None => println!("  - {}", name),
                    }
                }
                println!();
            }
            ChatCommand::Last { agent } => match self.orchestrator.last_output(&agent) {
                Some(text) => println!("{}", ConsoleFormatter::reply(&agent, "last", None, &text)),
                None => println!("No output from {} yet", agent),
            },
            ChatCommand::History { agent, thread } => {
                let thread = thread.unwrap_or_else(|| agent.clone());
                match self.orchestrator.history(&agent, &thread).await {
                    Ok(messages) => {
                        println!("{}", ConsoleFormatter::history(&agent, &thread, &messages))
                    }
                    Err(e) => eprintln!("{}", ConsoleFormatter::error(&e)),
                }
            }
            ChatCommand::Help => Self::print_help(),
            ChatCommand::Quit => {}
        }
    }
}
