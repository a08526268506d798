//! Interactive chat REPL
//!
//! Line editing and history via rustyline; slash commands for everything
//! that isn't a message to the model.

use std::path::PathBuf;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use synapse_application::{Conversation, ConversationError};
use synapse_domain::ToolDescriptor;

pub struct ChatRepl {
    conversation: Conversation,
    tools: Vec<ToolDescriptor>,
}

impl ChatRepl {
    pub fn new(conversation: Conversation, tools: Vec<ToolDescriptor>) -> Self {
        Self {
            conversation,
            tools,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()?;
        let history_path = history_path();
        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }

        println!("synapse chat - /help for commands, /quit to exit");

        let mut outcome = Ok(());
        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = editor.add_history_entry(line);

                    if let Some(command) = line.strip_prefix('/') {
                        if !self.handle_command(command) {
                            break;
                        }
                        continue;
                    }

                    match self.conversation.send(line).await {
                        Ok(reply) => {
                            if reply.text.is_empty() {
                                println!("(no reply)");
                            } else {
                                println!("{}", reply.text);
                            }
                        }
                        Err(ConversationError::Cancelled) => {
                            println!("(cancelled)");
                            break;
                        }
                        // The turn ceiling ends the whole conversation, not
                        // just the round. Report the spend on the way out.
                        Err(e @ ConversationError::MaxTurnsExceeded { .. }) => {
                            eprintln!("error: {e}");
                            self.print_usage();
                            outcome = Err(e.into());
                            break;
                        }
                        // Other round-level failures end the round, not the
                        // REPL; history up to the failure is kept.
                        Err(e) => eprintln!("error: {e}"),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("input error: {e}");
                    break;
                }
            }
        }

        if let Some(path) = &history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = editor.save_history(path);
        }
        outcome
    }

    /// Returns false when the REPL should exit.
    fn handle_command(&self, command: &str) -> bool {
        match command.trim() {
            "quit" | "exit" | "q" => return false,
            "help" => {
                println!("/tools  list available tools");
                println!("/usage  token usage so far");
                println!("/quit   exit");
            }
            "usage" => self.print_usage(),
            "tools" => {
                for tool in &self.tools {
                    println!("{:<16} {}", tool.name, tool.summary);
                }
            }
            other => println!("unknown command '/{other}', try /help"),
        }
        true
    }

    fn print_usage(&self) {
        let usage = self.conversation.usage();
        println!(
            "{} requests, {} input + {} output = {} tokens ({} cached)",
            usage.requests,
            usage.input_tokens,
            usage.output_tokens,
            usage.total(),
            usage.cached_tokens
        );
    }
}

fn history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("synapse").join("history.txt"))
}
