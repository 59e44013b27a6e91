use anyhow::{Context, Result};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::warn;

use crate::app::{Config, ConfigStore};
use crate::models::OpenAiProvider;
use crate::session::{HistoryStore, SessionEngine, TerminalMenu};
use crate::tui::render_markdown;
use crate::utils::{ClipboardSource, KitError, SystemClipboard};

/// One-shot user content for the security-news mode; the actual topics and
/// domain restrictions travel in the system directive.
pub const SECURITY_NEWS_REQUEST: &str = "What is the latest security news?";

/// Wires the stores, the provider, and the clipboard together and drives
/// sessions from the CLI surface.
pub struct Runtime {
    store: ConfigStore,
    config: Config,
    history: HistoryStore,
    provider: OpenAiProvider,
    clipboard: SystemClipboard,
}

impl Runtime {
    pub fn new() -> Result<Self> {
        let store = ConfigStore::open()?;
        let config = store.load_or_recover()?;
        store.seed_instructions()?;
        let history = HistoryStore::new(store.config_dir().join("chats"));
        let provider = OpenAiProvider::from_env()
            .context("set OPENAI_API_KEY to use this tool: export OPENAI_API_KEY='your-key'")?;
        Ok(Self {
            store,
            config,
            history,
            provider,
            clipboard: SystemClipboard,
        })
    }

    fn engine(&self) -> SessionEngine<'_> {
        SessionEngine::new(&self.store, &self.config, &self.history, &self.provider)
    }

    /// Interactive chat loop: read a line, run one exchange, render the
    /// reply. `exit`, Ctrl-C, or Ctrl-D ends the session. Provider errors
    /// abort the turn, not the loop.
    pub async fn run_interactive(&self, mode_identifier: &str, resume: bool) -> Result<()> {
        let engine = self.engine();
        let mut session = engine.start(mode_identifier, resume, &TerminalMenu)?;
        if session.resumed {
            println!(
                "{}",
                format!("Chat restored ({} messages)", session.transcript.turns.len()).green()
            );
        }

        let mut editor = DefaultEditor::new()?;
        loop {
            match editor.readline("\u{1f4ac} ") {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    if line.eq_ignore_ascii_case("exit") {
                        break;
                    }
                    let _ = editor.add_history_entry(&line);

                    println!("{}", format!("{} is thinking...", session.params.model).dimmed());
                    match engine.run_turn(&mut session, Some(line), &self.clipboard).await {
                        Ok(reply) => self.show_reply(&reply, true),
                        Err(e @ KitError::Provider(_)) => {
                            eprintln!("{}", format!("Error: {}", e).red());
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Single request/response run for the text-processing and security
    /// modes; `input` of `None` falls back to the clipboard.
    pub async fn run_one_shot(
        &self,
        mode_identifier: &str,
        input: Option<String>,
        copy_reply: bool,
    ) -> Result<()> {
        let engine = self.engine();
        let mut session = engine.start(mode_identifier, false, &TerminalMenu)?;
        if input.is_none() {
            println!("{}", "Reading input from clipboard".dimmed());
        }

        println!("{}", format!("{} is thinking...", session.params.model).dimmed());
        let reply = engine.run_turn(&mut session, input, &self.clipboard).await?;
        self.show_reply(&reply, copy_reply);
        Ok(())
    }

    fn show_reply(&self, reply: &str, copy: bool) {
        println!("{}", render_markdown(reply));
        if copy {
            if let Err(e) = self.clipboard.write(reply) {
                warn!(error = %e, "could not copy reply to clipboard");
            }
        }
    }
}
