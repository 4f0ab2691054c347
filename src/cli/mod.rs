pub mod render;

use std::io::Write;
use std::process::ExitCode;

use eyre::Result;
use futures::StreamExt;
use rustyline::error::ReadlineError;
use rustyline::{CompletionType, Config, Editor};

use crate::chat::{Event, StreamingOrchestrator};
use render::EventRenderer;

const WELCOME_TEXT: &str = "
Hi, I'm Gemini Chat. Ask me anything, answers are backed by a live web search.

/help         Show the help dialogue
/quit         Quit the application
";

const HELP_TEXT: &str = "
Gemini Chat

Every question is searched on the web and matched against earlier answers
before Gemini replies. Earlier turns are remembered across sessions when a
history file is configured.

/help         Show this help dialogue
/quit         Quit the application
";

const PROMPT: &str = "> ";

/// Local REPL that drives the same pipeline as the HTTP endpoint.
pub struct ChatContext {
    output: Box<dyn Write>,
    input: Option<String>,
    orchestrator: StreamingOrchestrator,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        input: Option<String>,
        orchestrator: StreamingOrchestrator,
    ) -> Self {
        Self {
            output,
            input,
            orchestrator,
        }
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        // Non-interactive mode (single query)
        if let Some(input) = self.input.take() {
            let answered = self.ask(&input).await?;
            return Ok(if answered {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }

        writeln!(self.output, "{}", WELCOME_TEXT)?;
        self.run_interactive().await?;
        Ok(ExitCode::SUCCESS)
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .build();
        let mut rl = Editor::<()>::with_config(config)?;

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line);

                    match line {
                        "/quit" => break,
                        "/help" => writeln!(self.output, "{}", HELP_TEXT)?,
                        _ => {
                            if let Err(e) = self.ask(line).await {
                                writeln!(self.output, "Error: {}", e)?;
                            }
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        Ok(())
    }

    /// Streams one answer to the output. Returns `false` when the turn ended in an error event.
    async fn ask(&mut self, query: &str) -> Result<bool> {
        let mut events = self.orchestrator.respond(query)?;
        let mut renderer = EventRenderer::new();
        let mut answered = true;

        while let Some(event) = events.next().await {
            if matches!(event, Event::Error(_)) {
                answered = false;
            }
            renderer.render(self.output.as_mut(), &event)?;
        }

        Ok(answered)
    }
}
