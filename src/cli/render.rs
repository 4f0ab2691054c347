use std::io::{self, Write};

use crossterm::style::Stylize;

use crate::chat::{Event, STATUS_DONE};

/// Writes an event stream to a terminal, printing only the newly added part of each prefix.
#[derive(Debug, Default)]
pub struct EventRenderer {
    printed_chars: usize,
}

impl EventRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, out: &mut dyn Write, event: &Event) -> io::Result<()> {
        match event {
            Event::Status(status) if status == STATUS_DONE => {
                if self.printed_chars > 0 {
                    writeln!(out)?;
                }
                self.printed_chars = 0;
            }
            Event::Status(status) => {
                writeln!(out, "{}", format!("[{}]", status).dark_grey())?;
            }
            Event::Response(prefix) => {
                let added: String = prefix.chars().skip(self.printed_chars).collect();
                write!(out, "{}", added)?;
                self.printed_chars = prefix.chars().count();
            }
            Event::Error(message) => {
                if self.printed_chars > 0 {
                    writeln!(out)?;
                }
                writeln!(out, "{}", format!("Error: {}", message).red())?;
                self.printed_chars = 0;
            }
        }
        out.flush()
    }
}
