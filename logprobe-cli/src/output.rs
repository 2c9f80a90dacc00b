//! Output formatting for text vs JSON rendering
//!
//! The text form is the single plugin line the monitoring system reads.

use std::io::Write;

use logprobe_core::State;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub state: State,
    pub message: String,
}

impl Report {
    pub fn new(state: State, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
        }
    }
}

/// Writes a [`Report`] in the selected format.
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a report to stdout.
    pub fn render(&self, report: &Report) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.write(&mut handle, report)
    }

    /// Render a report to an arbitrary writer.
    pub fn write(&self, w: &mut dyn Write, report: &Report) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => writeln!(w, "{}", report.message)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut *w, report)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}
