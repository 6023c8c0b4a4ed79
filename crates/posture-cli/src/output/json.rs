//! JSON event output.

use anyhow::Result;
use posture_core::{EventHandler, PostureEvent};
use std::io::{self, Write};
use std::sync::Mutex;

/// Writes each posture event as one JSON document.
pub struct JsonEventOutput {
    writer: Mutex<Box<dyn Write + Send>>,
    pretty: bool,
}

impl JsonEventOutput {
    /// Creates a new JSON output writing to stdout.
    #[must_use]
    pub fn stdout(pretty: bool) -> Self {
        Self::new(Box::new(io::stdout()), pretty)
    }

    /// Creates a new JSON output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>, pretty: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            pretty,
        }
    }

    /// Writes and flushes one event.
    #[allow(clippy::significant_drop_tightening)]
    pub fn write(&self, event: &PostureEvent) -> Result<()> {
        let json = if self.pretty {
            serde_json::to_string_pretty(event)?
        } else {
            serde_json::to_string(event)?
        };
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{json}")?;
        writer.flush()?;
        Ok(())
    }
}

impl EventHandler<PostureEvent> for JsonEventOutput {
    fn handle(&self, event: &PostureEvent) -> Result<()> {
        self.write(event)
    }
}
