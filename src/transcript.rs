//! Append-only log of executed commands and their outputs.
//!
//! The rendering layer (the REPL print loop) only ever reads this; entries
//! are never mutated after being pushed.

use chrono::{DateTime, Utc};

/// One executed command: the prompt at issuance time, the echoed input
/// (password already masked by the parser), and the result text.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub prompt: String,
    pub input: String,
    pub output: String,
    pub at: DateTime<Utc>,
}

/// Ordered history of transcript entries.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, prompt: String, input: String, output: String) {
        let entry = TranscriptEntry {
            prompt,
            input,
            output,
            at: Utc::now(),
        };
        tracing::debug!(at = %entry.at, input = %entry.input, "transcript append");
        self.entries.push(entry);
    }

    /// Empties the history. Only the `clear` command does this.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter()
    }
}
