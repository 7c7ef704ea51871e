//! Default working-memory renderer.
//!
//! Produces the rolling history shown inside the main context: every record
//! in the buffer, merged chronologically and formatted through the log
//! formatter.

use crate::log::format_log_entry;
use contextloom_core::{LogRecord, Node, Result, WorkingMemoryRenderer, WorkingMemoryRequest};
use tracing::trace;

/// Renders working memory as a chronological sequence of log elements.
///
/// - processed records are dropped unless the request includes them
/// - with a size, only the most recent `size` records are kept
#[derive(Debug, Clone, Copy, Default)]
pub struct LogWorkingMemoryRenderer;

impl WorkingMemoryRenderer for LogWorkingMemoryRenderer {
    fn render(&self, request: &WorkingMemoryRequest<'_>) -> Result<Vec<Node>> {
        let mut logs: Vec<&LogRecord> = request.memory.logs();
        let total = logs.len();

        if !request.processed {
            logs.retain(|record| !record.processed);
        }
        if let Some(size) = request.size {
            let skip = logs.len().saturating_sub(size);
            logs.drain(..skip);
        }

        trace!(total, kept = logs.len(), "Rendering working memory");
        Ok(logs
            .into_iter()
            .map(|record| format_log_entry(&record.entry))
            .collect())
    }
}
