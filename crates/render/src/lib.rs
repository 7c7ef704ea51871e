//! Prompt document formatters for ContextLoom.
//!
//! Turns the agent's state into one canonical text document:
//!
//! 1. **Interfaces**: output and action declarations with their schemas
//! 2. **Contexts**: the active context tree, with working memory injected
//!    into the main context
//! 3. **Logs**: the interaction history, one element per entry
//!
//! Every operation is a pure function of its inputs. Nothing here mutates
//! the state it is given, and every failure (unknown log kind, schema
//! conversion, callback) propagates to the caller unchanged.

pub mod context;
pub mod formatter;
pub mod interface;
pub mod log;
pub mod value;
pub mod working_memory;

pub use context::{ContextParts, format_context, format_contexts};
pub use formatter::{Document, FormatOptions, Formatter};
pub use interface::{format_action, format_output_interface};
pub use log::{
    Msg, format_input, format_log_entry, format_log_value, format_log_values, format_msg,
    format_output,
};
pub use value::format_value;
pub use working_memory::LogWorkingMemoryRenderer;
