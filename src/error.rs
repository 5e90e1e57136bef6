//! Error types for plugin setup and nap construction.

use std::fmt;

/// Errors raised while binding the plugin to a stream or building a nap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NapError {
    /// The stream was not read from tracefs data.
    NotTepStream { stream_id: i32 },
    /// A required event is not present in the stream.
    MissingEvent { stream_id: i32, event: String },
    /// The plugin is already initialized for this stream.
    ContextExists { stream_id: i32 },
    /// The switch entry's info has no `" ==>"` marker to read the state from.
    MissingStateMarker { info: String },
    /// The switch entry handle does not resolve to an entry.
    DanglingEntry { index: usize },
    /// The plot row has no anchor for a bin.
    MissingAnchor { bin: usize },
}

impl fmt::Display for NapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NapError::NotTepStream { stream_id } => {
                write!(f, "stream {stream_id}: not a tracefs data stream")
            }
            NapError::MissingEvent { stream_id, event } => {
                write!(f, "stream {stream_id}: event '{event}' not found")
            }
            NapError::ContextExists { stream_id } => {
                write!(f, "stream {stream_id}: plugin context already exists")
            }
            NapError::MissingStateMarker { info } => {
                write!(f, "no prev_state marker in info '{info}'")
            }
            NapError::DanglingEntry { index } => {
                write!(f, "entry handle {index} does not resolve")
            }
            NapError::MissingAnchor { bin } => write!(f, "no plot anchor for bin {bin}"),
        }
    }
}

impl std::error::Error for NapError {}
