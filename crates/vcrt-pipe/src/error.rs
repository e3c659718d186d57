// ABOUTME: Error type for pipe creation, ingestion and the instruction queue.
// ABOUTME: Every variant is fatal to the display except where callers choose otherwise.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to create pipe {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} exists and is not a named pipe")]
    NotAFifo(PathBuf),

    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Pipe I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Instruction queue overflow: {pending} pending + {incoming} incoming exceeds capacity {capacity}")]
    Overflow {
        pending: usize,
        incoming: usize,
        capacity: usize,
    },

    #[error("Ingest thread panicked")]
    Panicked,
}
