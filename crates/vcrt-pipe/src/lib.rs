// ABOUTME: Inter-process plumbing: FIFOs, the shared instruction queue and the ingest thread.
// ABOUTME: Also encodes and writes outbound events for clients listening on the event pipe.

pub mod decoder;
pub mod error;
pub mod event;
pub mod fifo;
pub mod ingest;
pub mod queue;
pub mod writer;

pub use decoder::StreamDecoder;
pub use error::ChannelError;
pub use event::{Event, EventKind, MouseButton, EVENT_SIZE};
pub use fifo::Fifo;
pub use ingest::{Ingest, Source};
pub use queue::{InstructionQueue, QUEUE_FRAMES};
pub use writer::EventWriter;
