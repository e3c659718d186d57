// ABOUTME: Background thread that turns a byte source into queued instructions.
// ABOUTME: Reads only as much as the queue has room for, so producers block instead of overflowing.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use vcrt_core::INSTRUCTION_SIZE;

use crate::decoder::StreamDecoder;
use crate::error::ChannelError;
use crate::fifo::Fifo;
use crate::queue::InstructionQueue;

const READ_CHUNK: usize = 64 * 1024;
const IDLE_SLEEP: Duration = Duration::from_millis(1);

/// Where instructions come from
pub enum Source {
    /// Live named pipe; runs until stopped
    Pipe { fifo: Fifo, reader: File },
    /// Recorded instruction file; finishes at end of file
    Replay { path: PathBuf, file: File },
}

impl Source {
    /// Create the FIFO and open its read end
    pub fn pipe(path: &Path) -> Result<Self, ChannelError> {
        let fifo = Fifo::create(path)?;
        let reader = fifo.open_reader()?;
        Ok(Source::Pipe { fifo, reader })
    }

    pub fn replay(path: &Path) -> Result<Self, ChannelError> {
        let file = File::open(path).map_err(|source| ChannelError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Source::Replay {
            path: path.to_path_buf(),
            file,
        })
    }

    fn describe(&self) -> String {
        match self {
            Source::Pipe { fifo, .. } => format!("pipe {}", fifo.path().display()),
            Source::Replay { path, .. } => format!("replay {}", path.display()),
        }
    }
}

/// Handle to the running ingest thread
pub struct Ingest {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<Result<(), ChannelError>>>,
}

impl Ingest {
    pub fn spawn(source: Source, queue: InstructionQueue) -> Result<Self, ChannelError> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        tracing::info!("Reading instructions from {}", source.describe());
        let handle = thread::Builder::new()
            .name("vcrt-ingest".to_string())
            .spawn(move || run(source, &queue, &thread_stop))?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// True once the thread has exited on its own (error or end of replay)
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Join the thread if it has exited, returning its result once
    pub fn try_join(&mut self) -> Option<Result<(), ChannelError>> {
        if !self.handle.as_ref().is_some_and(|h| h.is_finished()) {
            return None;
        }
        self.handle.take().map(join)
    }

    /// Ask the thread to stop and wait for it
    pub fn stop(mut self) -> Result<(), ChannelError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), ChannelError> {
        self.stop.store(true, Ordering::Relaxed);
        match self.handle.take() {
            Some(handle) => join(handle),
            None => Ok(()),
        }
    }
}

impl Drop for Ingest {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::error!("Ingest thread ended with error: {}", e);
        }
    }
}

fn join(handle: JoinHandle<Result<(), ChannelError>>) -> Result<(), ChannelError> {
    handle.join().unwrap_or(Err(ChannelError::Panicked))
}

fn run(source: Source, queue: &InstructionQueue, stop: &AtomicBool) -> Result<(), ChannelError> {
    let result = match source {
        Source::Pipe { fifo, mut reader } => {
            let result = pump(&mut reader, queue, stop, false);
            drop(fifo);
            result
        }
        Source::Replay { mut file, path } => {
            let result = pump(&mut file, queue, stop, true);
            if result.is_ok() && !stop.load(Ordering::Relaxed) {
                tracing::info!("Replay of {} finished", path.display());
            }
            result
        }
    };
    if let Err(e) = &result {
        tracing::error!("Instruction ingest failed: {}", e);
    }
    result
}

/// Copy records from `input` into the queue until stopped.
/// With `finish_at_eof` a zero-length read ends the loop; otherwise it means
/// no writer is connected yet.
fn pump(
    input: &mut impl Read,
    queue: &InstructionQueue,
    stop: &AtomicBool,
    finish_at_eof: bool,
) -> Result<(), ChannelError> {
    let mut decoder = StreamDecoder::new();
    let mut buffer = vec![0u8; READ_CHUNK];

    while !stop.load(Ordering::Relaxed) {
        let room = (queue.free_capacity() * INSTRUCTION_SIZE)
            .saturating_sub(decoder.pending_len())
            .min(buffer.len());
        if room == 0 {
            thread::sleep(IDLE_SLEEP);
            continue;
        }

        match input.read(&mut buffer[..room]) {
            Ok(0) if finish_at_eof => {
                if decoder.pending_len() > 0 {
                    tracing::warn!(
                        "Discarding {} trailing bytes of an incomplete instruction",
                        decoder.pending_len()
                    );
                }
                return Ok(());
            }
            Ok(0) => thread::sleep(IDLE_SLEEP),
            Ok(n) => {
                let batch = decoder.feed(&buffer[..n]);
                tracing::trace!(bytes = n, instructions = batch.len(), "Read from source");
                queue.push_batch(&batch)?;
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(IDLE_SLEEP),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
