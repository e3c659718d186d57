// ABOUTME: Non-blocking writer for the outbound event pipe.
// ABOUTME: Events are dropped, never queued, while no reader is attached or the pipe is full.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::ChannelError;
use crate::event::Event;
use crate::fifo::Fifo;

pub struct EventWriter {
    fifo: Fifo,
    file: Option<File>,
    congested: bool,
    dropped: u64,
}

impl EventWriter {
    /// Create the event FIFO. Readers may attach at any time afterwards.
    pub fn create(path: &Path) -> Result<Self, ChannelError> {
        Ok(Self {
            fifo: Fifo::create(path)?,
            file: None,
            congested: false,
            dropped: 0,
        })
    }

    pub fn path(&self) -> &Path {
        self.fifo.path()
    }

    pub fn is_connected(&self) -> bool {
        self.file.is_some()
    }

    /// Events discarded so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn send_all(&mut self, events: &[Event]) {
        for event in events {
            self.send(*event);
        }
    }

    pub fn send(&mut self, event: Event) {
        let Some(file) = self.connect() else {
            self.dropped += 1;
            return;
        };

        // A 9-byte write is below PIPE_BUF and therefore atomic
        match file.write(&event.encode()) {
            Ok(_) => self.congested = false,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                if !self.congested {
                    tracing::warn!("Event pipe full, dropping events until the reader catches up");
                    self.congested = true;
                }
                self.dropped += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::debug!("Event reader disconnected");
                self.file = None;
                self.dropped += 1;
            }
            Err(e) => {
                tracing::warn!("Failed to write event: {}", e);
                self.file = None;
                self.dropped += 1;
            }
        }
    }

    fn connect(&mut self) -> Option<&mut File> {
        if self.file.is_none() {
            match self.fifo.open_writer() {
                Ok(file) => {
                    tracing::debug!("Event reader connected to {}", self.fifo.path().display());
                    self.file = Some(file);
                }
                Err(e) if e.raw_os_error() == Some(libc::ENXIO) => {
                    tracing::trace!("No event reader attached, dropping event");
                }
                Err(e) => {
                    tracing::warn!("Failed to open event pipe: {}", e);
                }
            }
        }
        self.file.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EVENT_SIZE;
    use std::io::Read;

    #[test]
    fn drops_without_reader() {
        let path = std::env::temp_dir().join(format!("vcrt_events_none_{}", std::process::id()));
        let mut writer = EventWriter::create(&path).unwrap();
        writer.send(Event::frame_finished());
        assert!(!writer.is_connected());
        assert_eq!(writer.dropped(), 1);
    }

    #[test]
    fn delivers_to_attached_reader() {
        let path = std::env::temp_dir().join(format!("vcrt_events_reader_{}", std::process::id()));
        let mut writer = EventWriter::create(&path).unwrap();
        let mut reader = writer.fifo.open_reader().unwrap();

        writer.send_all(&[Event::frame_finished(), Event::mouse_moved(3, 4)]);
        assert!(writer.is_connected());
        assert_eq!(writer.dropped(), 0);

        let mut bytes = [0u8; EVENT_SIZE * 2];
        reader.read_exact(&mut bytes).unwrap();
        assert_eq!(&bytes[..EVENT_SIZE], &Event::frame_finished().encode());
        assert_eq!(&bytes[EVENT_SIZE..], &Event::mouse_moved(3, 4).encode());
    }
}
