// ABOUTME: Named pipe (FIFO) lifecycle: created at startup, removed when dropped.
// ABOUTME: A stale FIFO at the path is replaced; any other file there is an error.

use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};
use std::path::{Path, PathBuf};

use crate::error::ChannelError;

#[derive(Debug)]
pub struct Fifo {
    path: PathBuf,
}

impl Fifo {
    pub fn create(path: &Path) -> Result<Self, ChannelError> {
        let create_error = |source: io::Error| ChannelError::Create {
            path: path.to_path_buf(),
            source,
        };

        match std::fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_fifo() => {
                tracing::debug!("Replacing stale pipe at {}", path.display());
                std::fs::remove_file(path).map_err(create_error)?;
            }
            Ok(_) => return Err(ChannelError::NotAFifo(path.to_path_buf())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(create_error(e)),
        }

        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| create_error(io::Error::new(io::ErrorKind::InvalidInput, e)))?;
        // SAFETY: c_path is a valid NUL-terminated string for the duration of the call
        let ret = unsafe { libc::mkfifo(c_path.as_ptr(), 0o666) };
        if ret != 0 {
            return Err(create_error(io::Error::last_os_error()));
        }

        tracing::info!("Named pipe created: {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read end. Succeeds without a writer; reads then return 0 or WouldBlock.
    pub fn open_reader(&self) -> Result<File, ChannelError> {
        OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.path)
            .map_err(|source| ChannelError::Open {
                path: self.path.clone(),
                source,
            })
    }

    /// Write end. Fails with ENXIO while nobody has the pipe open for reading.
    pub fn open_writer(&self) -> io::Result<File> {
        OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.path)
    }
}

impl Drop for Fifo {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed pipe {}", self.path.display()),
            Err(e) => tracing::warn!("Failed to remove pipe {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vcrt_fifo_{}_{}", name, std::process::id()))
    }

    #[test]
    fn creates_and_removes() {
        let path = temp_path("lifecycle");
        {
            let fifo = Fifo::create(&path).unwrap();
            let meta = std::fs::symlink_metadata(fifo.path()).unwrap();
            assert!(meta.file_type().is_fifo());
        }
        assert!(!path.exists());
    }

    #[test]
    fn replaces_stale_fifo() {
        let path = temp_path("stale");
        let first = Fifo::create(&path).unwrap();
        std::mem::forget(first);

        let second = Fifo::create(&path).unwrap();
        assert!(std::fs::symlink_metadata(second.path())
            .unwrap()
            .file_type()
            .is_fifo());
    }

    #[test]
    fn refuses_regular_file() {
        let path = temp_path("regular");
        std::fs::write(&path, b"not a pipe").unwrap();

        let err = Fifo::create(&path).unwrap_err();
        assert!(matches!(err, ChannelError::NotAFifo(_)));
        assert!(path.exists());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn writer_needs_a_reader() {
        let path = temp_path("writer");
        let fifo = Fifo::create(&path).unwrap();

        let err = fifo.open_writer().unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::ENXIO));

        let _reader = fifo.open_reader().unwrap();
        assert!(fifo.open_writer().is_ok());
    }
}
