//! Shared text output stream for the console reporters

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Cloneable handle to an output stream.
///
/// Every write is a whole line (or table) under the lock, so output from
/// concurrent batches may interleave line by line but never mid-line.
#[derive(Clone)]
pub struct SharedWriter {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl SharedWriter {
    /// Wrap any writer
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Process standard output
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Write `buf` in full and flush
    ///
    /// # Errors
    /// Returns the underlying I/O error, or an error if the lock is poisoned.
    pub fn write_all(&self, buf: &[u8]) -> io::Result<()> {
        let mut writer = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("output stream lock poisoned"))?;
        writer.write_all(buf)?;
        writer.flush()
    }
}

impl std::fmt::Debug for SharedWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedWriter").finish_non_exhaustive()
    }
}
