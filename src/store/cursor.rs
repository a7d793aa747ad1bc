//! Cursor Guard
//!
//! Scoped read transaction over one stream: the cursor is captured on entry
//! and put back on every exit path.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

use crate::error::Result;

/// Saves a file's cursor and restores it when finished or dropped
///
/// On the success path call [`CursorGuard::restore`] so a failed seek is
/// reported. Early returns (errors, misses) fall back to `Drop`, which
/// restores and can only log a failure.
pub(crate) struct CursorGuard<'a> {
    file: &'a mut File,
    saved: u64,
    restored: bool,
}

impl<'a> CursorGuard<'a> {
    /// Capture the current cursor of `file`
    pub(crate) fn capture(file: &'a mut File) -> Result<Self> {
        let saved = file.stream_position()?;
        Ok(Self {
            file,
            saved,
            restored: false,
        })
    }

    /// Seek back to the captured position, propagating seek errors
    pub(crate) fn restore(mut self) -> Result<()> {
        self.file.seek(SeekFrom::Start(self.saved))?;
        self.restored = true;
        Ok(())
    }
}

impl Read for CursorGuard<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for CursorGuard<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl Drop for CursorGuard<'_> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = self.file.seek(SeekFrom::Start(self.saved)) {
            tracing::error!(saved = self.saved, error = %e, "failed to restore stream cursor");
        }
    }
}
