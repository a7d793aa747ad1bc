//! Record Iterator
//!
//! Single pass over both streams in append order.

use std::io::{BufReader, Seek, SeekFrom};

use crate::error::{BcdbError, Result};
use crate::index::{read_full, IndexScanner};
use crate::record::Record;

use super::cursor::CursorGuard;

/// Iterator over every record in append order
///
/// Payloads are contiguous and in index order, so the data stream is read
/// front to back without seeking. Both cursors are restored when the
/// iterator is finished or dropped. The first error ends iteration.
pub struct Records<'a> {
    scanner: IndexScanner<CursorGuard<'a>>,
    data: BufReader<CursorGuard<'a>>,
    /// Length of the data stream when iteration started
    data_len: u64,
    failed: bool,
}

impl<'a> Records<'a> {
    pub(super) fn new(
        index: CursorGuard<'a>,
        mut data: CursorGuard<'a>,
        data_len: u64,
    ) -> Result<Self> {
        let scanner = IndexScanner::new(index)?;
        data.seek(SeekFrom::Start(0))?;
        Ok(Self {
            scanner,
            data: BufReader::new(data),
            data_len,
            failed: false,
        })
    }

    /// Restore both cursors now, reporting seek failures
    pub fn finish(self) -> Result<()> {
        self.scanner.into_inner().restore()?;
        self.data.into_inner().restore()
    }

    fn read_next(&mut self) -> Result<Option<Record>> {
        let item = match self.scanner.next_entry()? {
            Some(item) => item,
            None => return Ok(None),
        };

        if item.data_end() > self.data_len {
            return Err(BcdbError::CorruptStore(format!(
                "record {} ends at data offset {} but data stream holds {} bytes",
                item.position,
                item.data_end(),
                self.data_len
            )));
        }

        let mut payload = vec![0u8; item.entry.payload_size as usize];
        let read = read_full(&mut self.data, &mut payload)?;
        if read < payload.len() {
            return Err(BcdbError::CorruptStore(format!(
                "record {} expects {} payload bytes at data offset {}, found {}",
                item.position, item.entry.payload_size, item.data_offset, read
            )));
        }

        Ok(Some(Record::new(item.entry.identifier, payload)))
    }
}

impl Iterator for Records<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let next = self.read_next();
        if next.is_err() {
            self.failed = true;
        }
        next.transpose()
    }
}
