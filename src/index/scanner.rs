//! Index Scanner
//!
//! Sequential walk over the index stream that recovers each record's data
//! offset by summing the payload sizes seen so far.

use std::io::{self, BufReader, Read, Seek, SeekFrom};

use crate::error::{BcdbError, Result};

use super::{IndexEntry, ENTRY_SIZE};

/// One decoded index entry plus where its payload starts in the data stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanItem {
    /// 0-based append position
    pub position: u64,
    pub entry: IndexEntry,
    /// Sum of payload sizes of all earlier entries
    pub data_offset: u64,
}

impl ScanItem {
    /// Data offset just past this record's payload
    pub fn data_end(&self) -> u64 {
        self.data_offset + u64::from(self.entry.payload_size)
    }
}

/// Iterator over index entries from the start of the stream
///
/// A clean end of stream ends iteration. A partial trailing entry yields
/// `CorruptStore` once, then iteration ends.
pub struct IndexScanner<R: Read + Seek> {
    reader: BufReader<R>,
    /// Position of the next entry to be read
    position: u64,
    /// Data offset of the next entry to be read
    data_offset: u64,
    done: bool,
}

impl<R: Read + Seek> IndexScanner<R> {
    /// Rewind `inner` to byte 0 and start scanning
    pub fn new(mut inner: R) -> Result<Self> {
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self {
            reader: BufReader::new(inner),
            position: 0,
            data_offset: 0,
            done: false,
        })
    }

    /// Read the next entry
    ///
    /// Returns:
    /// - `Ok(Some(item))` — a complete entry
    /// - `Ok(None)` — end of stream
    /// - `Err(CorruptStore)` — the stream ends inside an entry
    pub fn next_entry(&mut self) -> Result<Option<ScanItem>> {
        if self.done {
            return Ok(None);
        }

        let mut buf = [0u8; ENTRY_SIZE];
        let read = read_full(&mut self.reader, &mut buf)?;

        if read == 0 {
            self.done = true;
            return Ok(None);
        }

        if read < ENTRY_SIZE {
            self.done = true;
            return Err(BcdbError::CorruptStore(format!(
                "torn index entry at byte {}: {} of {} bytes present",
                self.position * ENTRY_SIZE as u64,
                read,
                ENTRY_SIZE
            )));
        }

        let entry = IndexEntry::decode(&buf);
        let item = ScanItem {
            position: self.position,
            entry,
            data_offset: self.data_offset,
        };

        self.position += 1;
        self.data_offset += u64::from(entry.payload_size);

        Ok(Some(item))
    }

    /// Scan until `pred` matches; `Ok(None)` when the stream ends first
    pub fn find_entry<F>(&mut self, mut pred: F) -> Result<Option<ScanItem>>
    where
        F: FnMut(&ScanItem) -> bool,
    {
        while let Some(item) = self.next_entry()? {
            if pred(&item) {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    /// Number of complete entries read so far
    pub fn entries_read(&self) -> u64 {
        self.position
    }

    /// Total payload bytes described by the entries read so far
    pub fn data_bytes_described(&self) -> u64 {
        self.data_offset
    }

    /// Give back the underlying stream (cursor is wherever buffering left it)
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

impl<R: Read + Seek> Iterator for IndexScanner<R> {
    type Item = Result<ScanItem>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}

/// Read until `buf` is full or the stream ends, returning bytes read
///
/// Unlike `read_exact`, a short read is reported as a count rather than an
/// error so callers can tell a clean end (0) from a torn tail.
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
