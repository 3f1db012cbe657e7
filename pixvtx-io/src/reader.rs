//! Memory-mapped event readers.
//!

use crate::{Error, Result};
use memmap2::Mmap;
use pixvtx_core::{PreparedEvent, RawEvent};
use std::fs::File;
use std::path::{Path, PathBuf};

/// A memory-mapped file reader.
///
/// Uses memmap2 to access file contents without copying the whole file
/// into memory.
pub struct MappedFileReader {
    mmap: Option<Mmap>,
    path: PathBuf,
}

impl MappedFileReader {
    /// Opens a file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // Zero-length files cannot be mapped on every platform.
        let mmap = if file.metadata()?.len() == 0 {
            None
        } else {
            // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
            // This is the standard safety contract for memory mapping.
            #[allow(unsafe_code)]
            let mmap = unsafe { Mmap::map(&file)? };
            Some(mmap)
        };
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the file contents as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Returns the path the reader was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reader for JSON Lines event files, one [`RawEvent`] per line.
pub struct EventFileReader {
    reader: MappedFileReader,
}

impl EventFileReader {
    /// Opens an event file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            reader: MappedFileReader::open(path)?,
        })
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn file_size(&self) -> usize {
        self.reader.len()
    }

    /// Iterates over the events in file order.
    ///
    /// Blank lines are skipped. Each item reports its own parse error.
    ///
    /// # Errors
    /// Returns an error if the file is not valid UTF-8.
    pub fn events(&self) -> Result<EventIter<'_>> {
        let text = std::str::from_utf8(self.reader.as_bytes()).map_err(|e| {
            Error::InvalidFormat(format!(
                "{} is not UTF-8: {e}",
                self.reader.path().display()
            ))
        })?;
        Ok(EventIter {
            lines: text.lines().enumerate(),
        })
    }

    /// Reads every event.
    ///
    /// # Errors
    /// Returns the first parse error, tagged with its line number.
    pub fn read_all(&self) -> Result<Vec<RawEvent>> {
        self.events()?.collect()
    }

    /// Reads and prepares every event for the vertex filter.
    ///
    /// # Errors
    /// Returns the first parse error, tagged with its line number.
    pub fn read_prepared(&self) -> Result<Vec<PreparedEvent>> {
        self.events()?
            .map(|event| event.map(|e| e.prepare()))
            .collect()
    }
}

/// Iterator over the events of a JSON Lines file.
pub struct EventIter<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl Iterator for EventIter<'_> {
    type Item = Result<RawEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, line) in self.lines.by_ref() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            return Some(serde_json::from_str(line).map_err(|source| Error::Json {
                line: index + 1,
                source,
            }));
        }
        None
    }
}
