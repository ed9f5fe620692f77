//! The intermediate result store.
//!
//! Pass 1 appends one record per document as a line of JSON, then a
//! terminal record carrying the number of documents written:
//!
//! ```text
//! {"kind":"document","document":"a.xml","results":[...]}
//! {"kind":"document","document":"b.xml","results":[...]}
//! {"kind":"end","count":2}
//! ```
//!
//! Replay stops at the end marker. Running out of input before it, or
//! finding anything else, is a format error.

use super::config::StoreBacking;
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use thiserror::Error;
use xmltab_core::DocumentExtraction;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode store record {index}: {source}")]
    Encode {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Corrupt store record {index}: {message}")]
    Corrupt { index: usize, message: String },

    #[error("Unexpected store record type '{kind}' at index {index}")]
    UnexpectedRecord { index: usize, kind: String },

    #[error("Store ended at record {index} without an end marker")]
    MissingEndMarker { index: usize },

    #[error("End marker at record {index} declares {declared} documents, but {replayed} were replayed")]
    CountMismatch {
        index: usize,
        declared: usize,
        replayed: usize,
    },

    #[error("Unexpected data after the end marker at record {index}")]
    TrailingData { index: usize },
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum OutgoingRecord<'e> {
    Document(&'e DocumentExtraction),
    End { count: usize },
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum IncomingRecord {
    Document(DocumentExtraction),
    End { count: usize },
}

const KNOWN_KINDS: [&str; 2] = ["document", "end"];

/// Appends records to any writer.
pub struct StoreWriter<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> StoreWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn append(&mut self, extraction: &DocumentExtraction) -> Result<(), StoreError> {
        self.write_record(&OutgoingRecord::Document(extraction))?;
        self.written += 1;
        Ok(())
    }

    /// Number of documents appended so far.
    pub fn len(&self) -> usize {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Writes the end marker, flushes, and hands back the writer.
    pub fn finish(mut self) -> Result<W, StoreError> {
        self.write_record(&OutgoingRecord::End {
            count: self.written,
        })?;
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_record(&mut self, record: &OutgoingRecord<'_>) -> Result<(), StoreError> {
        let index = self.written;
        serde_json::to_writer(&mut self.out, record)
            .map_err(|source| StoreError::Encode { index, source })?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

/// Replays records in the order they were written.
///
/// Yields each document once, then `None` after a valid end marker. After
/// the first error the reader yields nothing more.
pub struct StoreReader<R: BufRead> {
    input: R,
    index: usize,
    line: String,
    done: bool,
}

impl<R: BufRead> StoreReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            index: 0,
            line: String::new(),
            done: false,
        }
    }

    fn read_line(&mut self) -> Result<usize, StoreError> {
        self.line.clear();
        self.input.read_line(&mut self.line).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => StoreError::Corrupt {
                index: self.index,
                message: "record is not valid UTF-8".to_string(),
            },
            _ => StoreError::Io(e),
        })
    }

    fn next_record(&mut self) -> Result<Option<DocumentExtraction>, StoreError> {
        if self.read_line()? == 0 {
            return Err(StoreError::MissingEndMarker { index: self.index });
        }
        let index = self.index;
        let value: serde_json::Value =
            serde_json::from_str(&self.line).map_err(|e| StoreError::Corrupt {
                index,
                message: e.to_string(),
            })?;
        let kind = value
            .get("kind")
            .and_then(|k| k.as_str())
            .ok_or_else(|| StoreError::Corrupt {
                index,
                message: "record has no 'kind'".to_string(),
            })?;
        if !KNOWN_KINDS.contains(&kind) {
            return Err(StoreError::UnexpectedRecord {
                index,
                kind: kind.to_string(),
            });
        }

        let record: IncomingRecord = serde_json::from_value(value).map_err(|e| StoreError::Corrupt {
            index,
            message: e.to_string(),
        })?;
        match record {
            IncomingRecord::Document(extraction) => {
                self.index += 1;
                Ok(Some(extraction))
            }
            IncomingRecord::End { count } => {
                if count != index {
                    return Err(StoreError::CountMismatch {
                        index,
                        declared: count,
                        replayed: index,
                    });
                }
                if self.read_line()? != 0 {
                    return Err(StoreError::TrailingData { index });
                }
                debug!("Store replay reached the end marker after {} documents", count);
                Ok(None)
            }
        }
    }
}

impl<R: BufRead> Iterator for StoreReader<R> {
    type Item = Result<DocumentExtraction, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(extraction)) => Some(Ok(extraction)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Anything the store can be written to and read back from.
pub trait StoreBuffer: Read + Write + Seek {}
impl<T: Read + Write + Seek> StoreBuffer for T {}

/// A store over its configured backing, written once and replayed once.
pub struct ResultStore {
    writer: StoreWriter<BufWriter<Box<dyn StoreBuffer>>>,
}

impl ResultStore {
    pub fn create(backing: StoreBacking) -> Result<Self, StoreError> {
        let buffer: Box<dyn StoreBuffer> = match backing {
            #[cfg(feature = "tempfile")]
            StoreBacking::TempFile => Box::new(tempfile::tempfile()?),
            StoreBacking::Memory => Box::new(Cursor::new(Vec::new())),
        };
        debug!("Created intermediate store backed by {:?}", backing);
        Ok(Self {
            writer: StoreWriter::new(BufWriter::new(buffer)),
        })
    }

    pub fn append(&mut self, extraction: &DocumentExtraction) -> Result<(), StoreError> {
        self.writer.append(extraction)
    }

    pub fn len(&self) -> usize {
        self.writer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writer.is_empty()
    }

    /// Terminates the store and rewinds it for replay.
    pub fn replay(self) -> Result<StoreReader<BufReader<Box<dyn StoreBuffer>>>, StoreError> {
        let mut buffer = self
            .writer
            .finish()?
            .into_inner()
            .map_err(|e| StoreError::Io(e.into_error()))?;
        buffer.seek(SeekFrom::Start(0))?;
        Ok(StoreReader::new(BufReader::new(buffer)))
    }
}
