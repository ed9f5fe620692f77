//! A sink writing one CSV file per output group.
//!
//! Records go to temporary files in the target directory, which only
//! become `<group>.csv` when [`OutputSink::finish`] is called. A run that
//! fails part way leaves no complete-looking output behind: the temporary
//! files are removed when the sink is dropped, and a `finish` that fails
//! removes the groups it had already persisted.

use super::OutputSink;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

struct GroupFile {
    group: String,
    target: PathBuf,
    writer: BufWriter<NamedTempFile>,
}

pub struct CsvDirectorySink {
    dir: PathBuf,
    files: Vec<GroupFile>,
    targets: HashSet<PathBuf>,
}

impl CsvDirectorySink {
    /// Creates the sink, creating `dir` if needed.
    pub fn new(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            files: Vec::new(),
            targets: HashSet::new(),
        })
    }

    /// The path `group`'s records are written to once the sink finishes.
    pub fn path_for(&self, group: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", file_stem(group)))
    }

    fn writer_for(&mut self, group: &str) -> io::Result<&mut BufWriter<NamedTempFile>> {
        let position = match self.files.iter().position(|f| f.group == group) {
            Some(position) => position,
            None => {
                let target = self.path_for(group);
                if !self.targets.insert(target.clone()) {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!(
                            "output group '{}' maps to '{}', which another group already uses",
                            group,
                            target.display()
                        ),
                    ));
                }
                debug!("Opening temporary output for group '{}'", group);
                self.files.push(GroupFile {
                    group: group.to_string(),
                    target,
                    writer: BufWriter::new(NamedTempFile::new_in(&self.dir)?),
                });
                self.files.len() - 1
            }
        };
        Ok(&mut self.files[position].writer)
    }
}

impl OutputSink for CsvDirectorySink {
    fn write_record(&mut self, group: &str, row: &[String]) -> io::Result<()> {
        write_csv_row(self.writer_for(group)?, row)
    }

    /// Flushes every group before the first file is persisted. If a later
    /// persist fails, the files already persisted are removed again.
    fn finish(&mut self) -> io::Result<()> {
        let mut flushed = Vec::with_capacity(self.files.len());
        for file in self.files.drain(..) {
            let temp = file.writer.into_inner().map_err(|e| e.into_error())?;
            flushed.push((file.group, file.target, temp));
        }

        let mut persisted: Vec<PathBuf> = Vec::with_capacity(flushed.len());
        for (group, target, temp) in flushed {
            if let Err(e) = temp.persist(&target) {
                for path in &persisted {
                    if let Err(cleanup) = fs::remove_file(path) {
                        warn!("Could not remove partial output {}: {}", path.display(), cleanup);
                    }
                }
                return Err(e.error);
            }
            info!("Wrote output group '{}' to {}", group, target.display());
            persisted.push(target);
        }
        Ok(())
    }
}

/// Group names may contain anything; file names are limited to
/// alphanumerics, `-` and `_`.
fn file_stem(group: &str) -> String {
    group
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Writes one RFC 4180 record terminated by CRLF.
pub fn write_csv_row<W: Write>(out: &mut W, row: &[String]) -> io::Result<()> {
    for (i, field) in row.iter().enumerate() {
        if i > 0 {
            out.write_all(b",")?;
        }
        if field.contains([',', '"', '\r', '\n']) {
            out.write_all(b"\"")?;
            out.write_all(field.replace('"', "\"\"").as_bytes())?;
            out.write_all(b"\"")?;
        } else {
            out.write_all(field.as_bytes())?;
        }
    }
    out.write_all(b"\r\n")
}
