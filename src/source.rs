//! Input documents.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xmltab_xml::XmlError;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("could not be read: {0}")]
    Read(#[from] io::Error),

    #[error("is not well-formed: {0}")]
    Parse(#[from] XmlError),
}

/// A document to convert: an identifier used in diagnostics and the
/// document's XML text.
pub trait DocumentSource {
    fn id(&self) -> &str;

    fn load(&self) -> io::Result<Cow<'_, str>>;
}

impl<T: DocumentSource + ?Sized> DocumentSource for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn load(&self) -> io::Result<Cow<'_, str>> {
        (**self).load()
    }
}

/// A document read from disk when it is converted.
#[derive(Debug, Clone)]
pub struct FileDocument {
    path: PathBuf,
    id: String,
}

impl FileDocument {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let id = path.display().to_string();
        Self { path, id }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentSource for FileDocument {
    fn id(&self) -> &str {
        &self.id
    }

    fn load(&self) -> io::Result<Cow<'_, str>> {
        fs::read_to_string(&self.path).map(Cow::Owned)
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryDocument {
    id: String,
    text: String,
}

impl InMemoryDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

impl DocumentSource for InMemoryDocument {
    fn id(&self) -> &str {
        &self.id
    }

    fn load(&self) -> io::Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(&self.text))
    }
}
