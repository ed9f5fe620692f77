// src/error.rs
use crate::pipeline::store::StoreError;
use crate::source::DocumentError;
use std::io;
use thiserror::Error;
use xmltab_core::EngineError;

/// Every way a conversion run can fail. The first error aborts the run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Building the mapping tree failed.
    #[error("Mapping error: {0}")]
    Mapping(#[from] EngineError),

    #[error("Document '{document}' {source}")]
    DocumentLoad {
        document: String,
        #[source]
        source: DocumentError,
    },

    #[error("Extraction failed for document '{document}': {source}")]
    Extraction {
        document: String,
        #[source]
        source: EngineError,
    },

    #[error("Intermediate store is unusable: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to write output group '{group}': {source}")]
    SinkWrite {
        group: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to finalize output: {0}")]
    SinkFinish(#[source] io::Error),
}
