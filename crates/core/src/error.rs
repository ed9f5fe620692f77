use crate::mapping::MappingId;
use thiserror::Error;
use xmltab_xpath1::XPathError;

/// Errors raised while building a mapping tree, extracting from a document
/// or flattening extraction results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid mapping configuration: {0}")]
    Configuration(String),

    #[error("Expression error in mapping '{mapping}' ({expression}): {source}")]
    Expression {
        mapping: String,
        expression: String,
        #[source]
        source: XPathError,
    },

    #[error(
        "Cardinality of mapping {mapping:?} is frozen at {frozen}, but {observed} instances were observed"
    )]
    FrozenCardinality {
        mapping: MappingId,
        frozen: usize,
        observed: usize,
    },

    #[error("Extraction result does not fit mapping '{mapping}': {message}")]
    ResultMismatch { mapping: String, message: String },
}

impl EngineError {
    pub(crate) fn mismatch(mapping: &str, message: impl Into<String>) -> Self {
        EngineError::ResultMismatch {
            mapping: mapping.to_string(),
            message: message.into(),
        }
    }
}
