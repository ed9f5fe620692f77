//! The mapping evaluation and tabularization engine.
//!
//! A [`MappingConfiguration`] describes which values to pull out of a
//! document and how they nest. The [`Extractor`] evaluates it against a
//! document, recording instance counts in a [`CardinalityTable`]; once every
//! document of a batch has been seen, the table is frozen and
//! [`flatten_document`] turns each extraction into rows with a stable
//! column layout described by [`headers`].

pub mod cardinality;
pub mod definition;
pub mod error;
pub mod extract;
pub mod flatten;
pub mod mapping;
pub mod naming;

pub use cardinality::CardinalityTable;
pub use definition::{ContainerDefinition, MappingConfigurationBuilder, MappingDefinition, ValueDefinition};
pub use error::EngineError;
pub use extract::{DocumentExtraction, ExtractionResult, Extractor};
pub use flatten::{EmptyContainerPolicy, GroupHeader, GroupRows, Row, flatten_document, headers};
pub use mapping::{
    ContainerMapping, Mapping, MappingConfiguration, MappingId, MultiValueBehaviour, OutputGrouping,
    ValueMapping,
};
pub use naming::{ColumnFormat, InlineFormat, ParentContext, column_name};
