//! Converts XML documents into flat tables.
//!
//! A batch is converted in two passes: the first extracts every document
//! and learns how many instances each mapping can produce, the second
//! replays the extractions and writes rows whose column layout is the same
//! for every document of the batch.
//!
//! ```no_run
//! use xmltab::{ConverterBuilder, FileDocument, MemorySink};
//! use xmltab::core::{ContainerDefinition, MappingConfiguration, ValueDefinition};
//!
//! # fn main() -> Result<(), xmltab::PipelineError> {
//! let mapping = MappingConfiguration::builder().with_container(
//!     ContainerDefinition::new("Family", "/family")
//!         .with_value(ValueDefinition::new("Name", "@surname")),
//! );
//! let converter = ConverterBuilder::new().with_mapping_builder(mapping)?.build()?;
//! let mut sink = MemorySink::new();
//! converter.convert([FileDocument::new("family.xml")], &mut sink)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod pipeline;
pub mod sink;
pub mod source;

pub use error::PipelineError;
pub use pipeline::{ConversionSummary, Converter, ConverterBuilder, ConverterConfig, StoreBacking};
#[cfg(feature = "tempfile")]
pub use sink::CsvDirectorySink;
pub use sink::{MemorySink, OutputSink};
pub use source::{DocumentError, DocumentSource, FileDocument, InMemoryDocument};

pub use xmltab_core as core;
pub use xmltab_xml as xml;
pub use xmltab_xpath1 as xpath;
