pub mod builder;
pub mod config;
pub mod coordinator;
pub mod store;

pub use builder::ConverterBuilder;
pub use config::{ConverterConfig, StoreBacking};
pub use coordinator::{ConversionSummary, Converter};
pub use store::{ResultStore, StoreError, StoreReader, StoreWriter};
