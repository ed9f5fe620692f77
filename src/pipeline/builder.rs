// src/pipeline/builder.rs
use super::config::{ConverterConfig, StoreBacking};
use super::coordinator::Converter;
use crate::error::PipelineError;
use xmltab_core::{EmptyContainerPolicy, MappingConfiguration, MappingConfigurationBuilder};

/// A builder for creating a [`Converter`].
#[derive(Debug, Default)]
pub struct ConverterBuilder {
    mapping: Option<MappingConfiguration>,
    config: ConverterConfig,
}

impl ConverterBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Uses an already validated mapping tree.
    pub fn with_mapping(mut self, mapping: MappingConfiguration) -> Self {
        self.mapping = Some(mapping);
        self
    }

    /// Validates and compiles a mapping tree, failing with a configuration
    /// or expression error before any document is read.
    pub fn with_mapping_builder(
        mut self,
        builder: MappingConfigurationBuilder,
    ) -> Result<Self, PipelineError> {
        self.mapping = Some(builder.build()?);
        Ok(self)
    }

    pub fn with_config(mut self, config: ConverterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_trim_whitespace(mut self, trim: bool) -> Self {
        self.config = self.config.with_trim_whitespace(trim);
        self
    }

    pub fn with_empty_container_policy(mut self, policy: EmptyContainerPolicy) -> Self {
        self.config = self.config.with_empty_container_policy(policy);
        self
    }

    pub fn with_store_backing(mut self, backing: StoreBacking) -> Self {
        self.config = self.config.with_store_backing(backing);
        self
    }

    pub fn build(self) -> Result<Converter, PipelineError> {
        let mapping = self.mapping.ok_or_else(|| {
            PipelineError::Configuration("A mapping configuration must be provided".to_string())
        })?;
        Ok(Converter::new(mapping, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmltab_core::{ContainerDefinition, EngineError, ValueDefinition};

    #[test]
    fn test_build_requires_a_mapping() {
        let result = ConverterBuilder::new().build();
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }

    #[test]
    fn test_mapping_errors_surface_before_conversion() {
        let builder = MappingConfiguration::builder().with_container(
            ContainerDefinition::new("A", "/a").with_value(ValueDefinition::new("B", "b[")),
        );
        let result = ConverterBuilder::new().with_mapping_builder(builder);
        assert!(matches!(
            result,
            Err(PipelineError::Mapping(EngineError::Expression { .. }))
        ));
    }

    #[test]
    fn test_settings_reach_the_converter() {
        let mapping = MappingConfiguration::builder()
            .with_container(ContainerDefinition::new("A", "/a").with_value(ValueDefinition::new("B", "b")))
            .build()
            .unwrap();
        let converter = ConverterBuilder::new()
            .with_mapping(mapping)
            .with_trim_whitespace(false)
            .with_empty_container_policy(EmptyContainerPolicy::NoRow)
            .with_store_backing(StoreBacking::Memory)
            .build()
            .unwrap();
        assert!(!converter.config().trim_whitespace);
        assert_eq!(converter.config().empty_container_policy, EmptyContainerPolicy::NoRow);
        assert_eq!(converter.mapping().containers().len(), 1);
    }
}
