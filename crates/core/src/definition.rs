//! Declarative mapping definitions and the builder that validates and
//! compiles them into a [`MappingConfiguration`].

use crate::error::EngineError;
use crate::mapping::{
    ContainerMapping, Mapping, MappingConfiguration, MappingId, MultiValueBehaviour, OutputGrouping,
    ValueMapping,
};
use crate::naming::{ColumnFormat, InlineFormat};
use log::debug;
use std::collections::HashSet;
use xmltab_xpath1::{CompiledExpression, NamespaceContext, compile};

#[derive(Debug, Clone)]
pub enum MappingDefinition {
    Value(ValueDefinition),
    Container(ContainerDefinition),
}

/// A leaf rule: an expression yielding zero or more scalar values.
#[derive(Debug, Clone)]
pub struct ValueDefinition {
    name: String,
    expression: String,
    min_instances: usize,
    behaviour: Option<MultiValueBehaviour>,
    inline_format: Option<InlineFormat>,
}

impl ValueDefinition {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            min_instances: 1,
            behaviour: None,
            inline_format: None,
        }
    }

    pub fn with_min_instances(mut self, min_instances: usize) -> Self {
        self.min_instances = min_instances;
        self
    }

    /// Overrides the behaviour otherwise inherited from the enclosing
    /// container or the configuration default.
    pub fn with_behaviour(mut self, behaviour: MultiValueBehaviour) -> Self {
        self.behaviour = Some(behaviour);
        self
    }

    pub fn with_inline_format(mut self, format: InlineFormat) -> Self {
        self.inline_format = Some(format);
        self
    }
}

/// A rule selecting context nodes, each evaluated against the child rules.
#[derive(Debug, Clone)]
pub struct ContainerDefinition {
    name: String,
    expression: String,
    min_instances: usize,
    grouping: OutputGrouping,
    behaviour: Option<MultiValueBehaviour>,
    children: Vec<MappingDefinition>,
}

impl ContainerDefinition {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            min_instances: 1,
            grouping: OutputGrouping::default(),
            behaviour: None,
            children: Vec::new(),
        }
    }

    pub fn with_min_instances(mut self, min_instances: usize) -> Self {
        self.min_instances = min_instances;
        self
    }

    pub fn with_grouping(mut self, grouping: OutputGrouping) -> Self {
        self.grouping = grouping;
        self
    }

    /// Sets how this container's instances join an enclosing row when it is
    /// inline, and the behaviour inherited by child mappings that do not
    /// set their own.
    pub fn with_behaviour(mut self, behaviour: MultiValueBehaviour) -> Self {
        self.behaviour = Some(behaviour);
        self
    }

    pub fn with_value(mut self, value: ValueDefinition) -> Self {
        self.children.push(MappingDefinition::Value(value));
        self
    }

    pub fn with_container(mut self, container: ContainerDefinition) -> Self {
        self.children.push(MappingDefinition::Container(container));
        self
    }
}

/// A builder for a validated [`MappingConfiguration`].
#[derive(Debug, Clone, Default)]
pub struct MappingConfigurationBuilder {
    namespaces: NamespaceContext,
    default_behaviour: MultiValueBehaviour,
    default_inline_format: InlineFormat,
    containers: Vec<ContainerDefinition>,
}

impl MappingConfigurationBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Declares a prefix usable in every mapping expression.
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.bind(prefix, uri);
        self
    }

    /// Makes unprefixed element names in expressions match elements in
    /// `uri`.
    pub fn with_default_element_namespace(mut self, uri: impl Into<String>) -> Self {
        self.namespaces = self.namespaces.with_default_element_namespace(uri);
        self
    }

    /// The behaviour of value mappings that neither set one nor inherit
    /// one from a container.
    pub fn with_default_behaviour(mut self, behaviour: MultiValueBehaviour) -> Self {
        self.default_behaviour = behaviour;
        self
    }

    /// The column format used for value mappings with several instances
    /// and no format of their own.
    pub fn with_default_inline_format(mut self, format: InlineFormat) -> Self {
        self.default_inline_format = format;
        self
    }

    /// Adds a top-level container. Top-level containers are always
    /// independent output groups.
    pub fn with_container(mut self, container: ContainerDefinition) -> Self {
        self.containers.push(container);
        self
    }

    pub fn build(self) -> Result<MappingConfiguration, EngineError> {
        if self.containers.is_empty() {
            return Err(EngineError::Configuration(
                "at least one top-level container is required".to_string(),
            ));
        }
        let mut compiler = TreeCompiler {
            namespaces: &self.namespaces,
            default_behaviour: self.default_behaviour,
            default_inline_format: &self.default_inline_format,
            next_id: 0,
            group_names: HashSet::new(),
        };

        let mut containers = Vec::with_capacity(self.containers.len());
        for definition in &self.containers {
            if definition.grouping == OutputGrouping::Inline {
                return Err(EngineError::Configuration(format!(
                    "top-level container '{}' cannot be inline",
                    definition.name
                )));
            }
            containers.push(compiler.container(definition, None, false)?);
        }
        debug!(
            "Compiled mapping configuration with {} mappings and {} output groups",
            compiler.next_id,
            compiler.group_names.len()
        );

        Ok(MappingConfiguration {
            containers,
            namespaces: self.namespaces,
        })
    }
}

struct TreeCompiler<'b> {
    namespaces: &'b NamespaceContext,
    default_behaviour: MultiValueBehaviour,
    default_inline_format: &'b InlineFormat,
    next_id: u32,
    group_names: HashSet<String>,
}

impl TreeCompiler<'_> {
    fn allocate(&mut self, name: &str) -> Result<MappingId, EngineError> {
        if name.trim().is_empty() {
            return Err(EngineError::Configuration(
                "mapping names must not be empty".to_string(),
            ));
        }
        let id = MappingId(self.next_id);
        self.next_id += 1;
        Ok(id)
    }

    fn expression(&self, name: &str, source: &str) -> Result<CompiledExpression, EngineError> {
        compile(source, self.namespaces).map_err(|e| EngineError::Expression {
            mapping: name.to_string(),
            expression: source.to_string(),
            source: e,
        })
    }

    /// `inherited` is the nearest explicit behaviour of an enclosing
    /// container. `side_by_side` is set below a lazy inline container,
    /// whose instances need parent-qualified column names.
    fn container(
        &mut self,
        def: &ContainerDefinition,
        inherited: Option<MultiValueBehaviour>,
        side_by_side: bool,
    ) -> Result<ContainerMapping, EngineError> {
        let id = self.allocate(&def.name)?;
        if def.children.is_empty() {
            return Err(EngineError::Configuration(format!(
                "container '{}' has no child mappings",
                def.name
            )));
        }
        if def.grouping == OutputGrouping::Independent && !self.group_names.insert(def.name.clone())
        {
            return Err(EngineError::Configuration(format!(
                "duplicate output group name '{}'",
                def.name
            )));
        }
        let expression = self.expression(&def.name, &def.expression)?;
        let behaviour = def.behaviour.unwrap_or(MultiValueBehaviour::Greedy);
        let child_side_by_side = match def.grouping {
            OutputGrouping::Independent => false,
            OutputGrouping::Inline => side_by_side || behaviour == MultiValueBehaviour::Lazy,
        };
        let child_inherited = def.behaviour.or(inherited);

        let mut children = Vec::with_capacity(def.children.len());
        for child in &def.children {
            children.push(match child {
                MappingDefinition::Value(v) => {
                    Mapping::Value(self.value(v, child_inherited, child_side_by_side)?)
                }
                MappingDefinition::Container(c) => {
                    Mapping::Container(self.container(c, child_inherited, child_side_by_side)?)
                }
            });
        }

        Ok(ContainerMapping {
            id,
            name: def.name.clone(),
            expression,
            min_instances: def.min_instances,
            grouping: def.grouping,
            behaviour,
            children,
        })
    }

    fn value(
        &mut self,
        def: &ValueDefinition,
        inherited: Option<MultiValueBehaviour>,
        side_by_side: bool,
    ) -> Result<ValueMapping, EngineError> {
        let id = self.allocate(&def.name)?;
        let expression = self.expression(&def.name, &def.expression)?;
        let format = match &def.inline_format {
            Some(format) => ColumnFormat::fixed(format.clone()),
            None if side_by_side => ColumnFormat::fixed(InlineFormat::WithParentCount),
            None => ColumnFormat {
                single: InlineFormat::NoCounts,
                multiple: self.default_inline_format.clone(),
            },
        };
        Ok(ValueMapping {
            id,
            name: def.name.clone(),
            expression,
            min_instances: def.min_instances,
            behaviour: def.behaviour.or(inherited).unwrap_or(self.default_behaviour),
            format,
        })
    }
}
