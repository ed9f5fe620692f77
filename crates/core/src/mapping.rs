//! The compiled mapping tree.
//!
//! A tree is built once per batch by [`MappingConfigurationBuilder`] and
//! never mutated afterwards; per-batch counters live in a separate
//! [`CardinalityTable`](crate::cardinality::CardinalityTable) keyed by
//! [`MappingId`].
//!
//! [`MappingConfigurationBuilder`]: crate::definition::MappingConfigurationBuilder

use crate::definition::MappingConfigurationBuilder;
use crate::naming::{ColumnFormat, ParentContext};
use serde::{Deserialize, Serialize};
use std::fmt;
use xmltab_xpath1::{CompiledExpression, NamespaceContext};

/// Stable identity of a mapping within one configuration. Ids are assigned
/// in tree pre-order starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingId(pub u32);

impl fmt::Display for MappingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a mapping with several instances is spread over the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiValueBehaviour {
    /// Instances become fixed side-by-side columns. (Default)
    #[default]
    Lazy,
    /// Each instance becomes its own row, cross-joined with the rest of
    /// the row.
    Greedy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputGrouping {
    /// Rows form a separate, named output group.
    #[default]
    Independent,
    /// Rows are joined into the enclosing container's row.
    Inline,
}

#[derive(Debug, Clone)]
pub struct ValueMapping {
    pub(crate) id: MappingId,
    pub(crate) name: String,
    pub(crate) expression: CompiledExpression,
    pub(crate) min_instances: usize,
    pub(crate) behaviour: MultiValueBehaviour,
    pub(crate) format: ColumnFormat,
}

impl ValueMapping {
    pub fn id(&self) -> MappingId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &CompiledExpression {
        &self.expression
    }

    pub fn min_instances(&self) -> usize {
        self.min_instances
    }

    pub fn behaviour(&self) -> MultiValueBehaviour {
        self.behaviour
    }

    pub fn format(&self) -> &ColumnFormat {
        &self.format
    }

    /// Column names for `count` instances of this mapping.
    pub fn column_names(&self, count: usize, parent: Option<ParentContext<'_>>) -> Vec<String> {
        self.format.column_names(&self.name, count, parent)
    }
}

#[derive(Debug, Clone)]
pub struct ContainerMapping {
    pub(crate) id: MappingId,
    pub(crate) name: String,
    pub(crate) expression: CompiledExpression,
    pub(crate) min_instances: usize,
    pub(crate) grouping: OutputGrouping,
    pub(crate) behaviour: MultiValueBehaviour,
    pub(crate) children: Vec<Mapping>,
}

impl ContainerMapping {
    pub fn id(&self) -> MappingId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &CompiledExpression {
        &self.expression
    }

    pub fn min_instances(&self) -> usize {
        self.min_instances
    }

    pub fn grouping(&self) -> OutputGrouping {
        self.grouping
    }

    /// Only meaningful for inline containers: whether their instances are
    /// laid out side by side (`Lazy`) or cross-joined (`Greedy`).
    pub fn behaviour(&self) -> MultiValueBehaviour {
        self.behaviour
    }

    pub fn children(&self) -> &[Mapping] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub enum Mapping {
    Value(ValueMapping),
    Container(ContainerMapping),
}

impl Mapping {
    pub fn id(&self) -> MappingId {
        match self {
            Mapping::Value(v) => v.id,
            Mapping::Container(c) => c.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Mapping::Value(v) => &v.name,
            Mapping::Container(c) => &c.name,
        }
    }

    pub fn expression(&self) -> &CompiledExpression {
        match self {
            Mapping::Value(v) => &v.expression,
            Mapping::Container(c) => &c.expression,
        }
    }

    pub fn min_instances(&self) -> usize {
        match self {
            Mapping::Value(v) => v.min_instances,
            Mapping::Container(c) => c.min_instances,
        }
    }
}

/// A validated, compiled mapping tree: an ordered list of top-level
/// containers, each of which is an output group.
#[derive(Debug, Clone)]
pub struct MappingConfiguration {
    pub(crate) containers: Vec<ContainerMapping>,
    pub(crate) namespaces: NamespaceContext,
}

impl MappingConfiguration {
    pub fn builder() -> MappingConfigurationBuilder {
        MappingConfigurationBuilder::new()
    }

    pub fn containers(&self) -> &[ContainerMapping] {
        &self.containers
    }

    pub fn namespaces(&self) -> &NamespaceContext {
        &self.namespaces
    }

    /// Every container whose rows form a named output group, in tree
    /// pre-order: the top-level containers and any nested independent ones.
    pub fn output_groups(&self) -> Vec<&ContainerMapping> {
        fn walk<'c>(container: &'c ContainerMapping, out: &mut Vec<&'c ContainerMapping>) {
            for child in &container.children {
                if let Mapping::Container(nested) = child {
                    if nested.grouping == OutputGrouping::Independent {
                        out.push(nested);
                    }
                    walk(nested, out);
                }
            }
        }

        let mut groups = Vec::new();
        for container in &self.containers {
            groups.push(container);
            walk(container, &mut groups);
        }
        groups
    }
}
