//! The record flattener: turns extraction results into rows per output
//! group, and produces the matching header rows.
//!
//! Within a container instance, children are applied in declaration order
//! to a row set that starts as one empty row:
//!
//! - a lazy value appends its values as `effective_count` fixed columns;
//! - a greedy value cross-joins the row set with one single-column variant
//!   per value found (one blank variant when none were found);
//! - an inline greedy container cross-joins with the rows of all of its
//!   instances;
//! - an inline lazy container lays its instances out side by side,
//!   padded to its effective count;
//! - an independent container writes to its own output group and leaves
//!   the row set alone.
//!
//! Column layout depends only on the mapping tree and the cardinality
//! table, so headers and rows always agree in width.

use crate::cardinality::CardinalityTable;
use crate::error::EngineError;
use crate::extract::{DocumentExtraction, ExtractionResult};
use crate::mapping::{
    ContainerMapping, Mapping, MappingConfiguration, MappingId, MultiValueBehaviour, OutputGrouping,
    ValueMapping,
};
use crate::naming::ParentContext;
use itertools::Itertools;
use log::{debug, warn};
use std::collections::HashMap;

pub type Row = Vec<String>;

/// What an output-group container with no matches and a minimum instance
/// count of at least one contributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyContainerPolicy {
    /// One row of empty strings. (Default)
    #[default]
    BlankRow,
    /// Nothing.
    NoRow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRows {
    pub group: String,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupHeader {
    pub group: String,
    pub columns: Vec<String>,
}

/// One header per output group, in tree pre-order.
pub fn headers(config: &MappingConfiguration, table: &CardinalityTable) -> Vec<GroupHeader> {
    let layout = Layout { table };
    config
        .output_groups()
        .into_iter()
        .map(|container| GroupHeader {
            group: container.name.clone(),
            columns: layout.columns(container, None),
        })
        .collect()
}

/// Flattens one document's extraction into rows for every output group.
///
/// The result has one entry per output group in tree pre-order, including
/// groups that received no rows.
pub fn flatten_document(
    config: &MappingConfiguration,
    extraction: &DocumentExtraction,
    table: &CardinalityTable,
    policy: EmptyContainerPolicy,
) -> Result<Vec<GroupRows>, EngineError> {
    let groups = config.output_groups();
    let mut flattener = Flattener {
        layout: Layout { table },
        policy,
        document: &extraction.document,
        slots: groups.iter().enumerate().map(|(i, g)| (g.id, i)).collect(),
        out: groups
            .iter()
            .map(|g| GroupRows {
                group: g.name.clone(),
                rows: Vec::new(),
            })
            .collect(),
    };

    if extraction.results.len() != config.containers.len() {
        return Err(EngineError::mismatch(
            &extraction.document,
            format!(
                "expected {} top-level results, found {}",
                config.containers.len(),
                extraction.results.len()
            ),
        ));
    }
    for (container, result) in config.containers.iter().zip(&extraction.results) {
        flattener.emit_group(container, result)?;
    }
    Ok(flattener.out)
}

/// Column widths and names derived from the mapping tree and frozen counts.
struct Layout<'t> {
    table: &'t CardinalityTable,
}

impl Layout<'_> {
    fn value_count(&self, value: &ValueMapping) -> usize {
        self.table.effective_count(value.id, value.min_instances)
    }

    fn instance_count(&self, container: &ContainerMapping) -> usize {
        self.table.effective_count(container.id, container.min_instances)
    }

    fn width(&self, container: &ContainerMapping) -> usize {
        container
            .children
            .iter()
            .map(|child| match child {
                Mapping::Value(v) => match v.behaviour {
                    MultiValueBehaviour::Lazy => self.value_count(v),
                    MultiValueBehaviour::Greedy => 1,
                },
                Mapping::Container(c) => match (c.grouping, c.behaviour) {
                    (OutputGrouping::Independent, _) => 0,
                    (OutputGrouping::Inline, MultiValueBehaviour::Greedy) => self.width(c),
                    (OutputGrouping::Inline, MultiValueBehaviour::Lazy) => {
                        self.instance_count(c) * self.width(c)
                    }
                },
            })
            .sum()
    }

    fn columns(&self, container: &ContainerMapping, parent: Option<ParentContext<'_>>) -> Vec<String> {
        let mut columns = Vec::new();
        for child in &container.children {
            match child {
                Mapping::Value(v) => match v.behaviour {
                    MultiValueBehaviour::Lazy => {
                        columns.extend(v.column_names(self.value_count(v), parent))
                    }
                    MultiValueBehaviour::Greedy => columns.extend(v.column_names(1, parent)),
                },
                Mapping::Container(c) => match (c.grouping, c.behaviour) {
                    (OutputGrouping::Independent, _) => {}
                    (OutputGrouping::Inline, MultiValueBehaviour::Greedy) => {
                        columns.extend(self.columns(c, parent))
                    }
                    (OutputGrouping::Inline, MultiValueBehaviour::Lazy) => {
                        for index in 0..self.instance_count(c) {
                            columns.extend(self.columns(c, Some(ParentContext::new(&c.name, index))));
                        }
                    }
                },
            }
        }
        columns
    }

    fn blank(&self, container: &ContainerMapping) -> Row {
        vec![String::new(); self.width(container)]
    }
}

struct Flattener<'t> {
    layout: Layout<'t>,
    policy: EmptyContainerPolicy,
    document: &'t str,
    slots: HashMap<MappingId, usize>,
    out: Vec<GroupRows>,
}

impl Flattener<'_> {
    fn emit_group(
        &mut self,
        container: &ContainerMapping,
        result: &ExtractionResult,
    ) -> Result<(), EngineError> {
        let instances = instances_of(container, result)?;
        let slot = *self.slots.get(&container.id).ok_or_else(|| {
            EngineError::mismatch(&container.name, "container is not an output group")
        })?;

        if instances.is_empty() {
            if container.min_instances >= 1 {
                warn!(
                    "Output group '{}' has no match in document '{}'",
                    container.name, self.document
                );
                if self.policy == EmptyContainerPolicy::BlankRow {
                    let blank = self.layout.blank(container);
                    self.out[slot].rows.push(blank);
                }
            }
            return Ok(());
        }

        for instance in instances {
            let rows = self.instance_rows(container, instance, None)?;
            self.out[slot].rows.extend(rows);
        }
        debug!(
            "Flattened {} instance(s) of '{}' for document '{}'",
            instances.len(),
            container.name,
            self.document
        );
        Ok(())
    }

    fn instance_rows(
        &mut self,
        container: &ContainerMapping,
        instance: &[ExtractionResult],
        parent: Option<ParentContext<'_>>,
    ) -> Result<Vec<Row>, EngineError> {
        if instance.len() != container.children.len() {
            return Err(EngineError::mismatch(
                &container.name,
                format!(
                    "expected {} child results per instance, found {}",
                    container.children.len(),
                    instance.len()
                ),
            ));
        }

        let mut rows: Vec<Row> = vec![Vec::new()];
        for (child, result) in container.children.iter().zip(instance) {
            match child {
                Mapping::Value(v) => {
                    let (values, found) = values_of(v, result)?;
                    match v.behaviour {
                        MultiValueBehaviour::Lazy => {
                            let count = self.layout.value_count(v);
                            if values.len() > count {
                                return Err(EngineError::mismatch(
                                    &v.name,
                                    format!("{} values exceed {} columns", values.len(), count),
                                ));
                            }
                            for row in &mut rows {
                                row.extend(values.iter().cloned());
                                row.resize(row.len() + count - values.len(), String::new());
                            }
                        }
                        MultiValueBehaviour::Greedy => {
                            let variants: Vec<Row> = if found == 0 {
                                vec![vec![String::new()]]
                            } else {
                                values[..found].iter().map(|value| vec![value.clone()]).collect()
                            };
                            rows = cross_join(&rows, &variants);
                        }
                    }
                }
                Mapping::Container(c) => match (c.grouping, c.behaviour) {
                    (OutputGrouping::Independent, _) => self.emit_group(c, result)?,
                    (OutputGrouping::Inline, MultiValueBehaviour::Greedy) => {
                        let mut variants = Vec::new();
                        for nested in instances_of(c, result)? {
                            variants.extend(self.instance_rows(c, nested, parent)?);
                        }
                        if variants.is_empty() {
                            variants.push(self.layout.blank(c));
                        }
                        rows = cross_join(&rows, &variants);
                    }
                    (OutputGrouping::Inline, MultiValueBehaviour::Lazy) => {
                        let instances = instances_of(c, result)?;
                        let count = self.layout.instance_count(c);
                        if instances.len() > count {
                            return Err(EngineError::mismatch(
                                &c.name,
                                format!("{} instances exceed {} slots", instances.len(), count),
                            ));
                        }
                        for index in 0..count {
                            let slot_rows = match instances.get(index) {
                                Some(nested) => self.instance_rows(
                                    c,
                                    nested,
                                    Some(ParentContext::new(&c.name, index)),
                                )?,
                                None => vec![self.layout.blank(c)],
                            };
                            rows = cross_join(&rows, &slot_rows);
                        }
                    }
                },
            }
        }
        Ok(rows)
    }
}

fn instances_of<'r>(
    container: &ContainerMapping,
    result: &'r ExtractionResult,
) -> Result<&'r [Vec<ExtractionResult>], EngineError> {
    match result {
        ExtractionResult::Container { mapping, instances } if *mapping == container.id => {
            Ok(instances.as_slice())
        }
        other => Err(EngineError::mismatch(
            &container.name,
            format!("found a result for mapping {}", other.mapping()),
        )),
    }
}

fn values_of<'r>(
    value: &ValueMapping,
    result: &'r ExtractionResult,
) -> Result<(&'r [String], usize), EngineError> {
    match result {
        ExtractionResult::Value {
            mapping,
            values,
            found,
        } if *mapping == value.id && *found <= values.len() => Ok((values.as_slice(), *found)),
        other => Err(EngineError::mismatch(
            &value.name,
            format!("found an unusable result for mapping {}", other.mapping()),
        )),
    }
}

fn cross_join(rows: &[Row], variants: &[Row]) -> Vec<Row> {
    rows.iter()
        .cartesian_product(variants)
        .map(|(row, variant)| row.iter().chain(variant).cloned().collect())
        .collect()
}
