//! The extraction engine: evaluates a mapping tree against one document.

use crate::cardinality::CardinalityTable;
use crate::error::EngineError;
use crate::mapping::{ContainerMapping, Mapping, MappingConfiguration, MappingId, ValueMapping};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use xmltab_xpath1::{CompiledExpression, DataSourceNode, XPathError};

/// The outcome of evaluating one mapping against one context node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtractionResult {
    /// `values` is padded with empty strings up to the running maximum seen
    /// before this evaluation; `found` counts the values actually present.
    Value {
        mapping: MappingId,
        values: Vec<String>,
        found: usize,
    },
    /// One entry per matched node in document order, each holding one
    /// result per child mapping in declaration order.
    Container {
        mapping: MappingId,
        instances: Vec<Vec<ExtractionResult>>,
    },
}

impl ExtractionResult {
    pub fn mapping(&self) -> MappingId {
        match self {
            ExtractionResult::Value { mapping, .. } | ExtractionResult::Container { mapping, .. } => {
                *mapping
            }
        }
    }
}

/// Everything extracted from one document: one result per top-level
/// container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentExtraction {
    pub document: String,
    pub results: Vec<ExtractionResult>,
}

fn expression_error(name: &str, expression: &CompiledExpression, source: XPathError) -> EngineError {
    EngineError::Expression {
        mapping: name.to_string(),
        expression: expression.source().to_string(),
        source,
    }
}

impl ValueMapping {
    /// Evaluates against `context`, recording the number of values found.
    /// An absent context yields no values.
    pub fn evaluate<'a, N>(
        &self,
        context: Option<N>,
        trim_whitespace: bool,
        table: &mut CardinalityTable,
    ) -> Result<ExtractionResult, EngineError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        let Some(node) = context else {
            return Ok(ExtractionResult::Value {
                mapping: self.id,
                values: Vec::new(),
                found: 0,
            });
        };

        let items = self
            .expression
            .select(node)
            .map_err(|e| expression_error(&self.name, &self.expression, e))?;
        let mut values: Vec<String> = items
            .iter()
            .map(|item| {
                let value = item.string_value();
                if trim_whitespace {
                    trim_xml_whitespace(&value).to_string()
                } else {
                    value
                }
            })
            .collect();

        let found = values.len();
        let previous = table.record(self.id, found)?;
        if previous > found {
            trace!("Padding '{}' from {} to {} values", self.name, found, previous);
            values.resize(previous, String::new());
        }
        debug!("Mapping '{}' found {} value(s)", self.name, found);

        Ok(ExtractionResult::Value {
            mapping: self.id,
            values,
            found,
        })
    }
}

impl ContainerMapping {
    /// Selects this container's nodes under `context` and evaluates every
    /// child mapping against each of them. Zero matches give a container
    /// result with no instances.
    pub fn evaluate<'a, N>(
        &self,
        context: Option<N>,
        trim_whitespace: bool,
        table: &mut CardinalityTable,
    ) -> Result<ExtractionResult, EngineError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        let nodes = match context {
            Some(node) => self.select_nodes(node)?,
            None => Vec::new(),
        };
        table.record(self.id, nodes.len())?;
        debug!("Container '{}' matched {} node(s)", self.name, nodes.len());

        let mut instances = Vec::with_capacity(nodes.len());
        for node in nodes {
            let mut results = Vec::with_capacity(self.children.len());
            for child in &self.children {
                results.push(child.evaluate(Some(node), trim_whitespace, table)?);
            }
            instances.push(results);
        }

        Ok(ExtractionResult::Container {
            mapping: self.id,
            instances,
        })
    }

    fn select_nodes<'a, N>(&self, context: N) -> Result<Vec<N>, EngineError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        let items = self
            .expression
            .select(context)
            .map_err(|e| expression_error(&self.name, &self.expression, e))?;
        items
            .iter()
            .map(|item| {
                item.as_node().ok_or_else(|| {
                    expression_error(
                        &self.name,
                        &self.expression,
                        XPathError::TypeError(format!(
                            "container expression must select nodes, got '{}'",
                            item.string_value()
                        )),
                    )
                })
            })
            .collect()
    }
}

impl Mapping {
    pub fn evaluate<'a, N>(
        &self,
        context: Option<N>,
        trim_whitespace: bool,
        table: &mut CardinalityTable,
    ) -> Result<ExtractionResult, EngineError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        match self {
            Mapping::Value(v) => v.evaluate(context, trim_whitespace, table),
            Mapping::Container(c) => c.evaluate(context, trim_whitespace, table),
        }
    }
}

/// Runs every top-level container of a configuration against a document
/// root.
#[derive(Debug, Clone, Copy)]
pub struct Extractor<'c> {
    config: &'c MappingConfiguration,
    trim_whitespace: bool,
}

impl<'c> Extractor<'c> {
    pub fn new(config: &'c MappingConfiguration, trim_whitespace: bool) -> Self {
        Self {
            config,
            trim_whitespace,
        }
    }

    pub fn extract<'a, N>(
        &self,
        document: &str,
        root: N,
        table: &mut CardinalityTable,
    ) -> Result<DocumentExtraction, EngineError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        let mut results = Vec::with_capacity(self.config.containers.len());
        for container in &self.config.containers {
            results.push(container.evaluate(Some(root), self.trim_whitespace, table)?);
        }
        Ok(DocumentExtraction {
            document: document.to_string(),
            results,
        })
    }
}

/// Strips the four XML whitespace characters from both ends. Other Unicode
/// spaces such as U+00A0 are content.
fn trim_xml_whitespace(value: &str) -> &str {
    value.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ContainerDefinition, ValueDefinition};
    use xmltab_xml::XmlDocument;

    const TWO_MEMBERS: &str = r#"<family surname="Smith">
        <members><person><age>10</age></person><person><age>12</age></person></members>
    </family>"#;
    const THREE_MEMBERS: &str = r#"<family surname="Jones">
        <members><person><age>7</age></person><person><age>9</age></person><person><age>40</age></person></members>
    </family>"#;

    fn family_config() -> MappingConfiguration {
        MappingConfiguration::builder()
            .with_container(
                ContainerDefinition::new("Family", "/family")
                    .with_value(ValueDefinition::new("Name", "@surname"))
                    .with_container(
                        ContainerDefinition::new("Members", "members")
                            .with_value(ValueDefinition::new("Age", "person/age")),
                    ),
            )
            .build()
            .unwrap()
    }

    fn age_values(extraction: &DocumentExtraction) -> (Vec<String>, usize) {
        let ExtractionResult::Container { instances, .. } = &extraction.results[0] else {
            panic!("expected container")
        };
        let ExtractionResult::Container { instances: members, .. } = &instances[0][1] else {
            panic!("expected container")
        };
        match &members[0][0] {
            ExtractionResult::Value { values, found, .. } => (values.clone(), *found),
            other => panic!("expected value, got {:?}", other),
        }
    }

    #[test]
    fn test_values_are_padded_to_the_running_maximum() {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = family_config();
        let extractor = Extractor::new(&config, true);
        let mut table = CardinalityTable::new();

        let big = XmlDocument::parse(THREE_MEMBERS).unwrap();
        let small = XmlDocument::parse(TWO_MEMBERS).unwrap();
        let first = extractor.extract("big.xml", big.root_node(), &mut table).unwrap();
        let second = extractor.extract("small.xml", small.root_node(), &mut table).unwrap();

        assert_eq!(age_values(&first), (vec!["7".into(), "9".into(), "40".into()], 3));
        assert_eq!(age_values(&second), (vec!["10".into(), "12".into(), "".into()], 2));
        assert_eq!(table.max(MappingId(3)), 3);
        assert_eq!(second.document, "small.xml");
    }

    #[test]
    fn test_padding_only_reaches_values_seen_so_far() {
        let config = family_config();
        let extractor = Extractor::new(&config, true);
        let mut table = CardinalityTable::new();
        let small = XmlDocument::parse(TWO_MEMBERS).unwrap();
        let first = extractor.extract("small.xml", small.root_node(), &mut table).unwrap();
        assert_eq!(age_values(&first).0.len(), 2);
    }

    #[test]
    fn test_trimming_keeps_interior_whitespace() {
        let doc = XmlDocument::parse("<r><v>  a  b \n</v></r>").unwrap();
        let config = MappingConfiguration::builder()
            .with_container(ContainerDefinition::new("R", "/r").with_value(ValueDefinition::new("V", "v")))
            .build()
            .unwrap();
        let Mapping::Value(v) = &config.containers()[0].children()[0] else { panic!() };
        let r = doc.root_node().children().next();

        let mut table = CardinalityTable::new();
        let trimmed = v.evaluate(r, true, &mut table).unwrap();
        let raw = v.evaluate(r, false, &mut table).unwrap();
        assert!(matches!(trimmed, ExtractionResult::Value { ref values, .. } if values == &["a  b"]));
        assert!(matches!(raw, ExtractionResult::Value { ref values, .. } if values == &["  a  b \n"]));
    }

    #[test]
    fn test_trimming_keeps_non_breaking_spaces() {
        let doc = XmlDocument::parse("<r><v>\t\u{a0}12\u{a0} \r\n</v></r>").unwrap();
        let config = MappingConfiguration::builder()
            .with_container(ContainerDefinition::new("R", "/r").with_value(ValueDefinition::new("V", "v")))
            .build()
            .unwrap();
        let Mapping::Value(v) = &config.containers()[0].children()[0] else { panic!() };
        let r = doc.root_node().children().next();

        let mut table = CardinalityTable::new();
        let trimmed = v.evaluate(r, true, &mut table).unwrap();
        assert!(matches!(trimmed, ExtractionResult::Value { ref values, .. } if values == &["\u{a0}12\u{a0}"]));
    }

    #[test]
    fn test_absent_context_yields_nothing() {
        let config = family_config();
        let family = &config.containers()[0];
        let mut table = CardinalityTable::new();
        let result = family
            .evaluate::<xmltab_xml::XmlNode<'_, '_>>(None, true, &mut table)
            .unwrap();
        assert_eq!(
            result,
            ExtractionResult::Container {
                mapping: MappingId(0),
                instances: vec![]
            }
        );
    }

    #[test]
    fn test_zero_matches_give_an_empty_container() {
        let doc = XmlDocument::parse("<family surname='Solo'/>").unwrap();
        let config = family_config();
        let mut table = CardinalityTable::new();
        let extraction = Extractor::new(&config, true)
            .extract("solo.xml", doc.root_node(), &mut table)
            .unwrap();
        let ExtractionResult::Container { instances, .. } = &extraction.results[0] else { panic!() };
        assert!(matches!(&instances[0][1], ExtractionResult::Container { instances, .. } if instances.is_empty()));
        assert_eq!(table.max(MappingId(2)), 0);
    }

    #[test]
    fn test_container_selecting_atomic_values_is_an_error() {
        let doc = XmlDocument::parse("<r/>").unwrap();
        let config = MappingConfiguration::builder()
            .with_container(
                ContainerDefinition::new("Counts", "count(/r)").with_value(ValueDefinition::new("V", ".")),
            )
            .build()
            .unwrap();
        let mut table = CardinalityTable::new();
        let err = Extractor::new(&config, true)
            .extract("r.xml", doc.root_node(), &mut table)
            .unwrap_err();
        assert!(
            matches!(err, EngineError::Expression { ref mapping, ref expression, .. } if mapping == "Counts" && expression == "count(/r)")
        );
    }

    #[test]
    fn test_evaluation_errors_carry_mapping_and_expression() {
        let doc = XmlDocument::parse("<r/>").unwrap();
        let config = MappingConfiguration::builder()
            .with_container(
                ContainerDefinition::new("R", "/r").with_value(ValueDefinition::new("Bad", "frobnicate(.)")),
            )
            .build()
            .unwrap();
        let mut table = CardinalityTable::new();
        let err = Extractor::new(&config, true)
            .extract("r.xml", doc.root_node(), &mut table)
            .unwrap_err();
        assert!(err.to_string().contains("'Bad'"));
        assert!(err.to_string().contains("frobnicate(.)"));
    }

    #[test]
    fn test_results_serialize_with_type_tags() {
        let result = ExtractionResult::Container {
            mapping: MappingId(0),
            instances: vec![vec![ExtractionResult::Value {
                mapping: MappingId(1),
                values: vec!["x".into()],
                found: 1,
            }]],
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"type":"container","mapping":0,"instances":[[{"type":"value","mapping":1,"values":["x"],"found":1}]]}"#
        );
        assert_eq!(serde_json::from_str::<ExtractionResult>(&json).unwrap(), result);
    }
}
