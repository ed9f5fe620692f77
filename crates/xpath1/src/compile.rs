//! Compiled expressions: a parsed AST whose prefixes have been resolved
//! against a namespace context, ready to be evaluated against any node.

use crate::ast::{Axis, Expression, NameTest};
use crate::datasource::DataSourceNode;
use crate::engine::{self, EvaluationContext, XPathValue, format_number};
use crate::error::XPathError;
use crate::parser::parse_expression;
use std::collections::BTreeMap;

/// The namespace the `xml` prefix is always bound to.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Prefix to namespace URI bindings used when compiling expressions.
///
/// A default element namespace makes unprefixed element names in
/// expressions match elements in that namespace, so documents with a
/// default `xmlns` can be queried without inventing a prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceContext {
    bindings: BTreeMap<String, String>,
    default_element_namespace: Option<String>,
}

impl NamespaceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.bind(prefix, uri);
        self
    }

    pub fn with_default_element_namespace(mut self, uri: impl Into<String>) -> Self {
        self.default_element_namespace = Some(uri.into());
        self
    }

    pub fn bind(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.bindings.insert(prefix.into(), uri.into());
    }

    /// Looks up `prefix`. `xml` resolves even when it was never bound.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        match self.bindings.get(prefix) {
            Some(uri) => Some(uri.as_str()),
            None if prefix == "xml" => Some(XML_NAMESPACE),
            None => None,
        }
    }

    pub fn default_element_namespace(&self) -> Option<&str> {
        self.default_element_namespace.as_deref()
    }
}

/// One member of an evaluation result.
#[derive(Debug, Clone, PartialEq)]
pub enum Item<N> {
    Node(N),
    Atomic(String),
}

impl<'a, N: DataSourceNode<'a>> Item<N> {
    pub fn string_value(&self) -> String {
        match self {
            Item::Node(node) => node.string_value(),
            Item::Atomic(value) => value.clone(),
        }
    }

    pub fn as_node(&self) -> Option<N> {
        match self {
            Item::Node(node) => Some(*node),
            Item::Atomic(_) => None,
        }
    }
}

/// An expression compiled once and evaluated against many context nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    source: String,
    expr: Expression,
}

impl CompiledExpression {
    /// The expression text as it was written.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expression {
        &self.expr
    }

    /// Evaluates against `context`, flattening the result into an item
    /// sequence: node-sets in document order, anything else as a single
    /// atomic item.
    pub fn select<'a, N>(&self, context: N) -> Result<Vec<Item<N>>, XPathError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        let value = engine::evaluate(&self.expr, &EvaluationContext::new(context))?;
        Ok(match value {
            XPathValue::NodeSet(nodes) => nodes.into_iter().map(Item::Node).collect(),
            XPathValue::Number(n) => vec![Item::Atomic(format_number(n))],
            other => vec![Item::Atomic(other.to_string())],
        })
    }
}

/// Parses `source` and resolves every prefixed name test against
/// `namespaces`.
pub fn compile(source: &str, namespaces: &NamespaceContext) -> Result<CompiledExpression, XPathError> {
    let mut expr = parse_expression(source)?;
    let mut unresolved = None;
    expr.for_each_name_test_mut(&mut |test: &mut NameTest, axis: Axis| {
        test.namespace = match test.prefix.as_deref() {
            Some(prefix) => match namespaces.resolve(prefix) {
                Some(uri) => Some(uri.to_string()),
                None => {
                    unresolved.get_or_insert_with(|| prefix.to_string());
                    None
                }
            },
            // Unprefixed attributes are never in a namespace.
            None if axis == Axis::Attribute => None,
            None => namespaces.default_element_namespace().map(str::to_string),
        };
    });
    if let Some(prefix) = unresolved {
        return Err(XPathError::UnknownPrefix(prefix));
    }
    Ok(CompiledExpression {
        source: source.to_string(),
        expr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::tests::{MockNode, MockTree, create_family_tree};

    #[test]
    fn test_select_returns_nodes_in_document_order() {
        let tree = create_family_tree();
        let expr = compile("family/person/age", &NamespaceContext::new()).unwrap();
        let items = expr.select(tree.root()).unwrap();
        let values: Vec<String> = items.iter().map(Item::string_value).collect();
        assert_eq!(values, ["41", "10", "12"]);
        assert!(items.iter().all(|i| i.as_node().is_some()));
    }

    #[test]
    fn test_select_atomic_results() {
        let tree = create_family_tree();
        let expr = compile("count(//person)", &NamespaceContext::new()).unwrap();
        assert_eq!(expr.select(tree.root()).unwrap(), vec![Item::<MockNode<'_>>::Atomic("3".into())]);
    }

    #[test]
    fn test_unknown_prefix_is_a_compile_error() {
        let err = compile("inv:order", &NamespaceContext::new()).unwrap_err();
        assert_eq!(err, XPathError::UnknownPrefix("inv".into()));
    }

    #[test]
    fn test_default_element_namespace_applies_to_elements_only() {
        let mut tree = MockTree::new();
        let order = tree.element_ns(0, Some("urn:inv"), "order");
        tree.attribute(order, "id", "o-1");

        let ns = NamespaceContext::new().with_default_element_namespace("urn:inv");
        let expr = compile("/order/@id", &ns).unwrap();
        let values: Vec<String> = expr
            .select(tree.root())
            .unwrap()
            .iter()
            .map(Item::string_value)
            .collect();
        assert_eq!(values, ["o-1"]);

        let without_default = compile("/order/@id", &NamespaceContext::new()).unwrap();
        assert!(without_default.select(tree.root()).unwrap().is_empty());
    }

    #[test]
    fn test_prefixed_name_resolves_to_uri() {
        let mut tree = MockTree::new();
        tree.element_ns(0, Some("urn:inv"), "order");
        let ns = NamespaceContext::new().with_prefix("i", "urn:inv");
        let expr = compile("/i:order", &ns).unwrap();
        assert_eq!(expr.select(tree.root()).unwrap().len(), 1);
        assert_eq!(expr.source(), "/i:order");
    }

    #[test]
    fn test_xml_prefix_is_always_bound() {
        let mut tree = MockTree::new();
        let para = tree.element(0, "para");
        tree.attribute_ns(para, Some(XML_NAMESPACE), "lang", "en");

        let expr = compile("/para/@xml:lang", &NamespaceContext::new()).unwrap();
        let values: Vec<String> = expr
            .select(tree.root())
            .unwrap()
            .iter()
            .map(Item::string_value)
            .collect();
        assert_eq!(values, ["en"]);
        assert_eq!(NamespaceContext::new().resolve("xml"), Some(XML_NAMESPACE));
    }
}
