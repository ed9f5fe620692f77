//! An XPath 1.0 subset: enough of the language to select nodes and values
//! out of XML documents for tabular extraction.
//!
//! The engine is written against the [`DataSourceNode`] trait, so any tree
//! implementing it can be queried.

pub mod ast;
pub mod axes;
pub mod compile;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod functions;
pub mod operators;
pub mod parser;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, Step};
pub use compile::{CompiledExpression, Item, NamespaceContext, XML_NAMESPACE, compile};
pub use datasource::{DataSourceNode, NodeType, QName};
pub use engine::{EvaluationContext, XPathValue, evaluate};

// Re-export test utilities for integration testing in downstream crates
pub use datasource::tests;
pub use error::XPathError;
pub use parser::parse_expression;
