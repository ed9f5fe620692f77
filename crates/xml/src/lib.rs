//! XML documents as a navigable tree for the XPath evaluator.
//!
//! `roxmltree` stores attributes as data on their element rather than as
//! nodes, so [`XmlNode`] wraps either a tree node or an (element, index)
//! pair. Comments and processing instructions are hidden from navigation.

use roxmltree::{Node, ParsingOptions};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use thiserror::Error;
use xmltab_xpath1::{DataSourceNode, NodeType, QName};

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML parse error: {0}")]
    Parse(#[from] roxmltree::Error),
}

/// A parsed document borrowing its source text.
pub struct XmlDocument<'input> {
    doc: roxmltree::Document<'input>,
}

impl<'input> XmlDocument<'input> {
    pub fn parse(text: &'input str) -> Result<Self, XmlError> {
        let mut options = ParsingOptions::default();
        options.allow_dtd = true;
        let doc = roxmltree::Document::parse_with_options(text, options)?;
        Ok(Self { doc })
    }

    pub fn root_node(&self) -> XmlNode<'_, 'input> {
        XmlNode::Node(self.doc.root())
    }
}

impl std::fmt::Debug for XmlDocument<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlDocument")
            .field("root_element", &self.doc.root_element().tag_name().name())
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum XmlNode<'a, 'input> {
    /// The root, an element or a text node.
    Node(Node<'a, 'input>),
    /// An attribute, identified by its owner element and position.
    Attribute { parent: Node<'a, 'input>, index: usize },
}

impl<'a, 'input> XmlNode<'a, 'input> {
    /// Document-order key: owner node id, then 0 for the node itself or
    /// 1 + attribute index.
    fn order_key(&self) -> (u32, usize) {
        match self {
            XmlNode::Node(node) => (node.id().get(), 0),
            XmlNode::Attribute { parent, index } => (parent.id().get(), index + 1),
        }
    }
}

impl PartialEq for XmlNode<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}

impl Eq for XmlNode<'_, '_> {}

impl PartialOrd for XmlNode<'_, '_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// roxmltree allocates node ids in document order, and a node's attributes
// come before its first child, so ordering by (owner id, slot) is correct
// whenever the attribute owner differs from the other node.
impl Ord for XmlNode<'_, '_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl Hash for XmlNode<'_, '_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.order_key().hash(state);
    }
}

fn is_navigable(node: &Node<'_, '_>) -> bool {
    node.is_element() || node.is_text()
}

impl<'a, 'input: 'a> DataSourceNode<'a> for XmlNode<'a, 'input> {
    fn node_type(&self) -> NodeType {
        match self {
            XmlNode::Node(node) if node.is_root() => NodeType::Root,
            XmlNode::Node(node) if node.is_element() => NodeType::Element,
            XmlNode::Node(_) => NodeType::Text,
            XmlNode::Attribute { .. } => NodeType::Attribute,
        }
    }

    fn name(&self) -> Option<QName<'a>> {
        match self {
            XmlNode::Node(node) if node.is_element() => {
                let tag = node.tag_name();
                Some(QName {
                    namespace: tag.namespace(),
                    local_part: tag.name(),
                })
            }
            XmlNode::Node(_) => None,
            XmlNode::Attribute { parent, index } => {
                parent.attributes().nth(*index).map(|attr| QName {
                    namespace: attr.namespace(),
                    local_part: attr.name(),
                })
            }
        }
    }

    fn prefix(&self) -> Option<&'a str> {
        let (scope, uri) = match self {
            XmlNode::Node(node) => (*node, node.tag_name().namespace()?),
            XmlNode::Attribute { parent, index } => {
                (*parent, parent.attributes().nth(*index)?.namespace()?)
            }
        };
        scope.lookup_prefix(uri).filter(|p| !p.is_empty())
    }

    fn string_value(&self) -> String {
        match self {
            XmlNode::Node(node) if node.is_text() => node.text().unwrap_or("").to_string(),
            XmlNode::Node(node) => node
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect(),
            XmlNode::Attribute { parent, index } => parent
                .attributes()
                .nth(*index)
                .map(|attr| attr.value().to_string())
                .unwrap_or_default(),
        }
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Node(node) if node.is_element() => {
                let parent = *node;
                Box::new((0..node.attributes().len()).map(move |index| XmlNode::Attribute { parent, index }))
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Node(node) => Box::new(node.children().filter(is_navigable).map(XmlNode::Node)),
            XmlNode::Attribute { .. } => Box::new(std::iter::empty()),
        }
    }

    fn parent(&self) -> Option<Self> {
        match self {
            XmlNode::Node(node) => node.parent().map(XmlNode::Node),
            XmlNode::Attribute { parent, .. } => Some(XmlNode::Node(*parent)),
        }
    }
}
