//! Defines the core abstraction for a navigable, read-only node tree.
use std::hash::Hash;

/// An expanded name: the namespace URI (not the prefix) plus the local part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName<'a> {
    pub namespace: Option<&'a str>,
    pub local_part: &'a str,
}

/// The type of a node, aligned with the XPath 1.0 data model. Comments and
/// processing instructions are not exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Text,
}

/// The contract the evaluator is written against.
///
/// `Ord` must follow document order: a node sorts before its attributes,
/// its attributes before its children, and children in sequence.
///
/// `'a` is the lifetime of the underlying document.
pub trait DataSourceNode<'a>:
    std::fmt::Debug + Clone + Copy + PartialEq + Eq + Hash + PartialOrd + Ord
{
    fn node_type(&self) -> NodeType;

    /// The expanded name of an element or attribute; `None` for other nodes.
    fn name(&self) -> Option<QName<'a>>;

    /// The prefix used for this node's name in the source document, if any.
    fn prefix(&self) -> Option<&'a str> {
        None
    }

    /// The XPath 1.0 string value: attribute/text content, or the
    /// concatenated descendant text of an element or the root.
    fn string_value(&self) -> String;

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// `None` only for the root.
    fn parent(&self) -> Option<Self>;

    /// Walks up to the root node of the tree this node belongs to.
    fn root(&self) -> Self {
        let mut current = *self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }
}

// Test utilities, public so downstream crates can exercise the evaluator
// without a real XML parser.
pub mod tests {
    use super::*;
    use std::cmp::Ordering;
    use std::hash::Hasher;

    #[derive(Debug, Clone)]
    struct MockNodeData {
        node_type: NodeType,
        namespace: Option<&'static str>,
        name: Option<&'static str>,
        value: String,
        parent: Option<usize>,
        children: Vec<usize>,
        attributes: Vec<usize>,
    }

    /// An arena of nodes. Ids are allocated in document order as long as the
    /// tree is built top-down, attributes before children.
    #[derive(Debug, Default)]
    pub struct MockTree {
        nodes: Vec<MockNodeData>,
    }

    #[derive(Debug, Clone, Copy)]
    pub struct MockNode<'a> {
        pub id: usize,
        pub tree: &'a MockTree,
    }

    impl MockTree {
        pub fn new() -> Self {
            let mut tree = Self::default();
            tree.push(NodeType::Root, None, None, String::new(), None);
            tree
        }

        pub fn root(&self) -> MockNode<'_> {
            MockNode { id: 0, tree: self }
        }

        fn push(
            &mut self,
            node_type: NodeType,
            namespace: Option<&'static str>,
            name: Option<&'static str>,
            value: String,
            parent: Option<usize>,
        ) -> usize {
            let id = self.nodes.len();
            self.nodes.push(MockNodeData {
                node_type,
                namespace,
                name,
                value,
                parent,
                children: vec![],
                attributes: vec![],
            });
            id
        }

        pub fn element(&mut self, parent: usize, name: &'static str) -> usize {
            self.element_ns(parent, None, name)
        }

        pub fn element_ns(
            &mut self,
            parent: usize,
            namespace: Option<&'static str>,
            name: &'static str,
        ) -> usize {
            let id = self.push(NodeType::Element, namespace, Some(name), String::new(), Some(parent));
            self.nodes[parent].children.push(id);
            id
        }

        pub fn attribute(&mut self, parent: usize, name: &'static str, value: &str) -> usize {
            self.attribute_ns(parent, None, name, value)
        }

        pub fn attribute_ns(
            &mut self,
            parent: usize,
            namespace: Option<&'static str>,
            name: &'static str,
            value: &str,
        ) -> usize {
            let id = self.push(NodeType::Attribute, namespace, Some(name), value.to_string(), Some(parent));
            self.nodes[parent].attributes.push(id);
            id
        }

        pub fn text(&mut self, parent: usize, value: &str) -> usize {
            let id = self.push(NodeType::Text, None, None, value.to_string(), Some(parent));
            self.nodes[parent].children.push(id);
            id
        }

        /// Adds `<name>value</name>` under `parent`.
        pub fn leaf(&mut self, parent: usize, name: &'static str, value: &str) -> usize {
            let id = self.element(parent, name);
            self.text(id, value);
            id
        }

        fn string_value_of(&self, id: usize) -> String {
            let data = &self.nodes[id];
            match data.node_type {
                NodeType::Attribute | NodeType::Text => data.value.clone(),
                NodeType::Root | NodeType::Element => data
                    .children
                    .iter()
                    .map(|&child| self.string_value_of(child))
                    .collect(),
            }
        }
    }

    impl PartialEq for MockNode<'_> {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }
    impl Eq for MockNode<'_> {}

    impl PartialOrd for MockNode<'_> {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for MockNode<'_> {
        fn cmp(&self, other: &Self) -> Ordering {
            self.id.cmp(&other.id)
        }
    }

    impl Hash for MockNode<'_> {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    impl<'a> DataSourceNode<'a> for MockNode<'a> {
        fn node_type(&self) -> NodeType {
            self.tree.nodes[self.id].node_type
        }

        fn name(&self) -> Option<QName<'a>> {
            let data = &self.tree.nodes[self.id];
            data.name.map(|local_part| QName {
                namespace: data.namespace,
                local_part,
            })
        }

        fn string_value(&self) -> String {
            self.tree.string_value_of(self.id)
        }

        fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(
                tree.nodes[self.id]
                    .attributes
                    .iter()
                    .map(move |&id| MockNode { id, tree }),
            )
        }

        fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(
                tree.nodes[self.id]
                    .children
                    .iter()
                    .map(move |&id| MockNode { id, tree }),
            )
        }

        fn parent(&self) -> Option<Self> {
            self.tree.nodes[self.id].parent.map(|id| MockNode {
                id,
                tree: self.tree,
            })
        }
    }

    /// A small family document:
    /// ```text
    /// <family surname="Smith">
    ///   <person role="parent"><name>Ann</name><age>41</age></person>
    ///   <person role="child"><name>Bob</name><age>10</age></person>
    ///   <person role="child"><name>Cat</name><age>12</age></person>
    /// </family>
    /// ```
    pub fn create_family_tree() -> MockTree {
        let mut tree = MockTree::new();
        let family = tree.element(0, "family");
        tree.attribute(family, "surname", "Smith");
        for (role, name, age) in [("parent", "Ann", "41"), ("child", "Bob", "10"), ("child", "Cat", "12")] {
            let person = tree.element(family, "person");
            tree.attribute(person, "role", role);
            tree.leaf(person, "name", name);
            tree.leaf(person, "age", age);
        }
        tree
    }
}
