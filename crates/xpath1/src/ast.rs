//! Abstract syntax tree for the supported XPath 1.0 subset.

/// The top-level expression that can be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(String),
    Number(f64),
    LocationPath(LocationPath),
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Negate(Box<Expression>),
}

impl Expression {
    pub fn is_location_path(&self) -> bool {
        matches!(self, Expression::LocationPath(_))
    }

    /// Visits every name test in the expression, including those nested in
    /// predicates and function arguments.
    pub fn for_each_name_test_mut(&mut self, f: &mut impl FnMut(&mut NameTest, Axis)) {
        match self {
            Expression::Literal(_) | Expression::Number(_) => {}
            Expression::LocationPath(path) => {
                if let Some(start) = path.start_point.as_mut() {
                    start.for_each_name_test_mut(f);
                }
                for step in &mut path.steps {
                    match &mut step.node_test {
                        NodeTest::Name(test) => f(test, step.axis),
                        NodeTest::NamespaceWildcard(test) => f(test, step.axis),
                        NodeTest::Wildcard | NodeTest::NodeType(_) => {}
                    }
                    for predicate in &mut step.predicates {
                        predicate.for_each_name_test_mut(f);
                    }
                }
            }
            Expression::FunctionCall { args, .. } => {
                for arg in args {
                    arg.for_each_name_test_mut(f);
                }
            }
            Expression::BinaryOp { left, right, .. } => {
                left.for_each_name_test_mut(f);
                right.for_each_name_test_mut(f);
            }
            Expression::Negate(inner) => inner.for_each_name_test_mut(f),
        }
    }
}

/// A binary operator used in an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Logical
    Or,
    And,
    // Equality
    Equals,
    NotEquals,
    // Relational
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    // Additive
    Plus,
    Minus,
    // Multiplicative
    Multiply,
    Divide,
    Modulo,
    // Set
    Union,
}

/// A location path such as `/order/line[2]/@sku` or `(a | b)/c`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    /// Filter expression the path starts from, for paths like `(a | b)/c`.
    pub start_point: Option<Box<Expression>>,
    /// True if the path starts from the document root. Ignored when
    /// `start_point` is set.
    pub is_absolute: bool,
    pub steps: Vec<Step>,
}

/// A single step, like `child::item[@type = 'x']`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<Expression>,
}

impl Step {
    pub(crate) fn descendant_or_self() -> Self {
        Step {
            axis: Axis::DescendantOrSelf,
            node_test: NodeTest::NodeType(NodeTypeTest::Node),
            predicates: vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Attribute,
    Parent,
    Ancestor,
    AncestorOrSelf,
    SelfAxis,
    FollowingSibling,
    PrecedingSibling,
}

impl Axis {
    /// Reverse axes number their nodes in reverse document order when
    /// evaluating positional predicates.
    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            Axis::Parent | Axis::Ancestor | Axis::AncestorOrSelf | Axis::PrecedingSibling
        )
    }
}

/// A name test as written in the expression, plus the namespace URI its
/// prefix resolves to once compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTest {
    pub prefix: Option<String>,
    pub local: String,
    pub namespace: Option<String>,
}

impl NameTest {
    pub fn new(prefix: Option<&str>, local: &str) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
            namespace: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// A qualified name test (`item`, `inv:item`).
    Name(NameTest),
    /// Any name in one namespace (`inv:*`). `local` is unused.
    NamespaceWildcard(NameTest),
    /// `*`
    Wildcard,
    NodeType(NodeTypeTest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTypeTest {
    Text,
    Node,
}
