//! Pure functions collecting the nodes along each supported axis, in axis
//! order (reverse document order for reverse axes).

use crate::ast::Axis;
use crate::datasource::DataSourceNode;

pub fn collect<'a, N: DataSourceNode<'a>>(axis: Axis, node: N, results: &mut Vec<N>) {
    match axis {
        Axis::Child => results.extend(node.children()),
        Axis::Attribute => results.extend(node.attributes()),
        Axis::Descendant => collect_descendants(node, results),
        Axis::DescendantOrSelf => {
            results.push(node);
            collect_descendants(node, results);
        }
        Axis::Parent => results.extend(node.parent()),
        Axis::Ancestor => collect_ancestors(node, results),
        Axis::AncestorOrSelf => {
            results.push(node);
            collect_ancestors(node, results);
        }
        Axis::SelfAxis => results.push(node),
        Axis::FollowingSibling => collect_following_siblings(node, results),
        Axis::PrecedingSibling => collect_preceding_siblings(node, results),
    }
}

/// Depth-first, pre-order: the result is in document order.
fn collect_descendants<'a, N: DataSourceNode<'a>>(node: N, results: &mut Vec<N>) {
    let mut stack: Vec<N> = node.children().collect();
    stack.reverse();
    while let Some(current) = stack.pop() {
        results.push(current);
        let mut children: Vec<N> = current.children().collect();
        children.reverse();
        stack.extend(children);
    }
}

fn collect_ancestors<'a, N: DataSourceNode<'a>>(node: N, results: &mut Vec<N>) {
    let mut current = node.parent();
    while let Some(p) = current {
        results.push(p);
        current = p.parent();
    }
}

fn collect_following_siblings<'a, N: DataSourceNode<'a>>(node: N, results: &mut Vec<N>) {
    if let Some(parent) = node.parent() {
        results.extend(parent.children().skip_while(|s| *s != node).skip(1));
    }
}

fn collect_preceding_siblings<'a, N: DataSourceNode<'a>>(node: N, results: &mut Vec<N>) {
    if let Some(parent) = node.parent() {
        let mut siblings: Vec<N> = parent.children().take_while(|s| *s != node).collect();
        siblings.reverse();
        results.extend(siblings);
    }
}
