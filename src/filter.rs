//! Predicate-driven tree pruning.
//!
//! `filter_tree` walks a parsed query and removes any subtree the predicate
//! flags for removal, propagating emptiness upward: an `And`/`Or` that loses
//! every operand disappears too, and a `Not`/`Field` wrapping a removed
//! operand disappears along with it.

use crate::ast::Node;

/// Removes every node for which `predicate` returns `true`, along with any
/// ancestor that is left with nothing under it. Returns `None` if the whole
/// tree is removed.
///
/// Filtering is idempotent: running it again over the result with the same
/// predicate returns the same tree unchanged, since a node that survived
/// once contains no subtree the predicate would now flag (the predicate is
/// a pure function of node shape, not of traversal state).
pub fn filter_tree(node: &Node, predicate: &dyn Fn(&Node) -> bool) -> Option<Node> {
    if predicate(node) {
        return None;
    }

    match node {
        Node::Term { .. } | Node::Noop => Some(node.clone()),

        Node::Not(operand) => filter_tree(operand, predicate).map(|op| Node::Not(Box::new(op))),

        Node::Field { name, operand } => {
            filter_tree(operand, predicate).map(|op| Node::Field {
                name: name.clone(),
                operand: Box::new(op),
            })
        }

        Node::And(operands) => collect_boolean(operands, predicate, false),
        Node::Or(operands) => collect_boolean(operands, predicate, true),
    }
}

/// Filters `operands` and rebuilds the surrounding `And`/`Or`, collapsing a
/// single survivor down to the bare operand.
fn collect_boolean(operands: &[Node], predicate: &dyn Fn(&Node) -> bool, is_or: bool) -> Option<Node> {
    let mut survivors: Vec<Node> = operands
        .iter()
        .filter_map(|operand| filter_tree(operand, predicate))
        .collect();

    match survivors.len() {
        0 => None,
        1 => survivors.pop(),
        _ => Some(if is_or { Node::Or(survivors) } else { Node::And(survivors) }),
    }
}

/// True for `Noop` nodes and for `Field` nodes whose field is anything
/// other than `sentence` — the predicate used to narrow a query down to
/// its plain-text, sentence-scoped content.
pub fn is_non_sentence_field_or_noop(node: &Node) -> bool {
    match node {
        Node::Noop => true,
        Node::Field { name, .. } => name != "sentence",
        _ => false,
    }
}

/// As [`is_non_sentence_field_or_noop`], but also discards `Not` nodes —
/// for callers that want positively-matched sentence text only, with no
/// negations surviving at all.
pub fn is_non_sentence_field_or_noop_or_not(node: &Node) -> bool {
    matches!(node, Node::Not(_)) || is_non_sentence_field_or_noop(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(s: &str) -> Node {
        Node::Term { text: s.into(), wildcard: false, phrase: false }
    }

    fn field(name: &str, operand: Node) -> Node {
        Node::Field { name: name.into(), operand: Box::new(operand) }
    }

    #[test]
    fn keeps_plain_terms() {
        let tree = term("foo");
        assert_eq!(
            filter_tree(&tree, &is_non_sentence_field_or_noop),
            Some(term("foo"))
        );
    }

    #[test]
    fn drops_noop() {
        assert_eq!(filter_tree(&Node::Noop, &is_non_sentence_field_or_noop), None);
    }

    #[test]
    fn drops_non_sentence_field() {
        let tree = field("title", term("foo"));
        assert_eq!(filter_tree(&tree, &is_non_sentence_field_or_noop), None);
    }

    #[test]
    fn keeps_sentence_field() {
        let tree = field("sentence", term("foo"));
        assert_eq!(
            filter_tree(&tree, &is_non_sentence_field_or_noop),
            Some(field("sentence", term("foo")))
        );
    }

    #[test]
    fn and_collapses_to_single_survivor() {
        let tree = Node::And(vec![field("title", term("foo")), term("bar")]);
        assert_eq!(
            filter_tree(&tree, &is_non_sentence_field_or_noop),
            Some(term("bar"))
        );
    }

    #[test]
    fn and_with_no_survivors_is_none() {
        let tree = Node::And(vec![Node::Noop, field("title", term("foo"))]);
        assert_eq!(filter_tree(&tree, &is_non_sentence_field_or_noop), None);
    }

    #[test]
    fn or_keeps_multiple_survivors() {
        let tree = Node::Or(vec![term("foo"), term("bar")]);
        assert_eq!(
            filter_tree(&tree, &is_non_sentence_field_or_noop),
            Some(Node::Or(vec![term("foo"), term("bar")]))
        );
    }

    #[test]
    fn not_propagates_removal() {
        let tree = Node::Not(Box::new(field("title", term("foo"))));
        assert_eq!(filter_tree(&tree, &is_non_sentence_field_or_noop), None);
    }

    #[test]
    fn not_predicate_drops_not_nodes() {
        let tree = Node::Not(Box::new(term("foo")));
        assert_eq!(filter_tree(&tree, &is_non_sentence_field_or_noop_or_not), None);
    }

    #[test]
    fn filtering_is_idempotent() {
        let tree = Node::And(vec![
            field("title", term("foo")),
            Node::Or(vec![term("bar"), Node::Noop]),
        ]);
        let once = filter_tree(&tree, &is_non_sentence_field_or_noop);
        let twice = once
            .as_ref()
            .and_then(|t| filter_tree(t, &is_non_sentence_field_or_noop));
        assert_eq!(once, twice);
    }
}
