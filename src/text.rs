//! Helpers for walking a text shape's content tree, independent of the shape
//! tree itself.

use crate::model::TextNode;

/// True if any node in the tree matches `pred`.
pub fn some_node(pred: &mut impl FnMut(&TextNode) -> bool, content: &TextNode) -> bool {
    if pred(content) {
        return true;
    }
    content.children.iter().any(|child| some_node(pred, child))
}

/// Structural map over every node in the tree, rebuilding it bottom-up.
pub fn map_node(f: &mut impl FnMut(&TextNode) -> TextNode, content: &TextNode) -> TextNode {
    let mapped = f(content);
    TextNode {
        children: content
            .children
            .iter()
            .map(|child| map_node(f, child))
            .collect(),
        ..mapped
    }
}
