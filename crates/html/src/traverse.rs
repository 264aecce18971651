use crate::{Node, NodeKey};

pub fn find_node_by_key(node: &Node, key: NodeKey) -> Option<&Node> {
    if node.key() == key {
        return Some(node);
    }
    node.children()
        .iter()
        .find_map(|c| find_node_by_key(c, key))
}

/// Concatenated text of all descendant text nodes, in tree order.
pub fn text_content(node: &Node) -> String {
    fn walk(node: &Node, out: &mut String) {
        match node {
            Node::Text { text, .. } => out.push_str(text),
            _ => {
                for c in node.children() {
                    walk(c, out);
                }
            }
        }
    }
    let mut out = String::new();
    walk(node, &mut out);
    out
}

/// Number of nodes in the tree, root included.
pub fn count_nodes(node: &Node) -> usize {
    1 + node.children().iter().map(count_nodes).sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_nested_keys_and_collects_text() {
        let mut inner = Node::text("b");
        inner.set_key(NodeKey(5));
        let tree = Node::element("p")
            .with_child(Node::text("a"))
            .with_child(Node::element("em").with_child(inner));
        assert_eq!(find_node_by_key(&tree, NodeKey(5)), Some(&{
            let mut n = Node::text("b");
            n.set_key(NodeKey(5));
            n
        }));
        assert_eq!(text_content(&tree), "ab");
        assert_eq!(count_nodes(&tree), 4);
    }
}
