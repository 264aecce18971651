use crate::Node;
use std::fmt::{self, Write};

/// Deterministic indented serialization of a node tree for test assertions.
/// Not a public stable format.
///
/// Rules:
/// - One line per node, two spaces of indent per depth.
/// - Attribute order is significant and preserved.
/// - Keys are omitted unless `include_keys` is set.
#[derive(Clone, Copy, Debug, Default)]
pub struct DomSnapshotOptions {
    pub include_keys: bool,
}

#[derive(Debug)]
pub struct DomSnapshot {
    lines: Vec<String>,
}

impl DomSnapshot {
    pub fn new(root: &Node, options: DomSnapshotOptions) -> Self {
        let mut lines = Vec::new();
        walk_snapshot(root, &options, 0, &mut lines);
        Self { lines }
    }

    /// Snapshot of a forest (e.g. a parsed fragment), each root at depth zero.
    pub fn of_nodes(nodes: &[Node], options: DomSnapshotOptions) -> Self {
        let mut lines = Vec::new();
        for node in nodes {
            walk_snapshot(node, &options, 0, &mut lines);
        }
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for DomSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i != 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

/// Panic with both renderings when `actual` does not snapshot to `expected`.
pub fn assert_snapshot(actual: &Node, expected: &str) {
    let rendered = DomSnapshot::new(actual, DomSnapshotOptions::default()).render();
    let expected = normalize_expected(expected);
    if rendered != expected {
        panic!("DOM snapshot mismatch\nexpected:\n{expected}\nactual:\n{rendered}");
    }
}

/// Strip the common leading indentation of an indoc-style expectation block.
fn normalize_expected(expected: &str) -> String {
    let lines: Vec<&str> = expected
        .lines()
        .skip_while(|l| l.trim().is_empty())
        .collect();
    let lines: Vec<&str> = match lines.iter().rposition(|l| !l.trim().is_empty()) {
        Some(last) => lines[..=last].to_vec(),
        None => Vec::new(),
    };
    let margin = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| l.get(margin..).unwrap_or("").trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

fn walk_snapshot(node: &Node, options: &DomSnapshotOptions, depth: usize, out: &mut Vec<String>) {
    const INDENT_STEP: usize = 2;
    let mut line = " ".repeat(depth.saturating_mul(INDENT_STEP));
    write_node_line(&mut line, node, options);
    out.push(line);
    for child in node.children() {
        walk_snapshot(child, options, depth + 1, out);
    }
}

fn write_node_line(out: &mut String, node: &Node, options: &DomSnapshotOptions) {
    match node {
        Node::Document { .. } => out.push_str("#document"),
        Node::Element {
            name, attributes, ..
        } => {
            out.push('<');
            out.push_str(name);
            for (attr, value) in attributes {
                out.push(' ');
                out.push_str(attr);
                if let Some(value) = value {
                    out.push_str("=\"");
                    write_escaped(out, value);
                    out.push('"');
                }
            }
            out.push('>');
        }
        Node::Text { text, .. } => {
            out.push('"');
            write_escaped(out, text);
            out.push('"');
        }
        Node::Comment { text, .. } => {
            out.push_str("<!-- ");
            write_escaped(out, text);
            out.push_str(" -->");
        }
    }
    if options.include_keys {
        let _ = write!(out, " @{}", node.key().0);
    }
}

fn write_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ if ch.is_ascii() => out.push(ch),
            _ => {
                let _ = write!(out, "\\u{{{:X}}}", ch as u32);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeKey;

    #[test]
    fn renders_indented_tree() {
        let node = Node::element("div")
            .with_attr("id", "target")
            .with_child(Node::element("span").with_child(Node::text("X\n")))
            .with_child(Node::comment("c"));
        assert_snapshot(
            &node,
            r#"
            <div id="target">
              <span>
                "X\n"
              <!-- c -->
            "#,
        );
    }

    #[test]
    fn keys_are_opt_in() {
        let mut node = Node::text("\u{a0}");
        node.set_key(NodeKey(7));
        let plain = DomSnapshot::new(&node, DomSnapshotOptions::default()).render();
        let keyed = DomSnapshot::new(&node, DomSnapshotOptions { include_keys: true }).render();
        assert_eq!(plain, "\"\\u{A0}\"");
        assert_eq!(keyed, "\"\\u{A0}\" @7");
    }
}
