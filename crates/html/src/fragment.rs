//! Markup fragments.
//!
//! A deliberately small markup reader used for portal content and for building
//! host pages in tests. It understands elements, attributes (quoted, unquoted
//! and bare), text, comments, void elements and self-closing tags.
//!
//! Known limitations (intentional):
//! - No HTML5 error recovery: a stray or mismatched end tag is an error.
//! - No rawtext handling; `<script>`/`<style>` bodies are parsed as markup.
//! - Tag and attribute names are restricted to ASCII `[A-Za-z0-9:_-]`.

use crate::types::{Node, NodeKey};
use memchr::{memchr, memchr2};
use std::fmt;
use std::sync::Arc;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FragmentError {
    UnterminatedTag { position: usize },
    UnterminatedComment { position: usize },
    UnexpectedEndTag { name: String, position: usize },
    UnclosedElement { name: String },
}

impl fmt::Display for FragmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentError::UnterminatedTag { position } => {
                write!(f, "unterminated tag at byte {position}")
            }
            FragmentError::UnterminatedComment { position } => {
                write!(f, "unterminated comment at byte {position}")
            }
            FragmentError::UnexpectedEndTag { name, position } => {
                write!(f, "unexpected end tag </{name}> at byte {position}")
            }
            FragmentError::UnclosedElement { name } => {
                write!(f, "element <{name}> is never closed")
            }
        }
    }
}

impl std::error::Error for FragmentError {}

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_name_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

/// Parse a markup fragment into template nodes (all keys `NodeKey::INVALID`).
pub fn parse_fragment(input: &str) -> Result<Vec<Node>, FragmentError> {
    let bytes = input.as_bytes();
    let mut roots: Vec<Node> = Vec::new();
    // Open elements; the last entry is the current insertion parent.
    let mut open: Vec<Node> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            let end = memchr(b'<', &bytes[i..]).map_or(bytes.len(), |rel| i + rel);
            // '<' is ASCII, so `end` is always a char boundary.
            let text = decode_entities(&input[i..end]);
            if !text.is_empty() {
                insert(&mut open, &mut roots, Node::text(text));
            }
            i = end;
            continue;
        }

        if input[i..].starts_with(COMMENT_START) {
            let body_start = i + COMMENT_START.len();
            let Some(rel) = input[body_start..].find(COMMENT_END) else {
                return Err(FragmentError::UnterminatedComment { position: i });
            };
            let body = &input[body_start..body_start + rel];
            insert(&mut open, &mut roots, Node::comment(body));
            i = body_start + rel + COMMENT_END.len();
            continue;
        }

        if bytes.get(i + 1) == Some(&b'/') {
            let start = i + 2;
            let mut j = start;
            while j < bytes.len() && is_name_byte(bytes[j]) {
                j += 1;
            }
            let name = input[start..j].to_ascii_lowercase();
            let Some(rel) = memchr(b'>', &bytes[j..]) else {
                return Err(FragmentError::UnterminatedTag { position: i });
            };
            let matches_open = open.last().and_then(Node::name) == Some(name.as_str());
            if !matches_open {
                return Err(FragmentError::UnexpectedEndTag { name, position: i });
            }
            if let Some(done) = open.pop() {
                insert(&mut open, &mut roots, done);
            }
            i = j + rel + 1;
            continue;
        }

        let (element, self_closing, next) = read_start_tag(input, i)?;
        let void = element.name().is_some_and(is_void_element);
        if self_closing || void {
            insert(&mut open, &mut roots, element);
        } else {
            open.push(element);
        }
        i = next;
    }

    if let Some(unclosed) = open.last() {
        return Err(FragmentError::UnclosedElement {
            name: unclosed.name().unwrap_or_default().to_string(),
        });
    }
    log::trace!(target: "html.fragment", "parsed fragment with {} root(s)", roots.len());
    Ok(roots)
}

fn insert(open: &mut [Node], roots: &mut Vec<Node>, node: Node) {
    match open.last_mut().and_then(Node::children_mut) {
        Some(children) => children.push(node),
        None => roots.push(node),
    }
}

/// Read a start tag beginning at `at` (which points at `<`).
///
/// Returns the element, whether it was written self-closing and the index just
/// past the closing `>`.
fn read_start_tag(input: &str, at: usize) -> Result<(Node, bool, usize), FragmentError> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut k = at + 1;
    while k < len && is_name_byte(bytes[k]) {
        k += 1;
    }
    if k == at + 1 {
        return Err(FragmentError::UnterminatedTag { position: at });
    }
    let name = input[at + 1..k].to_ascii_lowercase();
    let mut attributes = Vec::new();
    let mut self_closing = false;

    loop {
        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        if k >= len {
            return Err(FragmentError::UnterminatedTag { position: at });
        }
        match bytes[k] {
            b'>' => {
                k += 1;
                break;
            }
            b'/' if bytes.get(k + 1) == Some(&b'>') => {
                self_closing = true;
                k += 2;
                break;
            }
            _ => {}
        }

        let name_start = k;
        while k < len && is_name_byte(bytes[k]) {
            k += 1;
        }
        if name_start == k {
            // Garbage inside a tag; skip one byte and keep scanning.
            k += 1;
            continue;
        }
        let attr_name: Arc<str> = Arc::from(input[name_start..k].to_ascii_lowercase());
        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        if k >= len || bytes[k] != b'=' {
            attributes.push((attr_name, None));
            continue;
        }
        k += 1;
        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        let value = if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
            let quote = bytes[k];
            let start = k + 1;
            let Some(rel) = memchr(quote, &bytes[start..]) else {
                return Err(FragmentError::UnterminatedTag { position: at });
            };
            k = start + rel + 1;
            decode_entities(&input[start..start + rel])
        } else {
            let start = k;
            while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                if bytes[k] == b'/' && bytes.get(k + 1) == Some(&b'>') {
                    break;
                }
                k += 1;
            }
            decode_entities(&input[start..k])
        };
        attributes.push((attr_name, Some(value)));
    }

    let element = Node::Element {
        key: NodeKey::INVALID,
        name: Arc::from(name),
        attributes,
        children: Vec::new(),
    };
    Ok((element, self_closing, k))
}

/// Decode the handful of entities content authors actually write.
///
/// Named: `&amp; &lt; &gt; &quot; &apos; &#39; &nbsp;`, plus well-formed decimal
/// and hex numeric references. Anything else passes through unchanged.
pub(crate) fn decode_entities(s: &str) -> String {
    let bytes = s.as_bytes();
    if memchr(b'&', bytes).is_none() {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut copied = 0;
    let mut i = 0;
    while let Some(rel) = memchr(b'&', &bytes[i..]) {
        let amp = i + rel;
        // An entity ends at ';'; a second '&' first means this one is malformed.
        let end = memchr2(b';', b'&', &bytes[amp + 1..])
            .map(|r| amp + 1 + r)
            .filter(|&e| bytes[e] == b';' && e - amp <= 10);
        let Some(end) = end else {
            i = amp + 1;
            continue;
        };
        if let Some(ch) = decode_one(&s[amp + 1..end]) {
            out.push_str(&s[copied..amp]);
            out.push(ch);
            copied = end + 1;
        }
        i = end + 1;
    }
    out.push_str(&s[copied..]);
    out
}

fn decode_one(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let value = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(value)
        }
    }
}
