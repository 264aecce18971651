//! Selector syntax.
//!
//! Supported grammar (a practical subset of Selectors Level 3):
//!
//! ```text
//! list     := complex ( ',' complex )*
//! complex  := compound ( combinator compound )*
//! combinator := whitespace | '>'
//! compound := ( type | '*' )? ( '#' ident | '.' ident | '[' attr ']' )*
//! attr     := ident ( op ( ident | string ) )?
//! op       := '=' | '~=' | '^=' | '$=' | '*='
//! ```
//!
//! Sibling combinators and pseudo-classes are rejected with a positioned error
//! instead of silently matching nothing.

use std::fmt;

/// A single simple selector inside a compound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Universal,
    Type(String),  // element/tag selector, stored lowercase
    Id(String),    // #id selector
    Class(String), // .class selector
    Attribute {
        name: String,
        matcher: Option<(AttrOp, String)>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrOp {
    Equals,     // [a=v]
    Includes,   // [a~=v]
    Prefix,     // [a^=v]
    Suffix,     // [a$=v]
    Substring,  // [a*=v]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// Simple selectors that must all hold for one element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Compound(pub Vec<Selector>);

/// A compound subject plus its ancestor chain, nearest ancestor first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexSelector {
    pub subject: Compound,
    pub ancestors: Vec<(Combinator, Compound)>,
}

/// Comma-separated selector group; matches when any member matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorErrorKind {
    Empty,
    ExpectedIdentifier,
    UnexpectedChar(char),
    UnterminatedAttribute,
    UnterminatedString,
    DanglingCombinator,
    UnsupportedCombinator(char),
    UnsupportedPseudo,
}

/// Selector parse failure with the byte offset where it was detected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorError {
    pub position: usize,
    pub kind: SelectorErrorKind,
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match &self.kind {
            SelectorErrorKind::Empty => "empty selector".to_string(),
            SelectorErrorKind::ExpectedIdentifier => "expected identifier".to_string(),
            SelectorErrorKind::UnexpectedChar(c) => format!("unexpected character {c:?}"),
            SelectorErrorKind::UnterminatedAttribute => {
                "unterminated attribute selector".to_string()
            }
            SelectorErrorKind::UnterminatedString => "unterminated string".to_string(),
            SelectorErrorKind::DanglingCombinator => "combinator without a selector".to_string(),
            SelectorErrorKind::UnsupportedCombinator(c) => format!("unsupported combinator {c:?}"),
            SelectorErrorKind::UnsupportedPseudo => "pseudo-classes are not supported".to_string(),
        };
        write!(f, "invalid selector at byte {}: {what}", self.position)
    }
}

impl std::error::Error for SelectorError {}

// input: "div#main > .item, [data-x]"
// output: SelectorList with two complex selectors
pub fn parse_selector(input: &str) -> Result<SelectorList, SelectorError> {
    let mut parser = Parser { input, pos: 0 };
    let mut list = Vec::new();
    loop {
        list.push(parser.complex()?);
        parser.skip_whitespace();
        match parser.peek() {
            None => break,
            Some(b',') => parser.pos += 1,
            Some(_) => return Err(parser.unexpected()),
        }
    }
    Ok(SelectorList(list))
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

fn is_ident_byte(b: u8) -> bool {
    // Non-ASCII bytes are accepted so identifiers may contain any Unicode text;
    // we only ever stop on ASCII bytes, which keeps slices on char boundaries.
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn error(&self, kind: SelectorErrorKind) -> SelectorError {
        SelectorError {
            position: self.pos,
            kind,
        }
    }

    fn unexpected(&self) -> SelectorError {
        let c = self.input[self.pos..].chars().next().unwrap_or('\0');
        self.error(SelectorErrorKind::UnexpectedChar(c))
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn ident(&mut self) -> Result<&'a str, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_byte) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error(SelectorErrorKind::ExpectedIdentifier));
        }
        Ok(&self.input[start..self.pos])
    }

    fn complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        self.skip_whitespace();
        let first = self.compound()?;
        let mut chain = vec![first];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(b',') => break,
                Some(b'>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(c @ (b'+' | b'~')) => {
                    return Err(self.error(SelectorErrorKind::UnsupportedCombinator(c as char)));
                }
                Some(_) if had_space => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            if matches!(self.peek(), None | Some(b',')) {
                return Err(self.error(SelectorErrorKind::DanglingCombinator));
            }
            combinators.push(combinator);
            chain.push(self.compound()?);
        }
        // Stored right-to-left so matching starts at the subject.
        let subject = chain.pop().unwrap_or_default();
        let ancestors = combinators.into_iter().rev().zip(chain.into_iter().rev()).collect();
        Ok(ComplexSelector { subject, ancestors })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let start = self.pos;
        let mut parts = Vec::new();
        match self.peek() {
            Some(b'*') => {
                self.pos += 1;
                parts.push(Selector::Universal);
            }
            Some(b) if is_ident_byte(b) => {
                parts.push(Selector::Type(self.ident()?.to_ascii_lowercase()));
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some(b'#') => {
                    self.pos += 1;
                    parts.push(Selector::Id(self.ident()?.to_string()));
                }
                Some(b'.') => {
                    self.pos += 1;
                    parts.push(Selector::Class(self.ident()?.to_string()));
                }
                Some(b'[') => {
                    self.pos += 1;
                    parts.push(self.attribute()?);
                }
                Some(b':') => return Err(self.error(SelectorErrorKind::UnsupportedPseudo)),
                _ => break,
            }
        }
        if parts.is_empty() {
            return Err(match self.peek() {
                None if self.input[..start].trim().is_empty() => {
                    self.error(SelectorErrorKind::Empty)
                }
                None | Some(b',') => self.error(SelectorErrorKind::DanglingCombinator),
                Some(_) => self.unexpected(),
            });
        }
        Ok(Compound(parts))
    }

    fn attribute(&mut self) -> Result<Selector, SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let op = match self.peek() {
            Some(b']') => {
                self.pos += 1;
                return Ok(Selector::Attribute { name, matcher: None });
            }
            Some(b'=') => {
                self.pos += 1;
                AttrOp::Equals
            }
            Some(prefix @ (b'~' | b'^' | b'$' | b'*')) => {
                if self.input.as_bytes().get(self.pos + 1) != Some(&b'=') {
                    return Err(self.unexpected());
                }
                self.pos += 2;
                match prefix {
                    b'~' => AttrOp::Includes,
                    b'^' => AttrOp::Prefix,
                    b'$' => AttrOp::Suffix,
                    _ => AttrOp::Substring,
                }
            }
            None => return Err(self.error(SelectorErrorKind::UnterminatedAttribute)),
            Some(_) => return Err(self.unexpected()),
        };
        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                let open = self.pos;
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|b| b != quote) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(SelectorError {
                        position: open,
                        kind: SelectorErrorKind::UnterminatedString,
                    });
                }
                let value = self.input[start..self.pos].to_string();
                self.pos += 1;
                value
            }
            _ => self.ident()?.to_string(),
        };
        self.skip_whitespace();
        if self.peek() != Some(b']') {
            return Err(self.error(SelectorErrorKind::UnterminatedAttribute));
        }
        self.pos += 1;
        Ok(Selector::Attribute {
            name,
            matcher: Some((op, value)),
        })
    }
}
