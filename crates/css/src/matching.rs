use crate::syntax::{AttrOp, Combinator, ComplexSelector, Compound, Selector, SelectorList};

/// Read access to one element, as needed by selector matching.
///
/// Implemented by lightweight handles into a document (and by owned nodes in
/// tests); `parent_element` walks up through element ancestors only.
pub trait ElementView: Copy {
    fn local_name(&self) -> &str;
    fn attribute(&self, name: &str) -> Option<&str>;
    fn parent_element(&self) -> Option<Self>;
}

impl SelectorList {
    pub fn matches<E: ElementView>(&self, element: E) -> bool {
        self.0.iter().any(|complex| matches_complex(complex, element))
    }
}

pub fn matches_complex<E: ElementView>(selector: &ComplexSelector, element: E) -> bool {
    matches_compound(&selector.subject, element) && matches_ancestors(&selector.ancestors, element)
}

fn matches_ancestors<E: ElementView>(rest: &[(Combinator, Compound)], element: E) -> bool {
    let Some(((combinator, compound), tail)) = rest.split_first() else {
        return true;
    };
    match combinator {
        Combinator::Child => element
            .parent_element()
            .is_some_and(|p| matches_compound(compound, p) && matches_ancestors(tail, p)),
        Combinator::Descendant => {
            let mut current = element.parent_element();
            while let Some(ancestor) = current {
                if matches_compound(compound, ancestor) && matches_ancestors(tail, ancestor) {
                    return true;
                }
                current = ancestor.parent_element();
            }
            false
        }
    }
}

fn matches_compound<E: ElementView>(compound: &Compound, element: E) -> bool {
    compound.0.iter().all(|s| matches_selector(element, s))
}

// Check if an element matches a single simple selector
fn matches_selector<E: ElementView>(element: E, selector: &Selector) -> bool {
    match selector {
        Selector::Universal => true,
        Selector::Type(t) => element.local_name().eq_ignore_ascii_case(t),
        Selector::Id(want) => element.attribute("id").is_some_and(|v| v == want),
        Selector::Class(want) => element
            .attribute("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == want)),
        Selector::Attribute { name, matcher } => {
            let Some(value) = element.attribute(name) else {
                return false;
            };
            match matcher {
                None => true,
                Some((op, want)) => matches_attr_op(*op, value, want),
            }
        }
    }
}

fn matches_attr_op(op: AttrOp, value: &str, want: &str) -> bool {
    match op {
        AttrOp::Equals => value == want,
        AttrOp::Includes => value.split_ascii_whitespace().any(|v| v == want),
        // Empty operands never match for the substring family.
        AttrOp::Prefix => !want.is_empty() && value.starts_with(want),
        AttrOp::Suffix => !want.is_empty() && value.ends_with(want),
        AttrOp::Substring => !want.is_empty() && value.contains(want),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_selector;

    /// Tiny owned tree: (name, attributes, parent index).
    struct Tree(Vec<(&'static str, Vec<(&'static str, &'static str)>, Option<usize>)>);

    #[derive(Clone, Copy)]
    struct El<'a>(&'a Tree, usize);

    impl<'a> ElementView for El<'a> {
        fn local_name(&self) -> &str {
            self.0.0[self.1].0
        }
        fn attribute(&self, name: &str) -> Option<&str> {
            self.0.0[self.1]
                .1
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| *v)
        }
        fn parent_element(&self) -> Option<Self> {
            self.0.0[self.1].2.map(|p| El(self.0, p))
        }
    }

    fn tree() -> Tree {
        Tree(vec![
            ("body", vec![], None),
            ("main", vec![("id", "app")], Some(0)),
            ("ul", vec![("class", "list wide")], Some(1)),
            ("li", vec![("class", "item"), ("data-slot", "header-left")], Some(2)),
        ])
    }

    fn check(selector: &str, index: usize) -> bool {
        let tree = tree();
        parse_selector(selector).unwrap().matches(El(&tree, index))
    }

    #[test]
    fn simple_selectors() {
        assert!(check("LI", 3));
        assert!(check("*", 0));
        assert!(check("#app", 1));
        assert!(!check("#APP", 1));
        assert!(check(".wide", 2));
        assert!(!check(".lis", 2));
        assert!(check("li.item[data-slot]", 3));
    }

    #[test]
    fn attribute_operators() {
        assert!(check("[data-slot=header-left]", 3));
        assert!(check("[data-slot^=header]", 3));
        assert!(check("[data-slot$='-left']", 3));
        assert!(check("[data-slot*=der-l]", 3));
        assert!(!check("[data-slot^='']", 3));
        assert!(check("[class~=wide]", 2));
        assert!(!check("[class~=wid]", 2));
    }

    #[test]
    fn combinators_walk_ancestors() {
        assert!(check("#app li", 3));
        assert!(check("main > ul > li", 3));
        assert!(!check("main > li", 3));
        assert!(check("body ul > .item", 3));
        assert!(!check("section li", 3));
        assert!(check("section li, #app .item", 3));
    }
}
