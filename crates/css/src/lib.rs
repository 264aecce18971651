pub mod matching;
pub mod syntax;

// Re-exports so other crates can just use `css::...` nicely.
pub use matching::ElementView;
pub use syntax::{
    AttrOp, Combinator, ComplexSelector, Compound, Selector, SelectorError, SelectorErrorKind,
    SelectorList, parse_selector,
};
