//! Anchor specifications and their resolution to a concrete element.

use crate::error::AnchorError;
use crate::host::DomQuery;
use css::{SelectorList, parse_selector};
use html::NodeKey;
use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Caller-supplied resolver: inspects the document and picks an element.
pub type ResolverFn = Rc<dyn Fn(&dyn DomQuery) -> Result<Option<NodeKey>, AnchorError>>;

/// Shared, mutable slot holding an optional element key.
///
/// Used in both directions: callers hand the portal a weak view of a slot
/// they own (`AnchorSpec::External`), and the portal fills a caller-supplied
/// slot with its live container (`container_ref`).
#[derive(Clone, Default)]
pub struct ElementSlot(Rc<Cell<Option<NodeKey>>>);

impl ElementSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(key: NodeKey) -> Self {
        Self(Rc::new(Cell::new(Some(key))))
    }

    pub fn get(&self) -> Option<NodeKey> {
        self.0.get()
    }

    pub fn set(&self, key: Option<NodeKey>) {
        self.0.set(key);
    }

    /// Whether both handles share one slot.
    pub fn ptr_eq(&self, other: &ElementSlot) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakElement {
        WeakElement(Rc::downgrade(&self.0))
    }
}

impl fmt::Debug for ElementSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ElementSlot").field(&self.get()).finish()
    }
}

/// Non-owning view of an [`ElementSlot`]; empty once the owner drops it.
#[derive(Clone, Default)]
pub struct WeakElement(Weak<Cell<Option<NodeKey>>>);

impl WeakElement {
    pub fn get(&self) -> Option<NodeKey> {
        self.0.upgrade()?.get()
    }
}

impl fmt::Debug for WeakElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakElement").field(&self.get()).finish()
    }
}

/// Where the anchor comes from.
#[derive(Clone)]
pub enum AnchorSpec {
    Selector(String),
    Element(Option<NodeKey>),
    Resolver(ResolverFn),
    External(WeakElement),
}

impl AnchorSpec {
    pub fn selector(text: impl Into<String>) -> Self {
        AnchorSpec::Selector(text.into())
    }

    pub fn element(key: NodeKey) -> Self {
        AnchorSpec::Element(Some(key))
    }

    pub fn resolver<F>(f: F) -> Self
    where
        F: Fn(&dyn DomQuery) -> Result<Option<NodeKey>, AnchorError> + 'static,
    {
        AnchorSpec::Resolver(Rc::new(f))
    }

    pub fn external(slot: &ElementSlot) -> Self {
        AnchorSpec::External(slot.downgrade())
    }

    pub fn is_selector(&self) -> bool {
        matches!(self, AnchorSpec::Selector(_))
    }

    /// Parses the selector text of a `Selector` spec; `None` for other kinds.
    pub fn compile(&self) -> Result<Option<SelectorList>, AnchorError> {
        match self {
            AnchorSpec::Selector(text) => Ok(Some(parse_selector(text)?)),
            _ => Ok(None),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AnchorSpec::Selector(_) => "selector",
            AnchorSpec::Element(_) => "element",
            AnchorSpec::Resolver(_) => "resolver",
            AnchorSpec::External(_) => "external",
        }
    }
}

impl Default for AnchorSpec {
    fn default() -> Self {
        AnchorSpec::Element(None)
    }
}

impl fmt::Debug for AnchorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorSpec::Selector(text) => f.debug_tuple("Selector").field(text).finish(),
            AnchorSpec::Element(key) => f.debug_tuple("Element").field(key).finish(),
            AnchorSpec::Resolver(_) => f.write_str("Resolver(..)"),
            AnchorSpec::External(handle) => f.debug_tuple("External").field(handle).finish(),
        }
    }
}

impl From<&str> for AnchorSpec {
    fn from(text: &str) -> Self {
        AnchorSpec::selector(text)
    }
}

impl From<NodeKey> for AnchorSpec {
    fn from(key: NodeKey) -> Self {
        AnchorSpec::element(key)
    }
}

/// Resolves `spec` against the current document.
///
/// `compiled` is the pre-parsed form of a selector spec; when absent the text
/// is parsed here. Every call queries afresh.
pub fn resolve(
    spec: &AnchorSpec,
    compiled: Option<&SelectorList>,
    dom: &dyn DomQuery,
) -> Result<Option<NodeKey>, AnchorError> {
    let anchor = match spec {
        AnchorSpec::Selector(text) => match compiled {
            Some(list) => dom.query_first(list),
            None => dom.query_first(&parse_selector(text)?),
        },
        AnchorSpec::Element(key) => key.filter(|key| dom.exists(*key)),
        AnchorSpec::Resolver(f) => (**f)(dom)?.filter(|key| dom.exists(*key)),
        AnchorSpec::External(handle) => handle.get().filter(|key| dom.exists(*key)),
    };
    log::trace!(target: "portal.resolve", "{} anchor resolved to {:?}", spec.kind(), anchor);
    Ok(anchor)
}
