use crate::document::Document;
use css::{ElementView, SelectorError, SelectorList, parse_selector};
use html::NodeKey;

/// Borrowed element handle used for selector matching.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    doc: &'a Document,
    key: NodeKey,
}

impl<'a> ElementRef<'a> {
    pub fn new(doc: &'a Document, key: NodeKey) -> Option<Self> {
        doc.is_element(key).then_some(Self { doc, key })
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }
}

impl ElementView for ElementRef<'_> {
    fn local_name(&self) -> &str {
        self.doc.local_name(self.key).unwrap_or_default()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.doc.attribute(self.key, name)
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.doc.parent(self.key)?;
        ElementRef::new(self.doc, parent)
    }
}

impl Document {
    /// First connected element in tree order matching `selector`.
    ///
    /// Invalid selector text is reported, never treated as "no match".
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeKey>, SelectorError> {
        let list = parse_selector(selector)?;
        Ok(self.query_first(&list))
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeKey>, SelectorError> {
        let list = parse_selector(selector)?;
        Ok(self
            .descendants(self.root())
            .filter(|key| self.matches_list(*key, &list))
            .collect())
    }

    /// First connected element in tree order matching an already parsed list.
    pub fn query_first(&self, list: &SelectorList) -> Option<NodeKey> {
        self.descendants(self.root())
            .find(|key| self.matches_list(*key, list))
    }

    /// First element inside `root` (inclusive) matching `list`, connected or not.
    pub fn query_first_within(&self, root: NodeKey, list: &SelectorList) -> Option<NodeKey> {
        self.descendants(root)
            .find(|key| self.matches_list(*key, list))
    }

    pub fn matches(&self, key: NodeKey, selector: &str) -> Result<bool, SelectorError> {
        let list = parse_selector(selector)?;
        Ok(self.matches_list(key, &list))
    }

    /// Non-elements never match.
    pub fn matches_list(&self, key: NodeKey, list: &SelectorList) -> bool {
        ElementRef::new(self, key).is_some_and(|el| list.matches(el))
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeKey> {
        self.descendants(self.root())
            .find(|key| self.is_element(*key) && self.attribute(*key, "id") == Some(id))
    }
}
