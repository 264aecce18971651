/// How much of an added node a selector-anchored watcher inspects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AddedNodeScan {
    /// The added node and all of its descendants.
    #[default]
    Subtree,
    /// Only the added node itself; a match nested inside a wrapper is missed
    /// until something else triggers a pass.
    NodeOnly,
}

/// When anchors that are not selectors get re-resolved after a mutation batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NonSelectorPolicy {
    /// Only when the current anchor (or its container) leaves the document.
    #[default]
    AnchorRemovalOnly,
    /// On every batch that is not entirely the instance's own writes.
    AnyExternalMutation,
}

#[derive(Clone, Debug)]
pub struct PortalConfig {
    pub added_node_scan: AddedNodeScan,
    pub non_selector_policy: NonSelectorPolicy,
    /// Element name of the synthetic container.
    pub container_tag: String,
    /// Attribute set on every container; its value is the owning portal id.
    pub container_marker: String,
    /// Upper bound on delivery rounds per `PortalRoot::flush`.
    pub max_flush_rounds: usize,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            added_node_scan: AddedNodeScan::default(),
            non_selector_policy: NonSelectorPolicy::default(),
            container_tag: "div".to_string(),
            container_marker: "data-portal-container".to_string(),
            max_flush_rounds: 16,
        }
    }
}

impl PortalConfig {
    pub fn with_added_node_scan(mut self, scan: AddedNodeScan) -> Self {
        self.added_node_scan = scan;
        self
    }

    pub fn with_non_selector_policy(mut self, policy: NonSelectorPolicy) -> Self {
        self.non_selector_policy = policy;
        self
    }
}
