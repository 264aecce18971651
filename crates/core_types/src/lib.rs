use std::fmt;

/// Registration handle for one mutation observer on a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u32);

/// Identity of one mounted portal instance inside a `PortalRoot`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortalId(pub u64);

/// Monotonic count of structural mutations applied to a document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MutationSeq(pub u64);

impl MutationSeq {
    pub const INITIAL: MutationSeq = MutationSeq(0);

    pub fn next(self) -> Self {
        MutationSeq(self.0.wrapping_add(1))
    }

    /// Number of mutations applied between `earlier` and `self`.
    pub fn since(self, earlier: MutationSeq) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}

impl fmt::Display for PortalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "portal#{}", self.0)
    }
}
