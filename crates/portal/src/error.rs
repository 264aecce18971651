use core_types::PortalId;
use css::SelectorError;
use dom::DomError;
use std::error::Error;
use std::fmt;

/// Failure raised while turning an anchor spec into an element.
///
/// These are caller mistakes (a malformed selector, a resolver function that
/// fails). They are never swallowed by the portal.
#[derive(Debug)]
pub enum AnchorError {
    Selector(SelectorError),
    Resolver(Box<dyn Error + 'static>),
}

impl AnchorError {
    /// Wraps an arbitrary message as a resolver failure.
    pub fn resolver(message: impl Into<String>) -> Self {
        AnchorError::Resolver(message.into().into())
    }
}

impl fmt::Display for AnchorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorError::Selector(err) => write!(f, "invalid anchor selector: {err}"),
            AnchorError::Resolver(err) => write!(f, "anchor resolver failed: {err}"),
        }
    }
}

impl Error for AnchorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AnchorError::Selector(err) => Some(err),
            AnchorError::Resolver(err) => Some(err.as_ref()),
        }
    }
}

impl From<SelectorError> for AnchorError {
    fn from(err: SelectorError) -> Self {
        AnchorError::Selector(err)
    }
}

#[derive(Debug)]
pub enum PortalError {
    Anchor(AnchorError),
    Dom(DomError),
    UnknownPortal(PortalId),
    /// Delivering mutation batches did not settle within the configured rounds.
    FlushLimit { rounds: usize },
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortalError::Anchor(err) => fmt::Display::fmt(err, f),
            PortalError::Dom(err) => write!(f, "document operation failed: {err}"),
            PortalError::UnknownPortal(id) => write!(f, "unknown {id}"),
            PortalError::FlushLimit { rounds } => {
                write!(f, "mutation delivery did not settle after {rounds} rounds")
            }
        }
    }
}

impl Error for PortalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PortalError::Anchor(err) => Some(err),
            PortalError::Dom(err) => Some(err),
            PortalError::UnknownPortal(_) | PortalError::FlushLimit { .. } => None,
        }
    }
}

impl From<AnchorError> for PortalError {
    fn from(err: AnchorError) -> Self {
        PortalError::Anchor(err)
    }
}

impl From<SelectorError> for PortalError {
    fn from(err: SelectorError) -> Self {
        PortalError::Anchor(AnchorError::Selector(err))
    }
}

impl From<DomError> for PortalError {
    fn from(err: DomError) -> Self {
        PortalError::Dom(err)
    }
}
