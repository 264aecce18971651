use core_types::ObserverId;
use html::NodeKey;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomError {
    InvalidKey(NodeKey),
    DuplicateKey(NodeKey),
    MissingKey(NodeKey),
    WrongNodeKind(NodeKey),
    InvalidParent(NodeKey),
    InvalidSibling { parent: NodeKey, before: NodeKey },
    CycleDetected { parent: NodeKey, child: NodeKey },
    UnknownObserver(ObserverId),
    /// A patch kind this document does not know how to apply.
    UnsupportedPatch,
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::InvalidKey(key) => write!(f, "node key {} was never allocated", key.0),
            DomError::DuplicateKey(key) => write!(f, "node key {} is already in use", key.0),
            DomError::MissingKey(key) => write!(f, "node {} does not exist", key.0),
            DomError::WrongNodeKind(key) => {
                write!(f, "node {} has the wrong kind for this operation", key.0)
            }
            DomError::InvalidParent(key) => write!(f, "node {} cannot have children", key.0),
            DomError::InvalidSibling { parent, before } => {
                write!(f, "node {} is not a child of node {}", before.0, parent.0)
            }
            DomError::CycleDetected { parent, child } => {
                let (child, parent) = (child.0, parent.0);
                write!(f, "inserting node {child} under node {parent} would create a cycle")
            }
            DomError::UnknownObserver(id) => write!(f, "{id} is not registered"),
            DomError::UnsupportedPatch => f.write_str("patch kind is not supported"),
        }
    }
}

impl std::error::Error for DomError {}
