//! Live in-memory document.
//!
//! Provides the pieces a page-injection component needs from a browser
//! document: a mutable node tree with stable keys, selector queries and
//! child-list mutation observers whose records are drained explicitly.

mod arena;
mod document;
mod error;
mod observer;
mod query;

pub use crate::document::{Descendants, Document};
pub use crate::error::DomError;
pub use crate::observer::{MutationRecord, ObserveOptions};
pub use crate::query::ElementRef;
