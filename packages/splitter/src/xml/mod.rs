//! In-memory element tree for extracted matches and its XML serialization.
//!
//! The tree is fully owned and independent of the reader it came from, so
//! naming and writing can happen after the reader has moved on.

mod tree;
mod writer;

pub use tree::{Element, Node};
pub(crate) use tree::{declare_namespace, is_namespace_declaration};
