//! XML serialization.
//!
//! Turns a `Document` tree, or one of its subtrees, back into XML text.

pub mod xml;

pub use xml::{serialize, serialize_node, serialize_with_options, SerializeOptions};
