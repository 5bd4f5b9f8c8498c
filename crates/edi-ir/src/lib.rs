#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # edi-ir
//!
//! Message tree structures for outgoing EDI messages.
//!
//! A mapping step builds a tree of [`Node`]s: every node holds a flat record
//! of field identifiers to raw string values, including the reserved
//! [`BOTSID`] key naming the grammar record it belongs to, plus an ordered
//! list of child nodes. Serializers only ever read this tree.

/// Core tree node model used for outgoing message representation.
pub mod node;
/// Cursor-based lookups for navigating message trees by record tag.
pub mod traversal;

/// Node primitives and the reserved record tag key.
pub use node::{BOTSID, Node, Record};
/// Traversal entry point for tag-path lookups.
pub use traversal::Cursor;

