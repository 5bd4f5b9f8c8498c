//! # edi-serializer
//!
//! Grammar-driven serialization of outgoing EDI message trees.
//!
//! The pipeline per message is: select the [`Dialect`] for the editype,
//! resolve the grammar and the layered syntax into an [`OutConfig`], flatten
//! the tree into records ([`Flattener`]), format every field
//! ([`FieldFormatter`]), render each record ([`RecordRenderer`]) and write it
//! through a charset-aware [`OutputSink`]. [`Outmessage`] drives all of it.
//!
//! ```no_run
//! use edi_ir::Node;
//! use edi_schema::GrammarLoader;
//! use edi_serializer::{Outmessage, WriteRequest};
//!
//! # fn main() -> edi_serializer::Result<()> {
//! let loader = GrammarLoader::new(vec!["grammars".into()]);
//! let tree = Node::with_tag("UNH").with_field("0062", "1");
//! let request = WriteRequest::new("edifact", "ORDERSD96AUN").with_destination("out.edi");
//! let summary = Outmessage::new(&loader, request)?.write_to_path(&tree)?;
//! println!("{} message(s) written", summary.messages);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dialect;
pub mod error;
pub mod format;
pub mod json;
pub mod outmessage;
pub mod record;
pub mod render;
pub mod sink;

pub use config::OutConfig;
pub use dialect::{CollisionPolicy, Container, Dialect};
pub use error::{Error, Result};
pub use format::FieldFormatter;
pub use json::JsonRenderer;
pub use outmessage::{Outmessage, WriteContext, WriteRequest, WriteSummary};
pub use record::{Field, Flattener, Record};
pub use render::RecordRenderer;
pub use sink::OutputSink;
