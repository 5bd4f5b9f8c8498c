//! Outgoing message driver
//!
//! Selects the dialect, resolves grammar and syntax, then writes the tree:
//! as one message when the root carries a record, as one message per root
//! child otherwise. Container dialects (TRADACOMS) iterate their
//! sub-messages on the tree and resolve a grammar per sub-message. The
//! output stream is opened once per call either way.

use crate::config::OutConfig;
use crate::dialect::{Container, Dialect};
use crate::json::JsonRenderer;
use crate::record::Flattener;
use crate::render::RecordRenderer;
use crate::sink::OutputSink;
use crate::{Error, Result};
use edi_ir::{Cursor, Node};
use edi_schema::{Grammar, GrammarSource, Syntax};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// What to write and how
#[derive(Debug, Clone, Default)]
pub struct WriteRequest {
    pub editype: String,
    pub messagetype: String,
    /// Partner whose syntax file, if any, overrules everything else
    pub topartner: Option<String>,
    /// Caller syntax, between grammar and partner syntax in precedence
    pub overrides: Syntax,
    pub destination: Option<PathBuf>,
}

impl WriteRequest {
    pub fn new(editype: impl Into<String>, messagetype: impl Into<String>) -> Self {
        Self {
            editype: editype.into(),
            messagetype: messagetype.into(),
            ..Self::default()
        }
    }

    pub fn with_partner(mut self, partner: impl Into<String>) -> Self {
        self.topartner = Some(partner.into());
        self
    }

    pub fn with_overrides(mut self, overrides: Syntax) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }
}

/// Everything one message is written with
#[derive(Debug, Clone)]
pub struct WriteContext {
    pub config: OutConfig,
    /// `None` only for dialects that write without a grammar
    pub grammar: Option<Arc<Grammar>>,
}

impl WriteContext {
    fn grammar(&self) -> Result<&Grammar> {
        self.grammar.as_deref().ok_or_else(|| {
            Error::SchemaResolution(format!(
                "no grammar resolved for editype \"{}\", messagetype \"{}\"",
                self.config.editype, self.config.messagetype
            ))
        })
    }
}

/// Outcome of a successful write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub messages: usize,
    pub records: usize,
}

/// Writer for one outgoing message tree
pub struct Outmessage<'a, S: GrammarSource + ?Sized> {
    source: &'a S,
    request: WriteRequest,
    dialect: Dialect,
}

impl<'a, S: GrammarSource + ?Sized> Outmessage<'a, S> {
    /// Fails with `UnknownDialect` when the editype has no profile
    pub fn new(source: &'a S, request: WriteRequest) -> Result<Self> {
        let dialect = Dialect::from_editype(&request.editype)?;
        Ok(Self {
            source,
            request,
            dialect,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn request(&self) -> &WriteRequest {
        &self.request
    }

    /// Resolve grammar, partner syntax and configuration for a message type
    pub fn context(&self, messagetype: &str) -> Result<WriteContext> {
        let editype = self.dialect.editype();
        let grammar = if self.dialect.needs_grammar() {
            Some(self.source.grammar(editype, messagetype)?)
        } else {
            None
        };

        let partner = match &self.request.topartner {
            Some(partner) => {
                debug!(editype, partner = %partner, "(Try) to read partner specific syntax");
                self.source.partner_syntax(editype, partner)?
            }
            None => None,
        };

        let config = OutConfig::resolve(
            self.dialect,
            messagetype,
            grammar.as_ref().map(|g| &g.syntax),
            Some(&self.request.overrides),
            partner.as_deref(),
        )
        .with_topartner(self.request.topartner.clone())
        .with_destination(self.request.destination.clone());

        Ok(WriteContext { config, grammar })
    }

    /// Write the tree to `out`
    pub fn write_all<W: Write>(&self, tree: &Node, out: W) -> Result<WriteSummary> {
        let destination = self
            .request
            .destination
            .as_ref()
            .map_or_else(|| "<stream>".to_string(), |p| p.display().to_string());
        debug!(editype = %self.dialect, messagetype = %self.request.messagetype, destination = %destination, "Start writing");

        let summary = match self.dialect.container() {
            Some(container) => self.write_container(tree, out, container)?,
            None => self.write_messages(tree, out)?,
        };

        debug!(destination = %destination, "End writing");
        info!(
            editype = %self.dialect,
            messages = summary.messages,
            records = summary.records,
            "Messages written"
        );
        Ok(summary)
    }

    /// Write the tree to the request's destination file
    pub fn write_to_path(&self, tree: &Node) -> Result<WriteSummary> {
        let Some(path) = &self.request.destination else {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no output destination configured",
            )));
        };
        let file = File::create(path)?;
        self.write_all(tree, BufWriter::new(file))
    }

    fn write_messages<W: Write>(&self, tree: &Node, out: W) -> Result<WriteSummary> {
        let messages: Vec<&Node> = if tree.has_content() {
            vec![tree]
        } else if tree.children.is_empty() {
            return Err(Error::EmptyMessage);
        } else {
            tree.children.iter().collect()
        };

        let ctx = self.context(&self.request.messagetype)?;
        let mut sink = OutputSink::new(out, &ctx.config.charset)?;

        let summary = if self.dialect.renders_records() {
            let mut summary = WriteSummary::default();
            for message in &messages {
                summary.records += write_records(&ctx, message, &mut sink)?;
                summary.messages += 1;
            }
            summary
        } else {
            write_json(&ctx, tree, &messages, &mut sink)?
        };

        sink.flush()?;
        Ok(summary)
    }

    fn write_container<W: Write>(&self, tree: &Node, out: W, container: Container) -> Result<WriteSummary> {
        let no_message = || Error::NoOutgoingMessage {
            container: container.start_tag.to_string(),
        };
        if tree.children.is_empty() {
            return Err(no_message());
        }

        let messages = Cursor::new(tree).get_loop(&[container.start_tag, container.message_tag]);
        if messages.is_empty() {
            return Err(no_message());
        }

        // every sub-message names its own grammar
        let contexts = messages
            .iter()
            .map(|message| {
                let cursor = Cursor::new(message);
                let messagetype: String = container
                    .messagetype_fields
                    .iter()
                    .map(|field| cursor.get_value(&[container.message_tag], field).unwrap_or_default())
                    .collect();
                trace!(messagetype = %messagetype, "Sub-message found");
                self.context(&messagetype)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut sink = OutputSink::new(out, &contexts[0].config.charset)?;
        let mut summary = WriteSummary::default();
        for (message, ctx) in messages.iter().zip(&contexts) {
            summary.records += write_records(ctx, message, &mut sink)?;
            summary.messages += 1;
        }
        sink.flush()?;
        Ok(summary)
    }
}

fn write_records<W: Write>(ctx: &WriteContext, message: &Node, sink: &mut OutputSink<W>) -> Result<usize> {
    let grammar = ctx.grammar()?;
    let renderer = RecordRenderer::new(&ctx.config);
    let mut flattener = Flattener::new(&ctx.config);
    let mut text = String::new();

    flattener.flatten_with(message, &grammar.structure, &mut |record| {
        text.clear();
        renderer.render_into(&record, &mut text)?;
        sink.write_str(&text)
    })
}

fn write_json<W: Write>(
    ctx: &WriteContext,
    tree: &Node,
    messages: &[&Node],
    sink: &mut OutputSink<W>,
) -> Result<WriteSummary> {
    // checked JSON formats every field against the grammar first
    if let Some(grammar) = &ctx.grammar {
        let mut flattener = Flattener::new(&ctx.config);
        for message in messages {
            flattener.flatten_with(message, &grammar.structure, &mut |_| Ok(()))?;
        }
    }

    let renderer = JsonRenderer::new(ctx.config.indented);
    let text = if messages.len() == 1 && std::ptr::eq(messages[0], tree) {
        renderer.render(tree)?
    } else {
        renderer.render_all(messages)?
    };
    sink.write_str(&text)?;
    Ok(WriteSummary {
        messages: messages.len(),
        records: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use edi_schema::{FieldDef, FieldFormat, GrammarRegistry, Structure};

    fn registry() -> GrammarRegistry {
        let registry = GrammarRegistry::new();
        registry.register(
            Grammar::new(
                "edifact",
                "ORDERSD96AUN",
                Structure::new("UNH", vec![FieldDef::tag(3), FieldDef::new("0062", FieldFormat::Alphanumeric, 1, 14)])
                    .with_child(Structure::new("BGM", vec![FieldDef::tag(3), FieldDef::new("1004", FieldFormat::Alphanumeric, 0, 35)])),
            )
            .with_syntax(Syntax::new().add_crlf_after_record_sep("")),
        );
        registry
    }

    fn write(registry: &GrammarRegistry, request: WriteRequest, tree: &Node) -> Result<(WriteSummary, String)> {
        let mut out = Vec::new();
        let summary = Outmessage::new(registry, request)?.write_all(tree, &mut out)?;
        Ok((summary, String::from_utf8(out).unwrap()))
    }

    #[test]
    fn test_single_message() {
        let tree = Node::with_tag("UNH")
            .with_field("0062", "1")
            .with_child(Node::with_tag("BGM").with_field("1004", "PO1"));

        let (summary, text) = write(&registry(), WriteRequest::new("edifact", "ORDERSD96AUN"), &tree).unwrap();
        assert_eq!(text, "UNH+1'BGM+PO1'");
        assert_eq!(summary, WriteSummary { messages: 1, records: 2 });
    }

    #[test]
    fn test_message_per_root_child() {
        let tree = Node::new()
            .with_child(Node::with_tag("UNH").with_field("0062", "1"))
            .with_child(Node::with_tag("UNH").with_field("0062", "2"));

        let (summary, text) = write(&registry(), WriteRequest::new("edifact", "ORDERSD96AUN"), &tree).unwrap();
        assert_eq!(text, "UNH+1'UNH+2'");
        assert_eq!(summary.messages, 2);
    }

    #[test]
    fn test_empty_tree() {
        let result = write(&registry(), WriteRequest::new("edifact", "ORDERSD96AUN"), &Node::new());
        assert!(matches!(result, Err(Error::EmptyMessage)));
    }

    #[test]
    fn test_unknown_dialect_and_missing_grammar() {
        let registry = registry();
        assert!(matches!(
            Outmessage::new(&registry, WriteRequest::new("xml", "ORDERS")),
            Err(Error::UnknownDialect(_))
        ));

        let tree = Node::with_tag("UNH");
        let result = write(&registry, WriteRequest::new("edifact", "INVOICD96AUN"), &tree);
        assert!(matches!(result, Err(Error::SchemaResolution(_))));
    }

    #[test]
    fn test_partner_syntax_overrules_caller() {
        let registry = registry();
        registry.register_partner("edifact", "BUYER", Some(Syntax::new().record_sep("!")));
        let request = WriteRequest::new("edifact", "ORDERSD96AUN")
            .with_overrides(Syntax::new().record_sep("~"))
            .with_partner("BUYER");

        let ctx = Outmessage::new(&registry, request.clone()).unwrap().context("ORDERSD96AUN").unwrap();
        assert_eq!(ctx.config.record_sep, "!");
        assert_eq!(ctx.config.topartner.as_deref(), Some("BUYER"));

        let (_, text) = write(&registry, request, &Node::with_tag("UNH").with_field("0062", "7")).unwrap();
        assert_eq!(text, "UNH+7!");
    }

    #[test]
    fn test_checked_json_validates_fields() {
        let registry = GrammarRegistry::new();
        registry.register(Grammar::new(
            "json",
            "orders",
            Structure::new("ORDER", vec![FieldDef::tag(5), FieldDef::new("ID", FieldFormat::Alphanumeric, 0, 3)])
                .with_child(Structure::new("LINE", vec![FieldDef::tag(4), FieldDef::new("DTM", FieldFormat::Date, 0, 8)])),
        ));

        let too_long = Node::with_tag("ORDER").with_field("ID", "PO-12345");
        let result = write(&registry, WriteRequest::new("json", "orders"), &too_long);
        assert!(matches!(
            result,
            Err(Error::FieldTooLong { ref path, ref field, .. }) if path == "ORDER" && field == "ID"
        ));

        let bad_date = Node::with_tag("ORDER")
            .with_field("ID", "PO1")
            .with_child(Node::with_tag("LINE").with_field("DTM", "20241340"));
        let result = write(&registry, WriteRequest::new("json", "orders"), &bad_date);
        assert!(matches!(result, Err(Error::InvalidDate { .. })));

        let (_, text) = write(&registry, WriteRequest::new("jsonnocheck", "orders"), &too_long).unwrap();
        assert_eq!(text, r#"{"ORDER":{"ID":"PO-12345"}}"#);

        let valid = Node::with_tag("ORDER").with_field("ID", "PO1");
        let (_, text) = write(&registry, WriteRequest::new("json", "orders"), &valid).unwrap();
        assert_eq!(text, r#"{"ORDER":{"ID":"PO1"}}"#);
    }

    #[test]
    fn test_jsonnocheck_needs_no_grammar() {
        let registry = GrammarRegistry::new();
        let tree = Node::with_tag("ORDER").with_field("ID", "1");

        let (summary, text) = write(&registry, WriteRequest::new("jsonnocheck", "orders"), &tree).unwrap();
        assert_eq!(text, r#"{"ORDER":{"ID":"1"}}"#);
        assert_eq!(summary.messages, 1);
    }
}
