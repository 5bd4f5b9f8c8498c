//! Tree-to-record flattening
//!
//! Walks a message tree in lockstep with the grammar structure. Each node
//! matched by a structure becomes one record (parent before children,
//! children in tree order). A child whose tag the structure does not permit
//! at that level is skipped without error, together with its subtree.

use crate::config::OutConfig;
use crate::dialect::Dialect;
use crate::format::FieldFormatter;
use crate::Result;
use edi_ir::{Node, Record as Values};
use edi_schema::{FieldDef, Structure};
use std::borrow::Cow;
use tracing::trace;

/// A formatted field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub value: String,
    /// Preceded by the sub-field separator instead of the field separator
    pub is_subfield: bool,
}

impl Field {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_subfield: false,
        }
    }

    pub fn subfield(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_subfield: true,
        }
    }

    fn empty() -> Self {
        Self::new(String::new())
    }
}

/// One flattened record; the first field is the record tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Structural path, e.g. `UNH/LIN/QTY`
    pub path: String,
    pub fields: Vec<Field>,
}

impl Record {
    /// Field values, for tests and diagnostics
    pub fn values(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.value.as_str()).collect()
    }
}

/// Flattens one message tree into records.
///
/// Holds the IDoc segment counter, so use one flattener per message.
pub struct Flattener<'a> {
    config: &'a OutConfig,
    formatter: FieldFormatter<'a>,
    segnum: usize,
}

impl<'a> Flattener<'a> {
    pub fn new(config: &'a OutConfig) -> Self {
        Self {
            config,
            formatter: FieldFormatter::new(config),
            segnum: 0,
        }
    }

    /// Collect all records for `node`, which must match `structure`
    pub fn flatten(&mut self, node: &Node, structure: &Structure) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        self.flatten_with(node, structure, &mut |record| {
            records.push(record);
            Ok(())
        })?;
        Ok(records)
    }

    /// Hand every record to `emit` as soon as it is built.
    ///
    /// Returns the number of records emitted.
    pub fn flatten_with<F>(&mut self, node: &Node, structure: &Structure, emit: &mut F) -> Result<usize>
    where
        F: FnMut(Record) -> Result<()>,
    {
        self.walk(node, structure, 0, emit)
    }

    fn walk<F>(&mut self, node: &Node, structure: &Structure, parent_segnum: usize, emit: &mut F) -> Result<usize>
    where
        F: FnMut(Record) -> Result<()>,
    {
        let segnum = self.segnum;
        let values = self.canonical_values(node, structure, parent_segnum);
        emit(self.record(&values, structure)?)?;
        let mut count = 1;

        for child in &node.children {
            let Some(tag) = child.tag() else {
                trace!(path = %structure.path, "Skipping child node without record tag");
                continue;
            };
            match structure.child(tag) {
                Some(child_structure) => {
                    count += self.walk(child, child_structure, segnum, emit)?;
                }
                None => {
                    trace!(path = %structure.path, tag, "Skipping child not permitted by grammar");
                }
            }
        }
        Ok(count)
    }

    /// Node values with the IDoc control fields laid over them
    fn canonical_values<'n>(&mut self, node: &'n Node, structure: &Structure, parent_segnum: usize) -> Cow<'n, Values> {
        if self.config.dialect != Dialect::Idoc {
            return Cow::Borrowed(&node.record);
        }

        let mut values = node.record.clone();
        values.insert("MANDT".to_string(), self.config.idoc_mandt.clone());
        values.insert("DOCNUM".to_string(), self.config.idoc_docnum.clone());
        if self.config.automatic_count {
            values.insert("SEGNUM".to_string(), self.segnum.to_string());
            values.insert("PSGNUM".to_string(), parent_segnum.to_string());
            values.insert("HLEVEL".to_string(), structure.level().to_string());
        }
        // the control record is not counted
        self.segnum += 1;
        Cow::Owned(values)
    }

    fn record(&self, values: &Values, structure: &Structure) -> Result<Record> {
        let path = structure.path.as_str();
        let mut fields = Vec::with_capacity(structure.fields.len());
        // empty fields that are only written when a later field is present
        let mut pending: Vec<Field> = Vec::new();

        for def in &structure.fields {
            if !def.is_composite() {
                if let Some(raw) = values.get(&def.id) {
                    fields.append(&mut pending);
                    fields.push(Field::new(self.formatter.format(Some(raw), def, path)?));
                } else if self.config.strip_empty_fields {
                    pending.push(Field::empty());
                } else {
                    fields.push(Field::new(self.formatter.format(None, def, path)?));
                }
                continue;
            }

            if !self.composite(values, def, path, &mut fields, &mut pending)? {
                pending.push(Field::empty());
            }
        }

        Ok(Record {
            path: path.to_string(),
            fields,
        })
    }

    /// Write the sub-fields of a composite up to the last present one.
    /// Returns false when none is present.
    fn composite(
        &self,
        values: &Values,
        def: &FieldDef,
        path: &str,
        fields: &mut Vec<Field>,
        pending: &mut Vec<Field>,
    ) -> Result<bool> {
        let mut pending_subfields = Vec::new();
        let mut written = false;

        for (index, sub) in def.subfields.iter().enumerate() {
            let raw = values.get(&sub.id);
            let value = self.formatter.format(raw.map(String::as_str), sub, path)?;
            let field = Field {
                value,
                is_subfield: index > 0,
            };
            if raw.is_some() {
                fields.append(pending);
                fields.append(&mut pending_subfields);
                fields.push(field);
                written = true;
            } else {
                pending_subfields.push(field);
            }
        }
        Ok(written)
    }
}
