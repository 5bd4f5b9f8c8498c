//! Grammar loader with caching
//!
//! Grammar files live at `<root>/<editype>/<messagetype>.{json,yaml,yml}` and
//! have three sections: `syntax`, a nested `structure` list and the
//! `recorddefs` table mapping every record tag to its fields. Partner syntax
//! files live at `<root>/partners/<editype>/<partner>.{json,yaml,yml}` and
//! only carry a `syntax` section.

use crate::model::{FieldDef, FieldFormat, Grammar, Structure, TAG_FIELD};
use crate::registry::GrammarRegistry;
use crate::syntax::Syntax;
use crate::{Error, GrammarSource, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, trace};

const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Serializable grammar format for loading from files
#[derive(Debug, Deserialize)]
struct GrammarFile {
    #[serde(default)]
    syntax: Syntax,
    #[serde(default)]
    structure: Vec<StructureFile>,
    #[serde(default)]
    recorddefs: HashMap<String, Vec<FieldFile>>,
}

#[derive(Debug, Deserialize)]
struct StructureFile {
    id: String,
    #[serde(default)]
    level: Vec<StructureFile>,
}

#[derive(Debug, Deserialize)]
struct FieldFile {
    id: String,
    #[serde(default)]
    format: Option<FieldFormat>,
    #[serde(default)]
    min: usize,
    #[serde(default = "default_max_length")]
    max: usize,
    #[serde(default)]
    decimals: usize,
    #[serde(default)]
    subfields: Vec<FieldFile>,
}

#[derive(Debug, Deserialize)]
struct PartnerFile {
    #[serde(default)]
    syntax: Syntax,
}

fn default_max_length() -> usize {
    35
}

/// Grammar loader backed by a concurrent cache
pub struct GrammarLoader {
    registry: Arc<GrammarRegistry>,
    grammar_paths: Vec<PathBuf>,
}

impl GrammarLoader {
    /// Create a new grammar loader with the given search paths
    pub fn new(grammar_paths: Vec<PathBuf>) -> Self {
        Self {
            registry: Arc::new(GrammarRegistry::new()),
            grammar_paths,
        }
    }

    /// Create a new grammar loader with a pre-configured registry
    pub fn with_registry(registry: Arc<GrammarRegistry>, grammar_paths: Vec<PathBuf>) -> Self {
        Self {
            registry,
            grammar_paths,
        }
    }

    /// Load a grammar by editype and message type.
    /// First checks the cache, then loads from disk
    pub fn load(&self, editype: &str, messagetype: &str) -> Result<Arc<Grammar>> {
        if let Some(cached) = self.registry.get(editype, messagetype) {
            debug!(editype, messagetype, "Cache hit for grammar");
            return Ok(cached);
        }

        trace!(editype, messagetype, "Cache miss for grammar");

        let path = self
            .find_file(&[editype], messagetype)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "grammar for editype \"{editype}\", messagetype \"{messagetype}\" not found in search paths: {:?}",
                    self.grammar_paths
                ))
            })?;

        let grammar = self.load_from_file(&path, editype, messagetype)?;
        info!(editype, messagetype, path = %path.display(), "Loaded grammar");

        Ok(self.registry.register(grammar))
    }

    /// Partner specific syntax; a missing partner file is not an error
    pub fn partner_syntax(&self, editype: &str, partner: &str) -> Result<Option<Arc<Syntax>>> {
        if let Some(cached) = self.registry.partner(editype, partner) {
            return Ok(cached);
        }

        let Some(path) = self.find_file(&["partners", editype], partner) else {
            debug!(
                editype,
                partner, "No partner specific syntax found (is not an error)"
            );
            return Ok(self.registry.register_partner(editype, partner, None));
        };

        let content = std::fs::read_to_string(&path)?;
        let file: PartnerFile = if is_yaml(&path) {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::InvalidFormat(format!("YAML parse error: {e}")))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::InvalidFormat(format!("JSON parse error: {e}")))?
        };
        debug!(editype, partner, path = %path.display(), "Read partner specific syntax");

        Ok(self
            .registry
            .register_partner(editype, partner, Some(file.syntax)))
    }

    /// Load a grammar from a specific file path (not cached)
    pub fn load_from_file(&self, path: &Path, editype: &str, messagetype: &str) -> Result<Grammar> {
        trace!("Loading grammar from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;

        if is_yaml(path) {
            self.load_from_yaml(&content, editype, messagetype)
        } else {
            self.load_from_json(&content, editype, messagetype)
        }
    }

    /// Load a grammar from JSON string
    pub fn load_from_json(&self, json: &str, editype: &str, messagetype: &str) -> Result<Grammar> {
        let file: GrammarFile = serde_json::from_str(json)
            .map_err(|e| Error::InvalidFormat(format!("JSON parse error: {e}")))?;

        convert_grammar_file(file, editype, messagetype)
    }

    /// Load a grammar from YAML string
    pub fn load_from_yaml(&self, yaml: &str, editype: &str, messagetype: &str) -> Result<Grammar> {
        let file: GrammarFile = serde_yaml::from_str(yaml)
            .map_err(|e| Error::InvalidFormat(format!("YAML parse error: {e}")))?;

        convert_grammar_file(file, editype, messagetype)
    }

    /// Add a search path for grammar files
    pub fn add_path(&mut self, path: PathBuf) {
        self.grammar_paths.push(path);
    }

    /// Get the registry (for testing/debugging)
    pub fn registry(&self) -> &GrammarRegistry {
        &self.registry
    }

    fn find_file(&self, dirs: &[&str], name: &str) -> Option<PathBuf> {
        for root in &self.grammar_paths {
            let dir = dirs.iter().fold(root.clone(), |path, part| path.join(part));
            for extension in EXTENSIONS {
                let file_path = dir.join(format!("{name}.{extension}"));
                if file_path.exists() {
                    trace!("Found grammar file: {:?}", file_path);
                    return Some(file_path);
                }
            }
        }
        None
    }
}

impl Default for GrammarLoader {
    fn default() -> Self {
        Self::new(vec![PathBuf::from(".")])
    }
}

impl GrammarSource for GrammarLoader {
    fn grammar(&self, editype: &str, messagetype: &str) -> Result<Arc<Grammar>> {
        self.load(editype, messagetype)
    }

    fn partner_syntax(&self, editype: &str, partner: &str) -> Result<Option<Arc<Syntax>>> {
        GrammarLoader::partner_syntax(self, editype, partner)
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e == "yaml" || e == "yml")
}

/// Convert a GrammarFile to a Grammar, checking structural invariants
fn convert_grammar_file(file: GrammarFile, editype: &str, messagetype: &str) -> Result<Grammar> {
    let mut roots = file.structure.into_iter();
    let (Some(root), None) = (roots.next(), roots.next()) else {
        return Err(Error::InvalidFormat(format!(
            "grammar {editype}/{messagetype}: structure must have exactly one root record"
        )));
    };

    let structure = convert_structure(root, None, &file.recorddefs)?;
    Ok(Grammar::new(editype, messagetype, structure).with_syntax(file.syntax))
}

fn convert_structure(
    file: StructureFile,
    parent_path: Option<&str>,
    recorddefs: &HashMap<String, Vec<FieldFile>>,
) -> Result<Structure> {
    let path = match parent_path {
        Some(parent) => format!("{parent}/{}", file.id),
        None => file.id.clone(),
    };

    let defs = recorddefs.get(&file.id).ok_or_else(|| {
        Error::InvalidFormat(format!("record \"{path}\" has no recorddef"))
    })?;
    let mut fields = defs
        .iter()
        .map(|f| convert_field(f, &path, true))
        .collect::<Result<Vec<_>>>()?;

    match fields.iter().position(|f| f.id == TAG_FIELD) {
        Some(0) => {}
        Some(_) => {
            return Err(Error::InvalidFormat(format!(
                "record \"{path}\": field \"{TAG_FIELD}\" must be the first field"
            )));
        }
        None => fields.insert(0, FieldDef::tag(default_max_length())),
    }

    let mut seen = HashSet::new();
    let mut children = Vec::with_capacity(file.level.len());
    for child in file.level {
        if !seen.insert(child.id.clone()) {
            return Err(Error::InvalidFormat(format!(
                "record \"{path}\": child record \"{}\" occurs more than once at this level",
                child.id
            )));
        }
        children.push(convert_structure(child, Some(&path), recorddefs)?);
    }

    Ok(Structure {
        id: file.id,
        path,
        fields,
        children,
    })
}

fn convert_field(file: &FieldFile, path: &str, allow_composite: bool) -> Result<FieldDef> {
    if !file.subfields.is_empty() {
        if !allow_composite {
            return Err(Error::InvalidFormat(format!(
                "record \"{path}\" field \"{}\": subfields cannot be composite",
                file.id
            )));
        }
        let subfields = file
            .subfields
            .iter()
            .map(|s| convert_field(s, path, false))
            .collect::<Result<Vec<_>>>()?;
        return Ok(FieldDef::composite(file.id.clone(), subfields));
    }

    let format = file.format.unwrap_or(FieldFormat::Alphanumeric);
    if file.min > file.max {
        return Err(Error::InvalidFormat(format!(
            "record \"{path}\" field \"{}\": min length {} exceeds max length {}",
            file.id, file.min, file.max
        )));
    }
    if file.decimals > 0 && !format.is_numeric() {
        return Err(Error::InvalidFormat(format!(
            "record \"{path}\" field \"{}\": decimals only allowed for numeric formats, not '{}'",
            file.id,
            format.code()
        )));
    }

    Ok(FieldDef::new(file.id.clone(), format, file.min, file.max).with_decimals(file.decimals))
}
