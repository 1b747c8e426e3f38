//! Parsed Documents
//!
//! A TOML file held as a key/value tree with dotted-path addressing.
//! Reads are lenient: a value of the wrong type behaves like an absent one.

use toml::{Table, Value};

/// One parsed source file
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// Identifier derived from the file name (extension stripped)
    id: String,
    /// Path relative to the load root, `/`-separated
    relative_path: String,
    root: Table,
}

impl ParsedDocument {
    pub fn new(id: impl Into<String>, relative_path: impl Into<String>, root: Table) -> Self {
        Self {
            id: id.into(),
            relative_path: relative_path.into(),
            root,
        }
    }

    /// Parse TOML source into a document
    pub fn parse(
        id: impl Into<String>,
        relative_path: impl Into<String>,
        source: &str,
    ) -> Result<Self, toml::de::Error> {
        let root: Table = toml::from_str(source)?;
        Ok(Self::new(id, relative_path, root))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn root(&self) -> &Table {
        &self.root
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.root, path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// The table at `path`, if it is one
    pub fn section(&self, path: &str) -> Option<&Table> {
        self.get(path).and_then(Value::as_table)
    }

    pub fn is_section(&self, path: &str) -> bool {
        self.section(path).is_some()
    }

    /// Scalar at `path` as a string (numbers and booleans are stringified)
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(scalar_to_string)
    }

    pub fn get_bool(&self, path: &str, default: bool) -> bool {
        self.get(path).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn get_int(&self, path: &str, default: i64) -> i64 {
        match self.get(path) {
            Some(Value::Integer(i)) => *i,
            Some(Value::Float(f)) => *f as i64,
            _ => default,
        }
    }

    pub fn get_string_list(&self, path: &str) -> Vec<String> {
        self.get(path).map(string_list).unwrap_or_default()
    }
}

/// Walk `path` (dot separated) through nested tables
pub fn lookup<'a>(table: &'a Table, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = table.get(segments.next()?)?;
    for segment in segments {
        current = current.as_table()?.get(segment)?;
    }
    Some(current)
}

pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(d) => Some(d.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

/// Scalar elements of an array, stringified; anything else is an empty list
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
        _ => Vec::new(),
    }
}

/// Letters and digits only, and at least one of them
pub fn is_alphanumeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphanumeric)
}
