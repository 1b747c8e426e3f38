//! Directory walking and per-file parsing.
//!
//! Files are visited depth-first in lexical order so diagnostics and file
//! precedence are reproducible. Every file produces its own outcome; one bad
//! file never stops the walk.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

use crate::document::ParsedDocument;
use crate::macros::MacroMap;
use crate::problem::{ConfigProblem, ProblemMap};

pub const CONFIG_EXTENSION: &str = ".toml";

/// An eligible file found under the load root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// Root-relative, `/`-separated; the bare file name when the root is the file
    pub relative_path: String,
    /// File name with the extension stripped
    pub id: String,
}

/// Case-insensitive extension check
pub fn is_config_file(file_name: &str) -> bool {
    file_id(file_name).is_some()
}

/// The file name without its extension, if it has the recognized one
pub fn file_id(file_name: &str) -> Option<&str> {
    let split = file_name.len().checked_sub(CONFIG_EXTENSION.len())?;
    let (stem, extension) = (file_name.get(..split)?, file_name.get(split..)?);
    extension.eq_ignore_ascii_case(CONFIG_EXTENSION).then_some(stem)
}

/// Collect every eligible file under `root`. A missing root yields nothing.
pub fn discover_files(root: &Path) -> Vec<DiscoveredFile> {
    let mut files = Vec::new();

    if !root.exists() {
        warn!("Directory does not exist: {:?}", root);
        return files;
    }

    if root.is_file() {
        if let Some(file) = discovered(root, root) {
            files.push(file);
        }
        return files;
    }

    discover_recursive(root, root, &mut files);
    files
}

fn discover_recursive(root: &Path, dir: &Path, files: &mut Vec<DiscoveredFile>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Failed to read directory {:?} (will be ignored): {}", dir, e);
            return;
        }
    };

    let mut entries: Vec<_> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                error!("Failed to read entry in {:?}: {}", dir, e);
                None
            }
        })
        .collect();
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if is_dir {
            discover_recursive(root, &path, files);
        } else if path.is_file() {
            if let Some(file) = discovered(root, &path) {
                files.push(file);
            }
        }
    }
}

fn discovered(root: &Path, path: &Path) -> Option<DiscoveredFile> {
    let file_name = path.file_name()?.to_str()?;
    let id = file_id(file_name)?;

    let relative_path = path
        .strip_prefix(root)
        .map(|relative| {
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default();
    let relative_path = if relative_path.is_empty() {
        file_name.to_string()
    } else {
        relative_path
    };

    Some(DiscoveredFile {
        path: path.to_path_buf(),
        relative_path,
        id: id.to_string(),
    })
}

/// What happened to one file
#[derive(Debug)]
pub enum FileOutcome {
    Parsed(ParsedDocument),
    /// Read, but not valid TOML
    Malformed(ConfigProblem),
    /// Could not be read at all; logged, not reported
    Skipped(std::io::Error),
}

/// Read a file, substitute macros and parse it
pub fn load_file(file: &DiscoveredFile, macros: &MacroMap) -> FileOutcome {
    let content = match fs::read_to_string(&file.path) {
        Ok(content) => content,
        Err(e) => return FileOutcome::Skipped(e),
    };

    let processed = macros.substitute(&content);
    match ParsedDocument::parse(file.id.clone(), file.relative_path.clone(), &processed) {
        Ok(document) => FileOutcome::Parsed(document),
        Err(e) => FileOutcome::Malformed(ConfigProblem::malformed_document(&e.to_string())),
    }
}

/// Parsed quest files in discovery order, plus parse failures
#[derive(Debug, Default)]
pub struct QuestParsingResult {
    pub quest_files: Vec<ParsedDocument>,
    pub problems: ProblemMap,
}

impl QuestParsingResult {
    pub fn get(&self, relative_path: &str) -> Option<&ParsedDocument> {
        self.quest_files
            .iter()
            .find(|d| d.relative_path() == relative_path)
    }
}

/// Walk `root`, parsing every quest file with `macros` applied
pub fn parse_quest_files(root: &Path, macros: &MacroMap) -> QuestParsingResult {
    let mut result = QuestParsingResult::default();

    for file in discover_files(root) {
        match load_file(&file, macros) {
            FileOutcome::Parsed(document) => result.quest_files.push(document),
            FileOutcome::Malformed(problem) => {
                result.problems.insert(file.relative_path, vec![problem]);
            }
            FileOutcome::Skipped(e) => {
                error!(
                    "An error occurred when attempting to read quest '{:?}' (will be ignored): {}",
                    file.path, e
                );
            }
        }
    }

    result
}
