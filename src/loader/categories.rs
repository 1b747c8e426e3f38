//! Category loading.
//!
//! Categories come from the `categories` section of the settings file or, if
//! that is absent, from `categories.toml` in the data directory. They are
//! registered before any quest so membership can be linked while building.

use std::fs;
use std::path::Path;
use toml::{Table, Value};
use tracing::{debug, info};

use crate::display::DisplayItem;
use crate::document::{ParsedDocument, is_alphanumeric};
use crate::problem::{ConfigProblem, ProblemMap};
use crate::quest::{Category, QuestGraph};
use crate::settings::Settings;

pub const CATEGORIES_FILE: &str = "categories.toml";

/// A `categories` section and the file it was read from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySource {
    /// Problem map key for category diagnostics
    pub label: String,
    pub section: Table,
}

impl CategorySource {
    pub fn new(label: impl Into<String>, section: Table) -> Self {
        Self {
            label: label.into(),
            section,
        }
    }

    /// Pick the category source for a load cycle. Categories embedded in the
    /// settings file win and are labelled `settings_label`; otherwise
    /// `categories.toml` under `data_dir` is read. A malformed file is reported
    /// under its own name and contributes no categories.
    pub fn resolve(
        settings: &Settings,
        settings_label: &str,
        data_dir: &Path,
        problems: &mut ProblemMap,
    ) -> Self {
        if let Some(section) = &settings.categories {
            return Self::new(settings_label, section.clone());
        }

        let path = data_dir.join(CATEGORIES_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No categories file read from {:?}: {}", path, e);
                return Self::new(CATEGORIES_FILE, Table::new());
            }
        };

        match ParsedDocument::parse("categories", CATEGORIES_FILE, &content) {
            Ok(document) => Self::new(
                CATEGORIES_FILE,
                document.section("categories").cloned().unwrap_or_default(),
            ),
            Err(e) => {
                problems
                    .entry(CATEGORIES_FILE.to_string())
                    .or_default()
                    .push(ConfigProblem::malformed_document(&e.to_string()));
                Self::new(CATEGORIES_FILE, Table::new())
            }
        }
    }
}

/// Register every well-formed category of `source` into `graph`
pub fn build_categories(
    source: &CategorySource,
    graph: &mut QuestGraph,
    problems: &mut ProblemMap,
) {
    let mut found = Vec::new();

    for (id, entry) in &source.section {
        if !is_alphanumeric(id) {
            found.push(ConfigProblem::invalid_category_id(id));
            continue;
        }

        let Some(section) = entry.as_table() else {
            found.push(ConfigProblem::category_not_section(id));
            continue;
        };

        let gui_name = section
            .get("gui-name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let permission_required = section
            .get("permission-required")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let hidden = section.get("hidden").and_then(Value::as_bool).unwrap_or(false);

        graph.register_category(Category::new(id.as_str(), gui_name, permission_required, hidden));
        graph
            .displays_mut()
            .register_category(id, DisplayItem::from_path(section, "display", id));
    }

    if !found.is_empty() {
        problems.entry(source.label.clone()).or_default().extend(found);
    }

    info!("{} categories have been registered.", graph.categories().len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ProblemKind;
    use crate::settings::SETTINGS_FILE;
    use tempfile::TempDir;

    fn section(source: &str) -> Table {
        let root: Table = toml::from_str(source).unwrap();
        root["categories"].as_table().cloned().unwrap()
    }

    #[test]
    fn test_build_categories() {
        let source = CategorySource::new(SETTINGS_FILE, section(
            r#"
[categories]
loose = "text"

[categories.mining]
gui-name = "Mining Quests"
permission-required = true

[categories.mining.display]
name = "&7Mining"
type = "stone_pickaxe"

[categories.farming]
hidden = true

[categories.bad-id]
gui-name = "Nope"
"#,
        ));

        let mut graph = QuestGraph::new();
        let mut problems = ProblemMap::new();
        build_categories(&source, &mut graph, &mut problems);

        assert_eq!(graph.category_ids(), vec!["mining", "farming"]);
        let mining = graph.category("mining").unwrap();
        assert_eq!(mining.gui_name.as_deref(), Some("Mining Quests"));
        assert!(mining.permission_required);
        assert!(!mining.hidden);
        assert!(graph.category("farming").unwrap().hidden);

        assert_eq!(graph.displays().category("mining").unwrap().name, "&7Mining");
        assert_eq!(graph.displays().category("farming").unwrap().name, "farming");

        let reported = &problems[SETTINGS_FILE];
        let kinds: Vec<_> = reported.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![ProblemKind::CategoryNotSection, ProblemKind::InvalidCategoryId]
        );
        assert!(!reported[0].is_error());
        assert!(reported[1].is_error());
        assert_eq!(reported[1].location, "categories.bad-id");
    }

    #[test]
    fn test_embedded_categories_take_precedence() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CATEGORIES_FILE),
            "[categories.fromfile]\n",
        )
        .unwrap();

        let settings = Settings::from_toml("[categories.embedded]\n").unwrap();
        let mut problems = ProblemMap::new();
        let source =
            CategorySource::resolve(&settings, "quests.toml", temp_dir.path(), &mut problems);
        assert_eq!(source.label, "quests.toml");
        assert!(source.section.contains_key("embedded"));

        let source = CategorySource::resolve(
            &Settings::default(),
            SETTINGS_FILE,
            temp_dir.path(),
            &mut problems,
        );
        assert_eq!(source.label, CATEGORIES_FILE);
        assert!(source.section.contains_key("fromfile"));
        assert!(problems.is_empty());
    }

    #[test]
    fn test_malformed_categories_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CATEGORIES_FILE), "[categories\n").unwrap();

        let mut problems = ProblemMap::new();
        let source = CategorySource::resolve(
            &Settings::default(),
            SETTINGS_FILE,
            temp_dir.path(),
            &mut problems,
        );
        assert!(source.section.is_empty());
        assert_eq!(problems[CATEGORIES_FILE][0].kind, ProblemKind::MalformedDocument);
    }

    #[test]
    fn test_missing_categories_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut problems = ProblemMap::new();
        let source = CategorySource::resolve(
            &Settings::default(),
            SETTINGS_FILE,
            temp_dir.path(),
            &mut problems,
        );
        assert!(source.section.is_empty());
        assert!(problems.is_empty());
    }
}
