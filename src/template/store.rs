//! Template storage.
//!
//! Each template is one pretty-printed JSON file named after its id.

use anyhow::Context;
use chrono::Utc;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EpicstampError, Result};

use super::id::TemplateId;
use super::schema::{EpicDetails, StoryTemplate, Template};

/// Directory-backed template store.
pub struct TemplateStore {
    root: PathBuf,
}

/// A template as written by hand, before it has been stored.
///
/// Ids and timestamps are optional; variables are always recomputed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplateFile {
    #[serde(default)]
    id: Option<TemplateId>,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    epic: EpicDetails,
    #[serde(default)]
    stories: Vec<StoryTemplate>,
}

impl TemplateStore {
    /// Create a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create template directory {:?}", self.root))?;
        Ok(())
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    /// Path for a caller-supplied id. Anything that is not a well-formed
    /// template id cannot name a stored template.
    fn checked_path(&self, id: &str) -> Result<PathBuf> {
        if TemplateId::parse(id).is_none() {
            return Err(EpicstampError::TemplateNotFound { id: id.to_string() });
        }
        Ok(self.path_for(id))
    }

    /// Start a new, unsaved template with a generated id.
    pub fn create(&self, name: &str) -> Template {
        Template::new(name)
    }

    /// Write a template, recomputing its variables first.
    pub fn save(&self, template: &mut Template) -> Result<()> {
        self.ensure_dir()?;
        template.refresh_variables();

        let path = self.path_for(&template.id.as_str());
        let json = serde_json::to_string_pretty(template).context("Failed to serialize template")?;
        fs::write(&path, json).with_context(|| format!("Failed to write template {:?}", path))?;

        tracing::debug!("Saved template {} to {:?}", template.id, path);
        Ok(())
    }

    /// Load a template by id.
    ///
    /// Malformed ids are reported as [`EpicstampError::TemplateNotFound`].
    pub fn load(&self, id: &str) -> Result<Option<Template>> {
        let path = self.checked_path(id)?;
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)?;
        let template =
            serde_json::from_str(&json).map_err(|e| EpicstampError::TemplateParseError {
                path: path.clone(),
                message: e.to_string(),
            })?;
        Ok(Some(template))
    }

    /// Load a template by id, failing if it does not exist.
    pub fn get(&self, id: &str) -> Result<Template> {
        self.load(id)?
            .ok_or_else(|| EpicstampError::TemplateNotFound { id: id.to_string() })
    }

    /// List all stored templates, sorted by name.
    ///
    /// Files that fail to parse are skipped with a warning.
    pub fn list(&self) -> Result<Vec<Template>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut templates = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }

            let parsed = fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|json| serde_json::from_str::<Template>(&json).map_err(Into::into));
            match parsed {
                Ok(template) => templates.push(template),
                Err(e) => tracing::warn!("Skipping unreadable template {:?}: {}", path, e),
            }
        }

        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    /// Delete a template. Returns whether it existed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let path = self.checked_path(id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        tracing::debug!("Deleted template {}", id);
        Ok(true)
    }

    /// Import a hand-written YAML or JSON template file and save it.
    ///
    /// Files without an id get a fresh one.
    pub fn import(&self, path: &Path) -> Result<Template> {
        let content = fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .is_some_and(|e| e == "yml" || e == "yaml");

        let parse_error = |message: String| EpicstampError::TemplateParseError {
            path: path.to_path_buf(),
            message,
        };
        let file: TemplateFile = if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))?
        } else {
            serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?
        };

        let now = Utc::now();
        let mut template = Template {
            id: file.id.unwrap_or_default(),
            name: file.name,
            description: file.description,
            epic: file.epic,
            stories: file.stories,
            variables: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.save(&mut template)?;
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::StoryType;
    use tempfile::TempDir;

    fn setup() -> (TempDir, TemplateStore) {
        let temp = TempDir::new().unwrap();
        let store = TemplateStore::new(temp.path().join("templates"));
        (temp, store)
    }

    #[test]
    fn save_and_load() {
        let (_temp, store) = setup();
        let mut template = store.create("Launch");
        template
            .stories
            .push(StoryTemplate::new("Ship {{Feature}}", StoryType::Feature));

        store.save(&mut template).unwrap();
        let loaded = store.load(&template.id.as_str()).unwrap().unwrap();

        assert_eq!(loaded, template);
        assert_eq!(loaded.variables, vec!["Feature"]);
    }

    #[test]
    fn load_nonexistent_returns_none() {
        let (_temp, store) = setup();
        assert!(store.load("tpl_1_0011223344556677").unwrap().is_none());
    }

    #[test]
    fn get_nonexistent_is_not_found() {
        let (_temp, store) = setup();
        let err = store.get("tpl_1_0011223344556677").unwrap_err();
        assert!(matches!(err, EpicstampError::TemplateNotFound { .. }));
    }

    #[test]
    fn malformed_ids_never_leave_the_store() {
        let (temp, store) = setup();
        let outside = store.create("outside");
        fs::write(
            temp.path().join("victim.json"),
            serde_json::to_string(&outside).unwrap(),
        )
        .unwrap();

        for id in ["../victim", "tpl_1_../../victim", "victim", ""] {
            assert!(matches!(
                store.load(id).unwrap_err(),
                EpicstampError::TemplateNotFound { .. }
            ));
            assert!(matches!(
                store.delete(id).unwrap_err(),
                EpicstampError::TemplateNotFound { .. }
            ));
        }
        assert!(temp.path().join("victim.json").exists());
    }

    #[test]
    fn list_sorted_by_name() {
        let (_temp, store) = setup();
        for name in ["zeta", "alpha", "mid"] {
            store.save(&mut store.create(name)).unwrap();
        }

        let names: Vec<_> = store.list().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn list_missing_dir_is_empty() {
        let (_temp, store) = setup();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn list_skips_corrupt_files() {
        let (_temp, store) = setup();
        store.save(&mut store.create("good")).unwrap();
        fs::write(store.root().join("broken.json"), "{not json").unwrap();

        let templates = store.list().unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "good");
    }

    #[test]
    fn delete_template() {
        let (_temp, store) = setup();
        let mut template = store.create("gone");
        store.save(&mut template).unwrap();

        assert!(store.delete(&template.id.as_str()).unwrap());
        assert!(!store.delete(&template.id.as_str()).unwrap());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn import_yaml_assigns_id_and_variables() {
        let (temp, store) = setup();
        let path = temp.path().join("launch.yml");
        fs::write(
            &path,
            r#"
name: Launch
epic:
  name: "{{Feature}} launch"
  state: to do
stories:
  - name: "Design {{Feature}}"
    storyType: feature
    tasks:
      - description: "Mock up {{Screen}}"
  - name: "Fix {{Bug}}"
    storyType: bug
    estimate: 2
"#,
        )
        .unwrap();

        let template = store.import(&path).unwrap();
        assert!(template.id.as_str().starts_with("tpl_"));
        assert_eq!(template.variables, vec!["Feature", "Bug"]);
        assert_eq!(template.stories[1].story_type, StoryType::Bug);
        assert_eq!(template.stories[1].estimate, Some(2));

        let loaded = store.get(&template.id.as_str()).unwrap();
        assert_eq!(loaded.name, "Launch");
    }

    #[test]
    fn import_json_keeps_existing_id() {
        let (temp, store) = setup();
        let path = temp.path().join("t.json");
        fs::write(
            &path,
            r#"{"id": "tpl_1700000000000_0011223344556677", "name": "Kept"}"#,
        )
        .unwrap();

        let template = store.import(&path).unwrap();
        assert_eq!(template.id.as_str(), "tpl_1700000000000_0011223344556677");
    }

    #[test]
    fn import_invalid_yaml_is_parse_error() {
        let (temp, store) = setup();
        let path = temp.path().join("bad.yaml");
        fs::write(&path, "stories: [").unwrap();

        let err = store.import(&path).unwrap_err();
        assert!(matches!(err, EpicstampError::TemplateParseError { .. }));
    }
}
