//! Template schema types.
//!
//! A [`Template`] bundles an epic definition, its ordered stories and their
//! tasks, and the variable names derived from the free-text fields.
//! Templates are persisted as camelCase JSON and can be imported from YAML.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::id::TemplateId;
use super::variables::recompute_template_variables;

/// A reusable epic template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Unique identifier.
    pub id: TemplateId,

    /// Display name of the template itself.
    pub name: String,

    /// What the template is for.
    #[serde(default)]
    pub description: String,

    /// The epic that is created when the template is applied.
    #[serde(default)]
    pub epic: EpicDetails,

    /// Stories created under the epic, in order.
    #[serde(default)]
    pub stories: Vec<StoryTemplate>,

    /// Placeholder names found in the epic and story text.
    ///
    /// Derived; see [`Template::refresh_variables`].
    #[serde(default)]
    pub variables: Vec<String>,

    /// When the template was created.
    pub created_at: DateTime<Utc>,

    /// When the template was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Epic fields. Every free-text field is a substitution target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicDetails {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Display state label, e.g. "to do".
    #[serde(default)]
    pub state: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_ids: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_start_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective_ids: Option<Vec<String>>,
}

/// Kind of story.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryType {
    #[default]
    Feature,
    Bug,
    Chore,
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Feature => "feature",
            Self::Bug => "bug",
            Self::Chore => "chore",
        };
        f.write_str(s)
    }
}

impl FromStr for StoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feature" => Ok(Self::Feature),
            "bug" => Ok(Self::Bug),
            "chore" => Ok(Self::Chore),
            _ => Err(format!("unknown story type: {}", s)),
        }
    }
}

/// A story within a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryTemplate {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub story_type: StoryType,

    /// Display state label.
    #[serde(default)]
    pub state: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_state_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    /// Point estimate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_ids: Option<Vec<String>>,

    #[serde(default)]
    pub tasks: Vec<TaskTemplate>,
}

/// A checklist task within a story.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplate {
    pub description: String,

    #[serde(default)]
    pub complete: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_ids: Option<Vec<String>>,
}

impl Template {
    /// Create an empty template with a freshly generated id.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TemplateId::new(),
            name: name.into(),
            description: String::new(),
            epic: EpicDetails::default(),
            stories: Vec::new(),
            variables: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the template description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Recompute [`Template::variables`] from the epic and story text.
    pub fn refresh_variables(&mut self) {
        self.variables = recompute_template_variables(self);
    }

    /// Total number of tasks across all stories.
    pub fn task_count(&self) -> usize {
        self.stories.iter().map(|s| s.tasks.len()).sum()
    }
}

impl StoryTemplate {
    /// Create a story with a name and type.
    pub fn new(name: impl Into<String>, story_type: StoryType) -> Self {
        Self {
            name: name.into(),
            story_type,
            ..Default::default()
        }
    }

    /// Set the story description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a task.
    pub fn with_task(mut self, task: TaskTemplate) -> Self {
        self.tasks.push(task);
        self
    }
}

impl TaskTemplate {
    /// Create an incomplete task.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }
}
