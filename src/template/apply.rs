//! Template instantiation.
//!
//! Applying a template substitutes a [`VariableMapping`] into every
//! free-text field and produces an [`EpicPayload`], the structure handed to
//! the project-management API client.

use serde::{Deserialize, Serialize};

use crate::error::{EpicstampError, Result};

use super::schema::{StoryTemplate, StoryType, TaskTemplate, Template};
use super::variables::{missing_variables, replace_variables, VariableMapping};

/// An epic ready to be created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicPayload {
    pub name: String,
    pub description: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective_ids: Option<Vec<String>>,
    pub stories: Vec<StoryPayload>,
}

/// A story ready to be created under the epic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryPayload {
    pub name: String,
    pub description: String,
    pub story_type: StoryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_state_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_ids: Option<Vec<String>>,
    pub tasks: Vec<TaskPayload>,
}

/// A task ready to be created under a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub description: String,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_ids: Option<Vec<String>>,
}

/// Substitute the mapping into every text field of the template.
///
/// Unmapped placeholders stay as literal `{{name}}` text.
pub fn instantiate(template: &Template, mapping: &VariableMapping) -> EpicPayload {
    let epic = &template.epic;
    EpicPayload {
        name: replace_variables(&epic.name, mapping),
        description: replace_variables(&epic.description, mapping),
        state: epic.state.clone(),
        owner_ids: epic.owner_ids.clone(),
        planned_start_date: epic.planned_start_date.clone(),
        deadline: epic.deadline.clone(),
        group_id: epic.group_id.clone(),
        objective_ids: epic.objective_ids.clone(),
        stories: template
            .stories
            .iter()
            .map(|story| instantiate_story(story, mapping))
            .collect(),
    }
}

/// Like [`instantiate`], but fails if any declared variable is unmapped.
pub fn instantiate_strict(template: &Template, mapping: &VariableMapping) -> Result<EpicPayload> {
    let missing = missing_variables(template, mapping);
    if !missing.is_empty() {
        return Err(EpicstampError::MissingVariables { names: missing });
    }
    Ok(instantiate(template, mapping))
}

fn instantiate_story(story: &StoryTemplate, mapping: &VariableMapping) -> StoryPayload {
    StoryPayload {
        name: replace_variables(&story.name, mapping),
        description: replace_variables(&story.description, mapping),
        story_type: story.story_type,
        workflow_id: story.workflow_id,
        workflow_state_id: story.workflow_state_id,
        iteration_id: story.iteration_id,
        group_id: story.group_id.clone(),
        estimate: story.estimate,
        owner_ids: story.owner_ids.clone(),
        tasks: story
            .tasks
            .iter()
            .map(|task| instantiate_task(task, mapping))
            .collect(),
    }
}

fn instantiate_task(task: &TaskTemplate, mapping: &VariableMapping) -> TaskPayload {
    TaskPayload {
        description: replace_variables(&task.description, mapping),
        complete: task.complete,
        owner_ids: task.owner_ids.clone(),
    }
}
