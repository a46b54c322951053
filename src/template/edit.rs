//! In-place template editing.
//!
//! Every mutation recomputes [`Template::variables`] and bumps `updated_at`,
//! so the variable list never drifts from the text.

use chrono::Utc;

use crate::error::{EpicstampError, Result};

use super::schema::{EpicDetails, StoryTemplate, TaskTemplate, Template};

fn check_index(what: &'static str, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(EpicstampError::IndexOutOfRange { what, index, len })
    }
}

fn move_item<T>(items: &mut Vec<T>, what: &'static str, from: usize, to: usize) -> Result<()> {
    check_index(what, from, items.len())?;
    check_index(what, to, items.len())?;
    let item = items.remove(from);
    items.insert(to, item);
    Ok(())
}

impl Template {
    fn touch(&mut self) {
        self.refresh_variables();
        self.updated_at = Utc::now();
    }

    fn story_mut(&mut self, index: usize) -> Result<&mut StoryTemplate> {
        let len = self.stories.len();
        self.stories
            .get_mut(index)
            .ok_or(EpicstampError::IndexOutOfRange {
                what: "story",
                index,
                len,
            })
    }

    /// Replace the epic details.
    pub fn set_epic(&mut self, epic: EpicDetails) {
        self.epic = epic;
        self.touch();
    }

    /// Append a story.
    pub fn add_story(&mut self, story: StoryTemplate) {
        self.stories.push(story);
        self.touch();
    }

    /// Replace the story at `index`.
    pub fn update_story(&mut self, index: usize, story: StoryTemplate) -> Result<()> {
        *self.story_mut(index)? = story;
        self.touch();
        Ok(())
    }

    /// Remove and return the story at `index`.
    pub fn remove_story(&mut self, index: usize) -> Result<StoryTemplate> {
        check_index("story", index, self.stories.len())?;
        let story = self.stories.remove(index);
        self.touch();
        Ok(story)
    }

    /// Move a story so that it ends up at position `to`.
    pub fn move_story(&mut self, from: usize, to: usize) -> Result<()> {
        move_item(&mut self.stories, "story", from, to)?;
        self.touch();
        Ok(())
    }

    /// Append a task to a story.
    pub fn add_task(&mut self, story: usize, task: TaskTemplate) -> Result<()> {
        self.story_mut(story)?.tasks.push(task);
        self.touch();
        Ok(())
    }

    /// Remove and return a task from a story.
    pub fn remove_task(&mut self, story: usize, task: usize) -> Result<TaskTemplate> {
        let tasks = &mut self.story_mut(story)?.tasks;
        check_index("task", task, tasks.len())?;
        let removed = tasks.remove(task);
        self.touch();
        Ok(removed)
    }

    /// Move a task within its story.
    pub fn move_task(&mut self, story: usize, from: usize, to: usize) -> Result<()> {
        move_item(&mut self.story_mut(story)?.tasks, "task", from, to)?;
        self.touch();
        Ok(())
    }

    /// Flip a task's completion flag and return the new value.
    pub fn toggle_task(&mut self, story: usize, task: usize) -> Result<bool> {
        let tasks = &mut self.story_mut(story)?.tasks;
        let len = tasks.len();
        let task = tasks
            .get_mut(task)
            .ok_or(EpicstampError::IndexOutOfRange {
                what: "task",
                index: task,
                len,
            })?;
        task.complete = !task.complete;
        let complete = task.complete;
        self.touch();
        Ok(complete)
    }
}
