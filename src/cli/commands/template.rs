//! Template command implementation.
//!
//! Provides `epicstamp template new`, `template list`, `template show`, etc.

use anyhow::Context;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::config::Settings;
use crate::error::Result;
use crate::template::{StoryTemplate, StoryType, TaskTemplate, Template, TemplateStore};
use crate::ui::{Prompt, PromptResult, Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// Arguments for the template command.
#[derive(Debug, Clone, Args)]
pub struct TemplateArgs {
    #[command(subcommand)]
    pub command: TemplateSubcommand,
}

/// Template subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum TemplateSubcommand {
    /// Create an empty template.
    New {
        /// Template name.
        name: String,
        /// Template description.
        #[arg(short, long)]
        description: Option<String>,
        /// Epic name, may contain {{variables}}.
        #[arg(long)]
        epic: Option<String>,
        /// Epic description, may contain {{variables}}.
        #[arg(long)]
        epic_description: Option<String>,
    },
    /// List stored templates.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show a template.
    Show {
        /// Template id.
        id: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List the variables a template declares.
    Vars {
        /// Template id.
        id: String,
    },
    /// Import a YAML or JSON template file.
    Import {
        /// File to import.
        file: PathBuf,
    },
    /// Append a story.
    AddStory {
        /// Template id.
        id: String,
        /// Story name, may contain {{variables}}.
        name: String,
        /// Story type: feature, bug or chore.
        #[arg(short = 't', long = "type", default_value = "feature")]
        story_type: StoryType,
        /// Story description, may contain {{variables}}.
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Append a task to a story.
    AddTask {
        /// Template id.
        id: String,
        /// Story index (0-based).
        story: usize,
        /// Task description.
        description: String,
    },
    /// Move a story to a new position.
    MoveStory {
        /// Template id.
        id: String,
        /// Current index (0-based).
        from: usize,
        /// Target index (0-based).
        to: usize,
    },
    /// Delete a template.
    Delete {
        /// Template id.
        id: String,
        /// Don't prompt for confirmation.
        #[arg(short, long)]
        force: bool,
    },
}

/// The template command implementation.
pub struct TemplateCommand {
    store: TemplateStore,
    args: TemplateArgs,
}

impl TemplateCommand {
    /// Create a new template command.
    pub fn new(settings: &Settings, args: TemplateArgs) -> Self {
        Self {
            store: TemplateStore::new(settings.templates_dir()),
            args,
        }
    }
}

impl Command for TemplateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = &self.store;

        match &self.args.command {
            TemplateSubcommand::New {
                name,
                description,
                epic,
                epic_description,
            } => {
                let mut template = store.create(name);
                if let Some(description) = description {
                    template.description = description.clone();
                }
                template.epic.name = epic.clone().unwrap_or_else(|| name.clone());
                if let Some(epic_description) = epic_description {
                    template.epic.description = epic_description.clone();
                }
                store.save(&mut template)?;
                ui.success(&format!("Created template '{}'", template.name));
                ui.message(&template.id.as_str());
            }
            TemplateSubcommand::List { json } => list_templates(store, *json, ui)?,
            TemplateSubcommand::Show { id, json } => {
                let template = store.get(id)?;
                if *json {
                    ui.message(
                        &serde_json::to_string_pretty(&template)
                            .context("Failed to serialize template")?,
                    );
                } else {
                    show_template(&template, ui);
                }
            }
            TemplateSubcommand::Vars { id } => {
                let template = store.get(id)?;
                if template.variables.is_empty() {
                    ui.message("No variables");
                }
                for name in &template.variables {
                    ui.message(name);
                }
            }
            TemplateSubcommand::Import { file } => {
                let template = store.import(file)?;
                ui.success(&format!(
                    "Imported '{}' ({} stories, {} variables)",
                    template.name,
                    template.stories.len(),
                    template.variables.len()
                ));
                ui.message(&template.id.as_str());
            }
            TemplateSubcommand::AddStory {
                id,
                name,
                story_type,
                description,
            } => {
                let mut template = store.get(id)?;
                let mut story = StoryTemplate::new(name, *story_type);
                if let Some(description) = description {
                    story.description = description.clone();
                }
                template.add_story(story);
                store.save(&mut template)?;
                ui.success(&format!(
                    "Added story {} to '{}'",
                    template.stories.len() - 1,
                    template.name
                ));
            }
            TemplateSubcommand::AddTask {
                id,
                story,
                description,
            } => {
                let mut template = store.get(id)?;
                template.add_task(*story, TaskTemplate::new(description))?;
                store.save(&mut template)?;
                ui.success(&format!("Added task to story {}", story));
            }
            TemplateSubcommand::MoveStory { id, from, to } => {
                let mut template = store.get(id)?;
                template.move_story(*from, *to)?;
                store.save(&mut template)?;
                ui.success(&format!("Moved story {} to {}", from, to));
            }
            TemplateSubcommand::Delete { id, force } => {
                return delete_template(store, id, *force, ui);
            }
        }

        Ok(CommandResult::success())
    }
}

fn list_templates(store: &TemplateStore, json: bool, ui: &mut dyn UserInterface) -> Result<()> {
    let templates = store.list()?;

    if json {
        let json =
            serde_json::to_string_pretty(&templates).context("Failed to serialize templates")?;
        ui.message(&json);
        return Ok(());
    }

    if templates.is_empty() {
        ui.message("No templates found");
        return Ok(());
    }

    let mut table = Table::new(&["Id", "Name", "Stories", "Variables"]);
    for template in &templates {
        table.add_row(vec![
            template.id.as_str(),
            template.name.clone(),
            template.stories.len().to_string(),
            template.variables.join(", "),
        ]);
    }
    ui.message(&table.render());
    Ok(())
}

fn show_template(template: &Template, ui: &mut dyn UserInterface) {
    ui.show_header(&template.name);
    if !template.description.is_empty() {
        ui.message(&template.description);
    }
    ui.message(&format!("Id: {}", template.id));
    ui.message(&format!("Epic: {}", template.epic.name));
    if !template.epic.description.is_empty() {
        ui.message(&format!("  {}", template.epic.description));
    }

    for (i, story) in template.stories.iter().enumerate() {
        ui.message(&format!("[{}] {} ({})", i, story.name, story.story_type));
        for task in &story.tasks {
            let mark = if task.complete { "x" } else { " " };
            ui.message(&format!("    [{}] {}", mark, task.description));
        }
    }

    if !template.variables.is_empty() {
        ui.message(&format!("Variables: {}", template.variables.join(", ")));
    }
}

fn delete_template(
    store: &TemplateStore,
    id: &str,
    force: bool,
    ui: &mut dyn UserInterface,
) -> Result<CommandResult> {
    let template = store.get(id)?;

    if !force && ui.is_interactive() {
        let prompt = Prompt::confirm(
            "delete_template",
            format!("Delete template '{}'?", template.name),
        )
        .with_default("false");

        if ui.prompt(&prompt)? != PromptResult::Bool(true) {
            ui.message("Cancelled");
            return Ok(CommandResult::success());
        }
    }

    store.delete(id)?;
    ui.success(&format!("Deleted template '{}'", template.name));
    Ok(CommandResult::success())
}
