//! Apply command implementation.
//!
//! `epicstamp apply <id> --var KEY=VALUE` substitutes values into a template
//! and prints the resulting epic payload as JSON.

use anyhow::Context;
use std::fs;

use crate::cli::args::ApplyArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::template::{
    instantiate, instantiate_strict, missing_variables, TemplateStore, VariableMapping,
};
use crate::ui::{Prompt, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The apply command implementation.
pub struct ApplyCommand {
    store: TemplateStore,
    args: ApplyArgs,
}

impl ApplyCommand {
    /// Create a new apply command.
    pub fn new(settings: &Settings, args: ApplyArgs) -> Self {
        Self {
            store: TemplateStore::new(settings.templates_dir()),
            args,
        }
    }

    /// Ask for every missing variable. Answers equal to the untouched
    /// placeholder leave the variable unmapped.
    fn prompt_missing(
        &self,
        missing: &[String],
        mapping: &mut VariableMapping,
        ui: &mut dyn UserInterface,
    ) -> Result<Vec<String>> {
        let mut unmapped = Vec::new();

        for name in missing {
            let placeholder = format!("{{{{{}}}}}", name);
            let prompt = Prompt::input(name.clone(), format!("Value for {}", placeholder))
                .with_default(placeholder.clone());

            let value = ui.prompt(&prompt)?.as_string();
            if value == placeholder {
                unmapped.push(name.clone());
            } else {
                mapping.insert(name.clone(), value);
            }
        }

        Ok(unmapped)
    }
}

impl Command for ApplyCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut template = self.store.get(&self.args.id)?;
        template.refresh_variables();

        let mut mapping = VariableMapping::from_pairs(&self.args.vars)?;
        let missing = missing_variables(&template, &mapping);

        let payload = if self.args.strict {
            instantiate_strict(&template, &mapping)?
        } else {
            let unmapped = self.prompt_missing(&missing, &mut mapping, ui)?;
            if !unmapped.is_empty() {
                ui.warning(&format!(
                    "Left unmapped variables as-is: {}",
                    unmapped.join(", ")
                ));
            }
            instantiate(&template, &mapping)
        };

        tracing::debug!(
            "Applied template {} with {} variables",
            template.id,
            mapping.len()
        );

        let json = serde_json::to_string_pretty(&payload).context("Failed to serialize payload")?;
        match &self.args.output {
            Some(path) => {
                fs::write(path, json)
                    .with_context(|| format!("Failed to write payload to {:?}", path))?;
                ui.success(&format!("Wrote payload to {}", path.display()));
            }
            None => ui.message(&json),
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EpicstampError;
    use crate::template::{StoryTemplate, StoryType, TaskTemplate, Template};
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Settings, String) {
        let temp = TempDir::new().unwrap();
        let settings = Settings {
            templates_dir: Some(temp.path().join("templates")),
            ..Default::default()
        };

        let mut template = Template::new("Launch");
        template.epic.name = "{{Feature}} launch".into();
        template.add_story(
            StoryTemplate::new("Build {{Feature}} UI for {{Team}}", StoryType::Feature)
                .with_task(TaskTemplate::new("Review {{Feature}}")),
        );
        let store = TemplateStore::new(settings.templates_dir());
        store.save(&mut template).unwrap();

        let id = template.id.as_str();
        (temp, settings, id)
    }

    fn args(id: &str, vars: &[&str], strict: bool) -> ApplyArgs {
        ApplyArgs {
            id: id.to_string(),
            vars: vars.iter().map(|s| s.to_string()).collect(),
            strict,
            output: None,
        }
    }

    fn payload(ui: &MockUI) -> serde_json::Value {
        serde_json::from_str(ui.messages().last().unwrap()).unwrap()
    }

    #[test]
    fn applies_all_variables() {
        let (_temp, settings, id) = setup();
        let mut ui = MockUI::new();

        let vars = ["Feature=Search", "Team=Core"];
        let cmd = ApplyCommand::new(&settings, args(&id, &vars, false));
        assert!(cmd.execute(&mut ui).unwrap().success);

        let json = payload(&ui);
        assert_eq!(json["name"], "Search launch");
        assert_eq!(json["stories"][0]["name"], "Build Search UI for Core");
        assert_eq!(json["stories"][0]["tasks"][0]["description"], "Review Search");
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn prompts_for_missing_variables() {
        let (_temp, settings, id) = setup();
        let mut ui = MockUI::new();
        ui.set_prompt_response("Team", "Platform");

        let cmd = ApplyCommand::new(&settings, args(&id, &["Feature=Search"], false));
        cmd.execute(&mut ui).unwrap();

        assert_eq!(ui.prompts_shown(), ["Team"]);
        assert_eq!(
            payload(&ui)["stories"][0]["name"],
            "Build Search UI for Platform"
        );
        assert!(ui.warnings().is_empty());
    }

    #[test]
    fn unanswered_variables_stay_literal() {
        let (_temp, settings, id) = setup();
        let mut ui = MockUI::new();

        let cmd = ApplyCommand::new(&settings, args(&id, &[], false));
        cmd.execute(&mut ui).unwrap();

        assert_eq!(payload(&ui)["name"], "{{Feature}} launch");
        assert!(ui.has_warning("Feature, Team"));
    }

    #[test]
    fn strict_fails_on_missing() {
        let (_temp, settings, id) = setup();
        let mut ui = MockUI::new();

        let cmd = ApplyCommand::new(&settings, args(&id, &["Feature=Search"], true));
        let err = cmd.execute(&mut ui).unwrap_err();

        match err {
            EpicstampError::MissingVariables { names } => assert_eq!(names, vec!["Team"]),
            other => panic!("unexpected error: {}", other),
        }
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn invalid_mapping_is_rejected() {
        let (_temp, settings, id) = setup();
        let mut ui = MockUI::new();

        let cmd = ApplyCommand::new(&settings, args(&id, &["Feature"], false));
        let err = cmd.execute(&mut ui).unwrap_err();
        assert!(matches!(err, EpicstampError::InvalidMapping { .. }));
    }

    #[test]
    fn writes_payload_to_file() {
        let (temp, settings, id) = setup();
        let out = temp.path().join("payload.json");
        let mut ui = MockUI::new();

        let mut apply_args = args(&id, &["Feature=Search", "Team=Core"], true);
        apply_args.output = Some(out.clone());
        ApplyCommand::new(&settings, apply_args)
            .execute(&mut ui)
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written["name"], "Search launch");
        assert!(ui.has_success("payload.json"));
    }
}
