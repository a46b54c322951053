//! Non-interactive UI for pipes, scripts and CI.

use std::collections::HashMap;

use crate::error::{EpicstampError, Result};

use super::{parse_bool_answer, OutputMode, Prompt, PromptResult, PromptType, UserInterface};

/// Environment prefix for answering prompts without a terminal.
///
/// `EPICSTAMP_PROMPT_FEATURE=Search` answers the prompt keyed `Feature`.
pub const PROMPT_ENV_PREFIX: &str = "EPICSTAMP_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts resolve from `EPICSTAMP_PROMPT_*` variables, then the prompt
/// default, and fail otherwise.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }

    fn env_key(prompt_key: &str) -> String {
        let normalized: String = prompt_key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}{}", PROMPT_ENV_PREFIX, normalized)
    }
}

fn to_result(prompt_type: &PromptType, value: &str) -> PromptResult {
    match prompt_type {
        PromptType::Confirm => PromptResult::Bool(parse_bool_answer(value)),
        PromptType::Input => PromptResult::String(value.to_string()),
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_results() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        if let Some(value) = self.env_overrides.get(&Self::env_key(&prompt.key)) {
            return Ok(to_result(&prompt.prompt_type, value));
        }

        if let Some(default) = &prompt.default {
            return Ok(to_result(&prompt.prompt_type, default));
        }

        Err(EpicstampError::Other(anyhow::anyhow!(
            "Cannot prompt for '{}' in non-interactive mode (no default value)",
            prompt.key
        )))
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
