//! Epic templates.
//!
//! - [`schema`] - Template, epic, story and task types
//! - [`id`] - Template id generation
//! - [`variables`] - `{{name}}` extraction and substitution
//! - [`edit`] - In-place editing that keeps variables in sync
//! - [`apply`] - Instantiation into API payloads
//! - [`store`] - JSON file storage and YAML import

pub mod apply;
pub mod edit;
pub mod id;
pub mod schema;
pub mod store;
pub mod variables;

pub use apply::{instantiate, instantiate_strict, EpicPayload, StoryPayload, TaskPayload};
pub use id::TemplateId;
pub use schema::{EpicDetails, StoryTemplate, StoryType, TaskTemplate, Template};
pub use store::TemplateStore;
pub use variables::{
    extract_variables, has_placeholders, missing_variables, recompute_template_variables,
    replace_variables, VariableMapping,
};

/// Get the default template directory.
pub fn default_templates_dir() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("epicstamp")
        .join("templates")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_templates_dir_valid() {
        assert!(default_templates_dir().ends_with("templates"));
    }
}
