//! epicstamp - Epic templates with `{{variable}}` placeholders.
//!
//! Templates describe an epic with its stories and tasks. Free text may
//! contain `{{name}}` placeholders that are filled in when the template is
//! applied. An expiring cache keeps responses from the tracker API that
//! templates link to (workflows, members, iterations).
//!
//! # Modules
//!
//! - [`cache`] - Expiring key-value cache with TTL classes and persistence
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Settings loading and validation
//! - [`error`] - Error types and result aliases
//! - [`template`] - Template model, variable engine, storage and apply
//! - [`ui`] - Prompts and terminal output
//!
//! # Example
//!
//! ```
//! use epicstamp::template::{instantiate, StoryTemplate, StoryType, Template, VariableMapping};
//!
//! let mut template = Template::new("Launch");
//! template.epic.name = "{{Feature}} launch".to_string();
//! template.add_story(StoryTemplate::new("Build {{Feature}} UI", StoryType::Feature));
//! assert_eq!(template.variables, vec!["Feature"]);
//!
//! let mapping: VariableMapping = [("Feature", "Search")].into_iter().collect();
//! let payload = instantiate(&template, &mapping);
//! assert_eq!(payload.name, "Search launch");
//! assert_eq!(payload.stories[0].name, "Build Search UI");
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod template;
pub mod ui;

pub use error::{EpicstampError, Result};
