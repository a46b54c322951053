//! Placeholder extraction and substitution.
//!
//! Template text may contain `{{name}}` placeholders. Any characters other
//! than a newline are allowed between the braces, so `{{Team Name}}` and
//! `{{due-date?}}` are both valid names.
//!
//! # Example
//!
//! ```
//! use epicstamp::template::{extract_variables, replace_variables, VariableMapping};
//!
//! let text = "Ship {{Feature}} for {{Team}}";
//! assert_eq!(extract_variables(text), vec!["Feature", "Team"]);
//!
//! let mut mapping = VariableMapping::new();
//! mapping.insert("Feature", "search");
//! assert_eq!(replace_variables(text, &mapping), "Ship search for {{Team}}");
//! ```

use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use crate::error::{EpicstampError, Result};

use super::schema::Template;

/// Lazy match between double braces. `{{a{{b}}` captures `a{{b`.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").unwrap());

/// Values for template variables, supplied when a template is applied.
///
/// Keys are iterated in sorted order, which fixes the substitution order
/// when one value itself contains a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableMapping {
    values: BTreeMap<String, String>,
}

impl VariableMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value for a variable, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Value for a variable, if mapped.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Whether a variable has a value.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(name, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse `KEY=VALUE` arguments. The value may contain further `=`.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mapping = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| EpicstampError::InvalidMapping {
                    input: pair.to_string(),
                })?;
            if name.is_empty() {
                return Err(EpicstampError::InvalidMapping {
                    input: pair.to_string(),
                });
            }
            mapping.insert(name, value);
        }
        Ok(mapping)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableMapping {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut mapping = Self::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

/// Extract placeholder names from text.
///
/// Returns unique names in order of first occurrence.
pub fn extract_variables(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    push_unique(&mut names, &mut HashSet::new(), text);
    names
}

fn push_unique(names: &mut Vec<String>, seen: &mut HashSet<String>, text: &str) {
    for caps in PLACEHOLDER.captures_iter(text) {
        let name = &caps[1];
        if seen.insert(name.to_string()) {
            names.push(name.to_string());
        }
    }
}

/// Check if text contains any placeholder.
pub fn has_placeholders(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

/// Derive the variable list for a template.
///
/// Scans epic name + description, then each story's name + description,
/// and unions the results in first-seen order.
pub fn recompute_template_variables(template: &Template) -> Vec<String> {
    let mut names = Vec::new();
    let mut seen = HashSet::new();

    let epic_text = format!("{}{}", template.epic.name, template.epic.description);
    push_unique(&mut names, &mut seen, &epic_text);

    for story in &template.stories {
        let story_text = format!("{}{}", story.name, story.description);
        push_unique(&mut names, &mut seen, &story_text);
    }

    names
}

/// Substitute mapped values into text.
///
/// Every literal `{{key}}` is replaced for each key in the mapping.
/// Placeholders without a mapping entry are left untouched.
pub fn replace_variables(text: &str, mapping: &VariableMapping) -> String {
    let mut result = text.to_string();
    for (name, value) in mapping.iter() {
        let placeholder = format!("{{{{{}}}}}", name);
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, value);
        }
    }
    result
}

/// Declared variables of a template with no value in the mapping.
pub fn missing_variables(template: &Template, mapping: &VariableMapping) -> Vec<String> {
    template
        .variables
        .iter()
        .filter(|name| !mapping.contains(name))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::schema::{StoryTemplate, StoryType};

    fn mapping(pairs: &[(&str, &str)]) -> VariableMapping {
        pairs.iter().copied().collect()
    }

    #[test]
    fn extract_from_plain_text_is_empty() {
        assert!(extract_variables("no variables here").is_empty());
        assert!(extract_variables("").is_empty());
    }

    #[test]
    fn extract_dedupes_in_first_occurrence_order() {
        assert_eq!(extract_variables("{{b}}{{a}}{{b}}"), vec!["b", "a"]);
    }

    #[test]
    fn extract_allows_spaces_and_punctuation() {
        assert_eq!(
            extract_variables("Owner: {{Team Name}} by {{due-date?}}"),
            vec!["Team Name", "due-date?"]
        );
    }

    #[test]
    fn extract_ignores_single_braces() {
        assert!(extract_variables("{a} {b}} {{c}").is_empty());
    }

    #[test]
    fn extract_nested_braces_follow_lazy_match() {
        assert_eq!(extract_variables("{{a{{b}}"), vec!["a{{b"]);
    }

    #[test]
    fn extract_empty_name() {
        assert_eq!(extract_variables("{{}}"), vec![""]);
    }

    #[test]
    fn extract_does_not_span_lines() {
        assert!(extract_variables("{{first\nsecond}}").is_empty());
    }

    #[test]
    fn has_placeholders_detects_tokens() {
        assert!(has_placeholders("Hello {{name}}"));
        assert!(!has_placeholders("Hello {name}"));
    }

    #[test]
    fn recompute_dedupes_across_epic_and_stories() {
        let mut template = Template::new("t");
        template.epic.name = "{{Feature}} epic".into();
        template
            .stories
            .push(StoryTemplate::new("Build {{Feature}} UI", StoryType::Feature));

        assert_eq!(recompute_template_variables(&template), vec!["Feature"]);
    }

    #[test]
    fn recompute_orders_epic_before_stories() {
        let mut template = Template::new("t");
        template.stories.push(
            StoryTemplate::new("{{B}}", StoryType::Bug).with_description("{{C}} and {{A}}"),
        );
        template.epic.description = "for {{A}}".into();

        assert_eq!(recompute_template_variables(&template), vec!["A", "B", "C"]);
    }

    #[test]
    fn recompute_ignores_tasks() {
        let mut template = Template::new("t");
        template.stories.push(
            StoryTemplate::new("story", StoryType::Chore)
                .with_task(crate::template::TaskTemplate::new("{{TaskOnly}}")),
        );
        assert!(recompute_template_variables(&template).is_empty());
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut template = Template::new("t");
        template.epic.name = "{{X}} {{Y}}".into();
        let first = recompute_template_variables(&template);
        template.refresh_variables();
        assert_eq!(recompute_template_variables(&template), first);
    }

    #[test]
    fn replace_leaves_unmapped_placeholders() {
        let result = replace_variables("Hi {{X}} and {{Y}}", &mapping(&[("X", "Bob")]));
        assert_eq!(result, "Hi Bob and {{Y}}");
    }

    #[test]
    fn replace_without_matching_keys_is_identity() {
        let text = "Plain {{Other}} text";
        assert_eq!(replace_variables(text, &mapping(&[("X", "1")])), text);
    }

    #[test]
    fn replace_every_occurrence() {
        let result = replace_variables("{{X}}-{{X}}", &mapping(&[("X", "ab")]));
        assert_eq!(result, "ab-ab");
    }

    #[test]
    fn replace_treats_key_literally() {
        let result = replace_variables("{{a.b*}} {{aXb}}", &mapping(&[("a.b*", "ok")]));
        assert_eq!(result, "ok {{aXb}}");
    }

    #[test]
    fn missing_variables_preserves_declared_order() {
        let mut template = Template::new("t");
        template.variables = vec!["B".into(), "A".into(), "C".into()];

        let missing = missing_variables(&template, &mapping(&[("A", "1")]));
        assert_eq!(missing, vec!["B", "C"]);
    }

    #[test]
    fn mapping_from_pairs() {
        let parsed = VariableMapping::from_pairs(["Feature=search", "Query=a=b"]).unwrap();
        assert_eq!(parsed.get("Feature"), Some("search"));
        assert_eq!(parsed.get("Query"), Some("a=b"));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn mapping_from_pairs_rejects_missing_equals() {
        let result = VariableMapping::from_pairs(["Feature"]);
        assert!(matches!(
            result,
            Err(EpicstampError::InvalidMapping { .. })
        ));
    }

    #[test]
    fn mapping_from_pairs_rejects_empty_name() {
        assert!(VariableMapping::from_pairs(["=value"]).is_err());
    }

    #[test]
    fn mapping_allows_empty_value() {
        let parsed = VariableMapping::from_pairs(["X="]).unwrap();
        assert_eq!(parsed.get("X"), Some(""));
    }
}
