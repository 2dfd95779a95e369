use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::core::variable_scope::ScopeMap;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// Substitute every `{name}` placeholder in a log-point template.
///
/// Unknown names are left as the literal placeholder text.
pub fn render_log_message(template: &str, variables: &ScopeMap) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => display_value(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Extract the placeholder names of a template, in order of appearance.
pub fn extract_placeholders(template: &str) -> Vec<String> {
    placeholder_regex()
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Render a value the way an operator expects to read it in a log line.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
