use std::collections::HashMap;

use regex::Regex;

/// Line-length policy configuration, keyed off RuboCop's `Layout/LineLength`
/// option names when built from an options map.
///
/// Everything degrades gracefully when absent: no `Max` disables the length
/// check, an empty pattern list matches nothing, and the directive/URI
/// exceptions are simply off when their flags are false.
#[derive(Debug, Clone)]
pub struct LineLengthConfig {
    /// Maximum rendered line width. `None` disables the length check.
    pub max_length: Option<usize>,
    /// Columns a tab advances to (next multiple).
    pub tab_width: usize,
    /// Lines matching any of these are exempt from the length check.
    pub ignored_patterns: Vec<Regex>,
    /// Discount a trailing directive comment when measuring the line.
    pub ignore_directive_comments: bool,
    /// Tolerate overlong lines ending in a URI that starts before the limit.
    pub allow_uri: bool,
    pub uri_schemes: Vec<String>,
}

impl Default for LineLengthConfig {
    fn default() -> Self {
        Self {
            max_length: Some(120),
            tab_width: 2,
            ignored_patterns: Vec::new(),
            ignore_directive_comments: true,
            allow_uri: true,
            uri_schemes: vec!["http".into(), "https".into()],
        }
    }
}

impl LineLengthConfig {
    /// Build from a raw options map as found in `.rubocop.yml` under
    /// `Layout/LineLength`. An absent `Max` leaves the length check disabled;
    /// hosts wanting the stock limit use `Default` and override fields.
    pub fn from_options(options: &HashMap<String, serde_yml::Value>) -> Self {
        let defaults = Self::default();
        Self {
            max_length: get_usize(options, "Max"),
            tab_width: get_usize(options, "IndentationWidth").unwrap_or(defaults.tab_width),
            ignored_patterns: get_string_array(options, "AllowedPatterns")
                .unwrap_or_default()
                .iter()
                .filter_map(|p| Regex::new(&normalize_ruby_regex(p)).ok())
                .collect(),
            ignore_directive_comments: get_bool(options, "AllowCopDirectives")
                .unwrap_or(defaults.ignore_directive_comments),
            allow_uri: get_bool(options, "AllowURI").unwrap_or(defaults.allow_uri),
            uri_schemes: get_string_array(options, "URISchemes").unwrap_or(defaults.uri_schemes),
        }
    }
}

fn get_usize(options: &HashMap<String, serde_yml::Value>, key: &str) -> Option<usize> {
    options.get(key)?.as_u64().map(|v| v as usize)
}

fn get_bool(options: &HashMap<String, serde_yml::Value>, key: &str) -> Option<bool> {
    options.get(key)?.as_bool()
}

fn get_string_array(
    options: &HashMap<String, serde_yml::Value>,
    key: &str,
) -> Option<Vec<String>> {
    let seq = options.get(key)?.as_sequence()?;
    Some(
        seq.iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
    )
}

/// Normalize a Ruby regex pattern string for the `regex` crate: strip `/`
/// delimiters (and trailing flags) and convert Ruby anchors.
fn normalize_ruby_regex(pattern: &str) -> String {
    let mut s = pattern.trim().to_string();

    if s.starts_with('/') {
        s.remove(0);
        if let Some(last_slash) = s.rfind('/') {
            s.truncate(last_slash);
        }
    }

    s.replace("\\A", "^").replace("\\z", "$").replace("\\Z", "$")
}
