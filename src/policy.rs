use regex::Regex;

use crate::ancestry::Span;
use crate::comment::CommentMap;
use crate::config::LineLengthConfig;
use crate::directives::DisabledRanges;
use crate::source::{display_width, display_width_bytes, SourceFile};

/// The rule name the per-line enablement directives are keyed by.
pub const LINE_LENGTH_RULE: &str = "Layout/LineLength";

/// Line-length policy for modifier-form conditionals: decides whether the
/// statement's single rendered line violates the configured limit after all
/// exception rules are applied.
pub struct LengthPolicy<'a> {
    pub source: &'a SourceFile,
    pub config: &'a LineLengthConfig,
    pub comments: &'a CommentMap,
    pub disabled: &'a DisabledRanges,
}

impl LengthPolicy<'_> {
    /// The short-circuit decision tree, in order: no configured maximum,
    /// multi-line statement, locally disabled line, line within the limit,
    /// ignored pattern, directive-comment discount (final either way), and
    /// the URI tolerance. Only when all of those fall through is the line
    /// too long.
    pub fn too_long(&self, span: Span) -> bool {
        let Some(max) = self.config.max_length else {
            return false;
        };
        let line_number = self.source.line_of(span.0);
        if self.source.line_of(span.1.saturating_sub(1)) != line_number {
            return false;
        }
        if self.disabled.is_disabled(LINE_LENGTH_RULE, line_number) {
            return false;
        }
        // Width is measured from the raw bytes so an undecodable line is
        // still subject to the limit; the text-based exceptions below see
        // an empty string for such lines and fall through.
        if display_width_bytes(self.source.line(line_number), self.config.tab_width) <= max {
            return false;
        }
        let line = self.source.line_str(line_number);
        if matches_ignored_pattern(line, &self.config.ignored_patterns) {
            return false;
        }
        if self.config.ignore_directive_comments {
            if let Some(comment) = self.comments.on_line(line_number) {
                if comment.is_directive() {
                    let byte_column = comment.start - self.source.line_start(line_number);
                    let without_directive = line[..byte_column.min(line.len())].trim_end();
                    return display_width(without_directive, self.config.tab_width) > max;
                }
            }
        }
        if self.config.allow_uri && uri_extends_to_end(line, &self.config.uri_schemes, max) {
            return false;
        }
        true
    }
}

pub fn matches_ignored_pattern(line: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|re| re.is_match(line))
}

/// Whether the last URI on the line, extended to the next word boundary
/// (and through a trailing YARD `{...}` brace), starts before `max` and
/// reaches the end of the line. Such lines are only long because of the
/// URI and are tolerated.
fn uri_extends_to_end(line: &str, schemes: &[String], max: usize) -> bool {
    let mut last_start = None;
    for scheme in schemes {
        let prefix = format!("{scheme}://");
        let mut search_from = 0;
        while let Some(pos) = line[search_from..].find(&prefix) {
            let abs_pos = search_from + pos;
            last_start = match last_start {
                Some(prev) if prev > abs_pos => Some(prev),
                _ => Some(abs_pos),
            };
            search_from = abs_pos + prefix.len();
        }
    }
    let Some(start) = last_start else {
        return false;
    };

    let mut end_pos = start
        + line[start..]
            .find(|c: char| c.is_whitespace())
            .unwrap_or(line.len() - start);

    // YARD brace extension: a line shaped `... {https://...} ` counts the
    // closing brace as part of the URI token.
    if line.contains('{') && line.ends_with('}') {
        if let Some(brace_pos) = line[end_pos..].rfind('}') {
            end_pos += brace_pos + 1;
        }
    }

    // Extend through the rest of the word the URI sits in.
    let rest = &line[end_pos..];
    end_pos += rest.find(|c: char| c.is_whitespace()).unwrap_or(rest.len());

    let start_chars = line[..start].chars().count();
    start_chars < max && end_pos >= line.len()
}
