use std::collections::HashMap;

use crate::comment::{CommentMap, DIRECTIVE_RE};
use crate::source::SourceFile;

/// Tracks line ranges where rules are disabled via inline directive comments.
///
/// Supports `# rubocop:disable`, `# rubocop:enable`, `# rubocop:todo`, and
/// the `# rblint:` equivalents. An inline directive (code before the `#`)
/// covers only its own line; a standalone one opens a range closed by a
/// matching `enable` or end of file.
#[derive(Debug, Default)]
pub struct DisabledRanges {
    /// Rule name (e.g. "Layout/LineLength"), department (e.g. "Layout"), or
    /// "all", mapped to inclusive 1-indexed line ranges.
    ranges: HashMap<String, Vec<(usize, usize)>>,
}

impl DisabledRanges {
    pub fn build(source: &SourceFile, comments: &CommentMap) -> Self {
        let mut ranges: HashMap<String, Vec<(usize, usize)>> = HashMap::new();
        let mut open_disables: HashMap<String, usize> = HashMap::new();

        for comment in comments.in_line_order() {
            let Some(caps) = DIRECTIVE_RE.captures(&comment.text) else {
                continue;
            };
            let action = &caps[1];
            // Strip a `-- reason` trailer before splitting names.
            let name_list = match caps[2].find("--") {
                Some(idx) => &caps[2][..idx],
                None => &caps[2],
            };
            let names = name_list
                .split(',')
                .map(|s| s.trim())
                .map(|s| s.split(' ').next().unwrap_or(s))
                .filter(|s| !s.is_empty());

            let line_prefix = &source.line(comment.line)[..byte_column(source, comment)];
            let is_inline = line_prefix.iter().any(|b| !b.is_ascii_whitespace());

            match action {
                "disable" | "todo" => {
                    for name in names {
                        if is_inline {
                            ranges
                                .entry(name.to_string())
                                .or_default()
                                .push((comment.line, comment.line));
                        } else {
                            open_disables.entry(name.to_string()).or_insert(comment.line);
                        }
                    }
                }
                "enable" => {
                    for name in names {
                        // Orphaned enables without a prior disable are ignored.
                        if let Some(start) = open_disables.remove(name) {
                            ranges
                                .entry(name.to_string())
                                .or_default()
                                .push((start, comment.line));
                        }
                    }
                }
                _ => {}
            }
        }

        // Unterminated disables run to end of file.
        for (name, start) in open_disables {
            ranges.entry(name).or_default().push((start, usize::MAX));
        }

        Self { ranges }
    }

    /// Whether `rule_name` is disabled at `line`, checking the exact name,
    /// its department prefix, and "all".
    pub fn is_disabled(&self, rule_name: &str, line: usize) -> bool {
        if self.check_ranges(rule_name, line) {
            return true;
        }
        if let Some(dept) = rule_name.split('/').next() {
            if dept != rule_name && self.check_ranges(dept, line) {
                return true;
            }
        }
        self.check_ranges("all", line)
    }

    fn check_ranges(&self, key: &str, line: usize) -> bool {
        self.ranges
            .get(key)
            .is_some_and(|ranges| ranges.iter().any(|&(s, e)| line >= s && line <= e))
    }
}

/// Byte offset of the comment within its line. Columns are character counts,
/// so recompute from the comment's absolute start offset.
fn byte_column(source: &SourceFile, comment: &crate::comment::Comment) -> usize {
    comment.start - source.line_start(comment.line)
}
