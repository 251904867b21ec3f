use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::source::SourceFile;

/// Matches `# rubocop:disable Foo/Bar` style directive comments, including
/// the `rblint` alias and the `todo` action.
pub(crate) static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#\s*(?:rubocop|rblint)\s*:\s*(disable|enable|todo)\s+(.+)").unwrap()
});

/// A comment token copied out of the parse result.
#[derive(Debug, Clone)]
pub struct Comment {
    /// Byte offset of the `#`, inclusive.
    pub start: usize,
    /// Byte offset one past the comment text.
    pub end: usize,
    /// 1-indexed line the comment is anchored to.
    pub line: usize,
    pub text: String,
}

impl Comment {
    pub fn is_directive(&self) -> bool {
        DIRECTIVE_RE.is_match(&self.text)
    }
}

/// Line-number keyed comment lookup. Ruby allows at most one comment token
/// per line, so a flat map suffices.
#[derive(Debug, Default)]
pub struct CommentMap {
    by_line: HashMap<usize, Comment>,
}

impl CommentMap {
    pub fn build(source: &SourceFile, parse_result: &ruby_prism::ParseResult<'_>) -> Self {
        let mut by_line = HashMap::new();
        for comment in parse_result.comments() {
            let loc = comment.location();
            let text = String::from_utf8_lossy(
                &source.as_bytes()[loc.start_offset()..loc.end_offset()],
            )
            .trim_end()
            .to_string();
            let line = source.line_of(loc.start_offset());
            by_line.insert(
                line,
                Comment {
                    start: loc.start_offset(),
                    end: loc.end_offset(),
                    line,
                    text,
                },
            );
        }
        Self { by_line }
    }

    pub fn on_line(&self, line: usize) -> Option<&Comment> {
        self.by_line.get(&line)
    }

    /// Comments in ascending line order, for range-based directive tracking.
    pub fn in_line_order(&self) -> Vec<&Comment> {
        let mut comments: Vec<&Comment> = self.by_line.values().collect();
        comments.sort_by_key(|c| c.line);
        comments
    }
}
