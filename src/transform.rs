use crate::ancestry::{Ancestry, ParentKind};
use crate::comment::CommentMap;
use crate::conditional::Conditional;
use crate::source::SourceFile;

/// A single source-level edit: replace byte range [start..end) with
/// `replacement`. A value description only; the host applies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Byte offset, inclusive.
    pub start: usize,
    /// Byte offset, exclusive.
    pub end: usize,
    pub replacement: String,
}

impl Rewrite {
    /// Apply the edit to source bytes, returning the new source.
    pub fn apply(&self, source: &[u8]) -> Vec<u8> {
        let mut result = Vec::with_capacity(source.len() + self.replacement.len());
        result.extend_from_slice(&source[..self.start]);
        result.extend_from_slice(self.replacement.as_bytes());
        result.extend_from_slice(&source[self.end..]);
        result
    }
}

/// Render the modifier form of a block conditional: `body keyword condition`,
/// parenthesized when the surrounding expression would otherwise capture the
/// modifier keyword, with a keyword-line trailing comment carried along.
pub fn modifier_source(
    source: &SourceFile,
    cond: &Conditional<'_>,
    body: &ruby_prism::Node<'_>,
    ancestry: &Ancestry,
    comments: &CommentMap,
) -> String {
    let mut text = format!(
        "{} {} {}",
        node_source(source, body),
        cond.keyword,
        node_source(source, &cond.predicate),
    );
    if needs_parens(ancestry.parent_kind(cond.span)) {
        text = format!("({text})");
    }
    let keyword_line = source.line_of(cond.keyword_offset);
    if let Some(comment) = comments.on_line(keyword_line) {
        text.push(' ');
        text.push_str(&comment.text);
    }
    text
}

/// Block-to-modifier rewrite over the statement's full span.
pub fn to_modifier(
    source: &SourceFile,
    cond: &Conditional<'_>,
    body: &ruby_prism::Node<'_>,
    ancestry: &Ancestry,
    comments: &CommentMap,
) -> Rewrite {
    Rewrite {
        start: cond.span.0,
        end: cond.span.1,
        replacement: modifier_source(source, cond, body, ancestry, comments),
    }
}

/// Modifier-to-block rewrite: keyword and condition on the first line, the
/// body indented two columns past the statement's column, and `end` back at
/// the statement's column. A trailing comment stays on the condition line,
/// which extends the replaced span through the comment.
pub fn to_block(
    source: &SourceFile,
    cond: &Conditional<'_>,
    body: &ruby_prism::Node<'_>,
    comments: &CommentMap,
) -> Rewrite {
    let (line, column) = source.offset_to_line_col(cond.span.0);
    let indent = " ".repeat(column);

    let mut first = format!("{} {}", cond.keyword, node_source(source, &cond.predicate));
    let mut end = cond.span.1;
    if let Some(comment) = comments.on_line(line) {
        if comment.start >= cond.span.1 {
            first.push(' ');
            first.push_str(&comment.text);
            end = comment.end;
        }
    }

    Rewrite {
        start: cond.span.0,
        end,
        replacement: format!(
            "{first}\n{indent}  {}\n{indent}end",
            node_source(source, body)
        ),
    }
}

fn needs_parens(kind: ParentKind) -> bool {
    matches!(
        kind,
        ParentKind::Assignment | ParentKind::KeywordBoolean | ParentKind::UnparenthesizedCall
    )
}

fn node_source(source: &SourceFile, node: &ruby_prism::Node<'_>) -> String {
    let loc = node.location();
    String::from_utf8_lossy(&source.as_bytes()[loc.start_offset()..loc.end_offset()]).into_owned()
}
