use anyhow::{bail, Context, Result};

use crate::ancestry::Ancestry;
use crate::comment::CommentMap;
use crate::conditional::{self, Conditional, Form};
use crate::config::LineLengthConfig;
use crate::diagnostic::{favor_modifier_message, line_too_long_message, Diagnostic, Location};
use crate::directives::DisabledRanges;
use crate::policy::LengthPolicy;
use crate::source::{display_width, SourceFile};
use crate::transform::{self, Rewrite};

/// The decision-and-rewrite engine for a single parsed file.
///
/// Construction gathers the read-only lookups (comments, per-line
/// enablement, parent/sibling index) in one pass; after that every
/// `evaluate`/`rewrite` call is an independent pure function of one
/// conditional node, so calls may be issued in any order.
pub struct Engine<'a> {
    source: &'a SourceFile,
    config: LineLengthConfig,
    comments: CommentMap,
    disabled: DisabledRanges,
    ancestry: Ancestry,
}

impl<'a> Engine<'a> {
    pub fn new(
        source: &'a SourceFile,
        parse_result: &ruby_prism::ParseResult<'_>,
        config: LineLengthConfig,
    ) -> Self {
        let comments = CommentMap::build(source, parse_result);
        let disabled = DisabledRanges::build(source, &comments);
        let ancestry = Ancestry::build(source, parse_result);
        Self {
            source,
            config,
            comments,
            disabled,
            ancestry,
        }
    }

    /// Judge one conditional node. Non-conditional nodes, ineligible
    /// statements, and statements within limits all produce `None`.
    pub fn evaluate(&self, node: &ruby_prism::Node<'_>) -> Option<Diagnostic> {
        let cond = Conditional::from_node(node)?;
        if !conditional::eligible(&cond, self.source, &self.config) {
            return None;
        }
        match cond.form {
            Form::Block => self.check_block(&cond),
            Form::Modifier => self.check_modifier(&cond),
            Form::Ternary | Form::ElsifArm => None,
        }
    }

    /// Render the rewrite for a node `evaluate` produced a diagnostic for.
    /// Calling this for a non-conditional or ineligible node is a caller
    /// contract violation and errors out.
    pub fn rewrite(&self, node: &ruby_prism::Node<'_>) -> Result<Rewrite> {
        let cond = Conditional::from_node(node).context("node is not an if/unless statement")?;
        if !conditional::eligible(&cond, self.source, &self.config) {
            bail!("statement is not eligible for form conversion");
        }
        match cond.form {
            Form::Block => {
                let Some(body) = cond.body.as_ref() else {
                    bail!("block conditional has no single-statement body to collapse");
                };
                if self.has_interior_comment(&cond) {
                    bail!("comments inside the statement would be lost by collapsing");
                }
                Ok(transform::to_modifier(
                    self.source,
                    &cond,
                    body,
                    &self.ancestry,
                    &self.comments,
                ))
            }
            Form::Modifier => {
                let Some(body) = cond.body.as_ref() else {
                    bail!("modifier conditional has no body");
                };
                Ok(transform::to_block(self.source, &cond, body, &self.comments))
            }
            Form::Ternary | Form::ElsifArm => {
                bail!("only plain block or modifier conditionals can be rewritten")
            }
        }
    }

    fn check_block(&self, cond: &Conditional<'_>) -> Option<Diagnostic> {
        let body = cond.body.as_ref()?;
        if conditional::binds_locals(&cond.predicate) {
            return None;
        }
        if self.has_interior_comment(cond) {
            return None;
        }
        if !self.modifier_fits_on_line(cond, body) {
            return None;
        }
        Some(self.diagnostic(cond, favor_modifier_message(cond.keyword)))
    }

    /// A comment anywhere in the statement other than the keyword line has
    /// nowhere to go in the one-line rendering, so the block form stays.
    fn has_interior_comment(&self, cond: &Conditional<'_>) -> bool {
        let first = self.source.line_of(cond.span.0);
        let last = self.source.line_of(cond.span.1.saturating_sub(1));
        let keyword_line = self.source.line_of(cond.keyword_offset);
        (first..=last).any(|line| {
            line != keyword_line
                && self
                    .comments
                    .on_line(line)
                    .is_some_and(|comment| comment.start < cond.span.1)
        })
    }

    fn check_modifier(&self, cond: &Conditional<'_>) -> Option<Diagnostic> {
        // When another statement shares the line, the length belongs to that
        // sibling, not to this statement.
        let last_line = self.source.line_of(cond.span.1.saturating_sub(1));
        if self.ancestry.follower_line(cond.span) == Some(last_line) {
            return None;
        }
        let policy = LengthPolicy {
            source: self.source,
            config: &self.config,
            comments: &self.comments,
            disabled: &self.disabled,
        };
        if policy.too_long(cond.span) {
            Some(self.diagnostic(cond, line_too_long_message(cond.keyword)))
        } else {
            None
        }
    }

    /// Would the modifier rendering fit on one line, including whatever
    /// already precedes the keyword on its line? Shares the transformer's
    /// rendering so the fit decision and the rewrite can never disagree.
    fn modifier_fits_on_line(&self, cond: &Conditional<'_>, body: &ruby_prism::Node<'_>) -> bool {
        let Some(max) = self.config.max_length else {
            return true;
        };
        let keyword_line = self.source.line_of(cond.keyword_offset);
        let prefix_bytes = cond.keyword_offset - self.source.line_start(keyword_line);
        let line = self.source.line_str(keyword_line);
        let prefix = line.get(..prefix_bytes).unwrap_or(line);
        let rendered =
            transform::modifier_source(self.source, cond, body, &self.ancestry, &self.comments);
        let prefix_width = display_width(prefix, self.config.tab_width);
        prefix_width + display_width(&rendered, self.config.tab_width) <= max
    }

    fn diagnostic(&self, cond: &Conditional<'_>, message: String) -> Diagnostic {
        let (line, column) = self.source.offset_to_line_col(cond.keyword_offset);
        Diagnostic {
            location: Location { line, column },
            message,
        }
    }
}
