use ruby_prism::Visit;

use crate::ancestry::Span;
use crate::config::LineLengthConfig;
use crate::policy::matches_ignored_pattern;
use crate::source::SourceFile;

/// Shape of a conditional as written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// `if cond` / body / `end`.
    Block,
    /// `body if cond` on one line.
    Modifier,
    /// `cond ? a : b`.
    Ternary,
    /// This node is itself the `elsif` arm of an enclosing conditional.
    ElsifArm,
}

/// Read-only view over a prism `if`/`unless` node, classified by form.
pub struct Conditional<'pr> {
    pub keyword: &'static str,
    pub form: Form,
    /// An `elsif` or `else` continuation hangs off this node.
    pub chained: bool,
    pub keyword_offset: usize,
    pub predicate: ruby_prism::Node<'pr>,
    /// The single body statement, when the body is exactly one statement.
    pub body: Option<ruby_prism::Node<'pr>>,
    pub span: Span,
}

impl<'pr> Conditional<'pr> {
    /// Classify a node. Returns `None` for anything that is not an
    /// `if`/`unless` conditional.
    pub fn from_node(node: &ruby_prism::Node<'pr>) -> Option<Self> {
        let loc = node.location();
        let span = (loc.start_offset(), loc.end_offset());

        if let Some(if_node) = node.as_if_node() {
            let Some(keyword_loc) = if_node.if_keyword_loc() else {
                return Some(Self {
                    keyword: "if",
                    form: Form::Ternary,
                    chained: false,
                    keyword_offset: span.0,
                    predicate: if_node.predicate(),
                    body: None,
                    span,
                });
            };
            let form = if keyword_loc.as_slice() == b"elsif" {
                Form::ElsifArm
            } else if if_node.end_keyword_loc().is_none() {
                Form::Modifier
            } else {
                Form::Block
            };
            return Some(Self {
                keyword: "if",
                form,
                chained: if_node.subsequent().is_some(),
                keyword_offset: keyword_loc.start_offset(),
                predicate: if_node.predicate(),
                body: single_statement(if_node.statements()),
                span,
            });
        }

        if let Some(unless_node) = node.as_unless_node() {
            let keyword_loc = unless_node.keyword_loc();
            let form = if unless_node.end_keyword_loc().is_none() {
                Form::Modifier
            } else {
                Form::Block
            };
            return Some(Self {
                keyword: "unless",
                form,
                chained: unless_node.else_clause().is_some(),
                keyword_offset: keyword_loc.start_offset(),
                predicate: unless_node.predicate(),
                body: single_statement(unless_node.statements()),
                span,
            });
        }

        None
    }
}

fn single_statement<'pr>(
    statements: Option<ruby_prism::StatementsNode<'pr>>,
) -> Option<ruby_prism::Node<'pr>> {
    let statements = statements?;
    let body = statements.body();
    if body.len() == 1 {
        body.iter().next()
    } else {
        None
    }
}

/// Eligibility classification. Ternaries, `elsif`/`else` arms, chained
/// conditionals, bodies containing another conditional, and statements on an
/// ignored-pattern line are excluded from all further analysis.
pub fn eligible(
    cond: &Conditional<'_>,
    source: &SourceFile,
    config: &LineLengthConfig,
) -> bool {
    if !matches!(cond.form, Form::Block | Form::Modifier) || cond.chained {
        return false;
    }
    if let Some(body) = &cond.body {
        if contains_conditional(body) {
            return false;
        }
    }
    let line = source.line_str(source.line_of(cond.span.0));
    !matches_ignored_pattern(line, &config.ignored_patterns)
}

/// Whether the subtree contains (or is) an `if`/`unless` in any form.
pub fn contains_conditional(node: &ruby_prism::Node<'_>) -> bool {
    let mut finder = ConditionalFinder { found: false };
    finder.visit(node);
    finder.found
}

struct ConditionalFinder {
    found: bool,
}

impl<'pr> Visit<'pr> for ConditionalFinder {
    fn visit_if_node(&mut self, _node: &ruby_prism::IfNode<'pr>) {
        self.found = true;
    }

    fn visit_unless_node(&mut self, _node: &ruby_prism::UnlessNode<'pr>) {
        self.found = true;
    }
}

/// Whether the condition introduces local variables as a side effect of
/// evaluation: an inline assignment or a regexp named-capture match. Those
/// bindings must stay visible to the code after the statement, so such
/// conditionals are never steered toward modifier form.
pub fn binds_locals(node: &ruby_prism::Node<'_>) -> bool {
    let mut finder = BindingFinder { found: false };
    finder.visit(node);
    finder.found
}

struct BindingFinder {
    found: bool,
}

impl<'pr> Visit<'pr> for BindingFinder {
    fn visit_local_variable_write_node(
        &mut self,
        _node: &ruby_prism::LocalVariableWriteNode<'pr>,
    ) {
        self.found = true;
    }

    fn visit_match_write_node(&mut self, _node: &ruby_prism::MatchWriteNode<'pr>) {
        self.found = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::all_conditionals;

    fn first(src: &str) -> (&'static str, Form, bool) {
        let parse_result = ruby_prism::parse(src.as_bytes());
        let nodes = all_conditionals(&parse_result);
        let cond = Conditional::from_node(&nodes[0]).unwrap();
        (cond.keyword, cond.form, cond.chained)
    }

    #[test]
    fn classifies_modifier_if() {
        assert_eq!(first("foo if bar\n"), ("if", Form::Modifier, false));
    }

    #[test]
    fn classifies_modifier_unless() {
        assert_eq!(first("foo unless bar\n"), ("unless", Form::Modifier, false));
    }

    #[test]
    fn classifies_block_forms() {
        assert_eq!(first("if bar\n  foo\nend\n"), ("if", Form::Block, false));
        assert_eq!(
            first("unless bar\n  foo\nend\n"),
            ("unless", Form::Block, false)
        );
    }

    #[test]
    fn classifies_ternary() {
        assert_eq!(first("x ? 1 : 2\n"), ("if", Form::Ternary, false));
    }

    #[test]
    fn else_marks_chained() {
        assert_eq!(first("if a\n  x\nelse\n  y\nend\n"), ("if", Form::Block, true));
        assert_eq!(
            first("unless a\n  x\nelse\n  y\nend\n"),
            ("unless", Form::Block, true)
        );
    }

    #[test]
    fn elsif_arm_is_classified() {
        let src = "if a\n  x\nelsif b\n  y\nend\n";
        let parse_result = ruby_prism::parse(src.as_bytes());
        let nodes = all_conditionals(&parse_result);
        let outer = Conditional::from_node(&nodes[0]).unwrap();
        assert_eq!(outer.form, Form::Block);
        assert!(outer.chained);
        let arm = Conditional::from_node(&nodes[1]).unwrap();
        assert_eq!(arm.form, Form::ElsifArm);
    }

    #[test]
    fn keyword_offset_points_at_keyword() {
        let src = "x = if bar\n  foo\nend\n";
        let parse_result = ruby_prism::parse(src.as_bytes());
        let nodes = all_conditionals(&parse_result);
        let cond = Conditional::from_node(&nodes[0]).unwrap();
        assert_eq!(cond.keyword_offset, 4);
    }

    #[test]
    fn multi_statement_body_has_no_single_body() {
        let src = "if bar\n  foo\n  baz\nend\n";
        let parse_result = ruby_prism::parse(src.as_bytes());
        let nodes = all_conditionals(&parse_result);
        let cond = Conditional::from_node(&nodes[0]).unwrap();
        assert!(cond.body.is_none());
    }

    #[test]
    fn empty_body_has_no_single_body() {
        let src = "if bar\nend\n";
        let parse_result = ruby_prism::parse(src.as_bytes());
        let nodes = all_conditionals(&parse_result);
        let cond = Conditional::from_node(&nodes[0]).unwrap();
        assert!(cond.body.is_none());
    }

    #[test]
    fn nested_conditional_in_body_detected() {
        let src = "if a\n  b if c\nend\n";
        let parse_result = ruby_prism::parse(src.as_bytes());
        let nodes = all_conditionals(&parse_result);
        let cond = Conditional::from_node(&nodes[0]).unwrap();
        assert!(contains_conditional(cond.body.as_ref().unwrap()));
    }

    #[test]
    fn plain_body_has_no_nested_conditional() {
        let src = "if a\n  b\nend\n";
        let parse_result = ruby_prism::parse(src.as_bytes());
        let nodes = all_conditionals(&parse_result);
        let cond = Conditional::from_node(&nodes[0]).unwrap();
        assert!(!contains_conditional(cond.body.as_ref().unwrap()));
    }

    #[test]
    fn assignment_in_condition_binds_locals() {
        let src = "if (m = /re/.match(str))\n  m\nend\n";
        let parse_result = ruby_prism::parse(src.as_bytes());
        let nodes = all_conditionals(&parse_result);
        let cond = Conditional::from_node(&nodes[0]).unwrap();
        assert!(binds_locals(&cond.predicate));
    }

    #[test]
    fn named_capture_match_binds_locals() {
        let src = "if /(?<m>x)/ =~ str\n  m\nend\n";
        let parse_result = ruby_prism::parse(src.as_bytes());
        let nodes = all_conditionals(&parse_result);
        let cond = Conditional::from_node(&nodes[0]).unwrap();
        assert!(binds_locals(&cond.predicate));
    }

    #[test]
    fn plain_condition_binds_nothing() {
        let src = "if m == x\n  m\nend\n";
        let parse_result = ruby_prism::parse(src.as_bytes());
        let nodes = all_conditionals(&parse_result);
        let cond = Conditional::from_node(&nodes[0]).unwrap();
        assert!(!binds_locals(&cond.predicate));
    }
}
