use std::collections::HashMap;

use ruby_prism::Visit;

use crate::source::SourceFile;

/// Byte span of a node, `(start_offset, end_offset)`.
pub type Span = (usize, usize);

/// How a conditional relates to its immediate parent expression. Anything
/// that would re-associate around an unparenthesized modifier keyword forces
/// parentheses during block-to-modifier rewriting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentKind {
    /// Right-hand side of an assignment (`x = if ... end`).
    Assignment,
    /// Operand of keyword-level `and`/`or`.
    KeywordBoolean,
    /// Argument of a call without parentheses.
    UnparenthesizedCall,
    #[default]
    Other,
}

/// Parent and sibling facts gathered in one pass over the parse tree.
///
/// Prism nodes carry no parent links, so the upward walks the analysis needs
/// (who owns this conditional, what statement follows it) are precomputed
/// here and queried by span. Read-only after construction.
#[derive(Debug, Default)]
pub struct Ancestry {
    parent_kinds: HashMap<Span, ParentKind>,
    /// For each direct child of a statement sequence, the 1-indexed first
    /// line of the sibling that follows it.
    followers: Vec<(Span, usize)>,
}

impl Ancestry {
    pub fn build(source: &SourceFile, parse_result: &ruby_prism::ParseResult<'_>) -> Self {
        let mut builder = Builder {
            source,
            index: Ancestry::default(),
        };
        builder.visit(&parse_result.node());
        builder.index
    }

    pub fn parent_kind(&self, span: Span) -> ParentKind {
        self.parent_kinds.get(&span).copied().unwrap_or_default()
    }

    /// First line of the statement following the innermost sequence member
    /// containing `span`, if any statement follows it.
    pub fn follower_line(&self, span: Span) -> Option<usize> {
        self.followers
            .iter()
            .filter(|&&(s, _)| s.0 <= span.0 && span.1 <= s.1)
            .min_by_key(|&&(s, _)| s.1 - s.0)
            .map(|&(_, line)| line)
    }
}

struct Builder<'a> {
    source: &'a SourceFile,
    index: Ancestry,
}

impl Builder<'_> {
    fn mark(&mut self, node: &ruby_prism::Node<'_>, kind: ParentKind) {
        if is_conditional(node) {
            self.index.parent_kinds.insert(span_of(node), kind);
        }
    }
}

fn is_conditional(node: &ruby_prism::Node<'_>) -> bool {
    node.as_if_node().is_some() || node.as_unless_node().is_some()
}

fn span_of(node: &ruby_prism::Node<'_>) -> Span {
    let loc = node.location();
    (loc.start_offset(), loc.end_offset())
}

impl<'pr> Visit<'pr> for Builder<'_> {
    fn visit_statements_node(&mut self, node: &ruby_prism::StatementsNode<'pr>) {
        let body: Vec<_> = node.body().iter().collect();
        for pair in body.windows(2) {
            let line = self.source.line_of(pair[1].location().start_offset());
            self.index.followers.push((span_of(&pair[0]), line));
        }
        ruby_prism::visit_statements_node(self, node);
    }

    fn visit_local_variable_write_node(
        &mut self,
        node: &ruby_prism::LocalVariableWriteNode<'pr>,
    ) {
        self.mark(&node.value(), ParentKind::Assignment);
        ruby_prism::visit_local_variable_write_node(self, node);
    }

    fn visit_instance_variable_write_node(
        &mut self,
        node: &ruby_prism::InstanceVariableWriteNode<'pr>,
    ) {
        self.mark(&node.value(), ParentKind::Assignment);
        ruby_prism::visit_instance_variable_write_node(self, node);
    }

    fn visit_class_variable_write_node(
        &mut self,
        node: &ruby_prism::ClassVariableWriteNode<'pr>,
    ) {
        self.mark(&node.value(), ParentKind::Assignment);
        ruby_prism::visit_class_variable_write_node(self, node);
    }

    fn visit_global_variable_write_node(
        &mut self,
        node: &ruby_prism::GlobalVariableWriteNode<'pr>,
    ) {
        self.mark(&node.value(), ParentKind::Assignment);
        ruby_prism::visit_global_variable_write_node(self, node);
    }

    fn visit_constant_write_node(&mut self, node: &ruby_prism::ConstantWriteNode<'pr>) {
        self.mark(&node.value(), ParentKind::Assignment);
        ruby_prism::visit_constant_write_node(self, node);
    }

    fn visit_local_variable_or_write_node(
        &mut self,
        node: &ruby_prism::LocalVariableOrWriteNode<'pr>,
    ) {
        self.mark(&node.value(), ParentKind::Assignment);
        ruby_prism::visit_local_variable_or_write_node(self, node);
    }

    fn visit_local_variable_and_write_node(
        &mut self,
        node: &ruby_prism::LocalVariableAndWriteNode<'pr>,
    ) {
        self.mark(&node.value(), ParentKind::Assignment);
        ruby_prism::visit_local_variable_and_write_node(self, node);
    }

    fn visit_local_variable_operator_write_node(
        &mut self,
        node: &ruby_prism::LocalVariableOperatorWriteNode<'pr>,
    ) {
        self.mark(&node.value(), ParentKind::Assignment);
        ruby_prism::visit_local_variable_operator_write_node(self, node);
    }

    fn visit_multi_write_node(&mut self, node: &ruby_prism::MultiWriteNode<'pr>) {
        self.mark(&node.value(), ParentKind::Assignment);
        ruby_prism::visit_multi_write_node(self, node);
    }

    fn visit_and_node(&mut self, node: &ruby_prism::AndNode<'pr>) {
        if node.operator_loc().as_slice() == b"and" {
            self.mark(&node.left(), ParentKind::KeywordBoolean);
            self.mark(&node.right(), ParentKind::KeywordBoolean);
        }
        ruby_prism::visit_and_node(self, node);
    }

    fn visit_or_node(&mut self, node: &ruby_prism::OrNode<'pr>) {
        if node.operator_loc().as_slice() == b"or" {
            self.mark(&node.left(), ParentKind::KeywordBoolean);
            self.mark(&node.right(), ParentKind::KeywordBoolean);
        }
        ruby_prism::visit_or_node(self, node);
    }

    fn visit_call_node(&mut self, node: &ruby_prism::CallNode<'pr>) {
        if node.opening_loc().is_none() {
            if let Some(arguments) = node.arguments() {
                for arg in arguments.arguments().iter() {
                    self.mark(&arg, ParentKind::UnparenthesizedCall);
                }
            }
        }
        ruby_prism::visit_call_node(self, node);
    }
}
