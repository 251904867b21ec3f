//! Shared helpers for unit tests.

use ruby_prism::Visit;

use crate::config::LineLengthConfig;
use crate::diagnostic::Diagnostic;
use crate::engine::Engine;
use crate::source::SourceFile;

/// Every `if`/`unless` node in the tree, in pre-order.
pub fn all_conditionals<'a>(
    parse_result: &'a ruby_prism::ParseResult<'_>,
) -> Vec<ruby_prism::Node<'a>> {
    let mut collector = Collector { nodes: Vec::new() };
    collector.visit(&parse_result.node());
    collector.nodes
}

struct Collector<'pr> {
    nodes: Vec<ruby_prism::Node<'pr>>,
}

impl<'pr> Visit<'pr> for Collector<'pr> {
    fn visit_if_node(&mut self, node: &ruby_prism::IfNode<'pr>) {
        self.nodes.push(node.as_node());
        ruby_prism::visit_if_node(self, node);
    }

    fn visit_unless_node(&mut self, node: &ruby_prism::UnlessNode<'pr>) {
        self.nodes.push(node.as_node());
        ruby_prism::visit_unless_node(self, node);
    }
}

/// Parse `src`, build an engine over it, and hand both to `f`.
pub fn with_engine(
    src: &str,
    config: LineLengthConfig,
    f: impl FnOnce(&Engine<'_>, &ruby_prism::ParseResult<'_>),
) {
    let source = SourceFile::from_str(src);
    let parse_result = ruby_prism::parse(src.as_bytes());
    let engine = Engine::new(&source, &parse_result, config);
    f(&engine, &parse_result);
}

/// Evaluate the first conditional in `src`.
pub fn evaluate_first(src: &str, config: LineLengthConfig) -> Option<Diagnostic> {
    let mut diagnostic = None;
    with_engine(src, config, |engine, parse_result| {
        let nodes = all_conditionals(parse_result);
        diagnostic = engine.evaluate(&nodes[0]);
    });
    diagnostic
}

/// Rewrite the first conditional in `src` and return the resulting source.
pub fn rewrite_first(src: &str, config: LineLengthConfig) -> String {
    let mut result = String::new();
    with_engine(src, config, |engine, parse_result| {
        let nodes = all_conditionals(parse_result);
        let rewrite = engine.rewrite(&nodes[0]).expect("rewrite should succeed");
        result = String::from_utf8(rewrite.apply(src.as_bytes())).expect("valid utf-8");
    });
    result
}
