//! Read-only tree diagnostics: a human-readable rendering of the trie for
//! `router-cli --dump` and for debugging tests that don't want to reach
//! into private fields.

use std::fmt;

use crate::routing::node::Node;
use crate::routing::Router;

/// Renders a [`Router`]'s trie as indented lines, one edge per line, walked
/// in the same insertion order `match_path` probes them in (N1/N2) — literal
/// and placeholder edges interleaved as registered, not grouped by kind. A
/// trailing `*` marks a node that carries a payload.
pub struct TreeDump<'a, V> {
    root: &'a Node<V>,
}

impl<'a, V> TreeDump<'a, V> {
    pub(crate) fn new(router: &'a Router<V>) -> Self {
        Self { root: router.root() }
    }
}

impl<V> fmt::Display for TreeDump<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self.root, 0)
    }
}

fn write_node<V>(f: &mut fmt::Formatter<'_>, node: &Node<V>, depth: usize) -> fmt::Result {
    for edge in node.edges() {
        if edge.is_placeholder() {
            writeln!(
                f,
                "{}{}{}",
                "  ".repeat(depth),
                String::from_utf8_lossy(edge.pattern()),
                if edge.child().payload().is_some() { " *" } else { "" }
            )?;
        } else {
            writeln!(
                f,
                "{}{:?}{}",
                "  ".repeat(depth),
                String::from_utf8_lossy(edge.pattern()),
                if edge.child().payload().is_some() { " *" } else { "" }
            )?;
        }
        write_node(f, edge.child(), depth + 1)?;
    }
    Ok(())
}

impl<V> Router<V> {
    /// Diagnostic tree view, e.g. for `router-cli --dump` or test failures.
    /// Never used on the match path — purely a read-only traversal.
    pub fn dump(&self) -> TreeDump<'_, V> {
        TreeDump::new(self)
    }
}
