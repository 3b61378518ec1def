use std::collections::HashMap;

use crate::routing::edge::Edge;

/// A vertex in the routing trie. Exclusively owned by its parent edge (or by
/// the `Router` for the root) — no shared ownership, no cycles.
///
/// Edges are kept in one insertion-ordered vector, literal and placeholder
/// alike: N1/N2 both reduce to "try edges in the order they were added".
/// A literal edge only outranks a placeholder sibling when it happened to
/// be registered first — it has no blanket priority (see
/// `src/routing/router.rs::match_node`).
#[derive(Debug)]
pub(crate) struct Node<V> {
    edges: Vec<Edge<V>>,
    payload: Option<HashMap<String, V>>,
}

impl<V> Node<V> {
    pub(crate) fn new() -> Self {
        Self {
            edges: Vec::new(),
            payload: None,
        }
    }

    /// Locates the literal edge whose pattern starts with `first_byte`, if
    /// any. At most one exists per node (E1) — edges with a shared leading
    /// byte are merged (split) at insert time instead of coexisting.
    pub(crate) fn find_literal_edge_mut(&mut self, first_byte: u8) -> Option<&mut Edge<V>> {
        self.edges
            .iter_mut()
            .find(|e| !e.is_placeholder() && e.pattern()[0] == first_byte)
    }

    pub(crate) fn find_placeholder_edge_mut(&mut self, token: &[u8]) -> Option<&mut Edge<V>> {
        self.edges
            .iter_mut()
            .find(|e| e.is_placeholder() && e.pattern() == token)
    }

    /// Appends `edge` to the end of this node's edge list. Insertion order
    /// *is* match order (N1/N2): whatever is already here is tried first,
    /// whatever comes later is tried after.
    pub(crate) fn push_edge(&mut self, edge: Edge<V>) {
        self.edges.push(edge);
    }

    pub(crate) fn edges(&self) -> &[Edge<V>] {
        &self.edges
    }

    pub(crate) fn payload(&self) -> Option<&HashMap<String, V>> {
        self.payload.as_ref()
    }

    /// Merges `kv` into this node's payload key-by-key: new keys are added,
    /// existing keys are overwritten. Later `add` calls win ties (P4).
    pub(crate) fn merge_payload(&mut self, kv: HashMap<String, V>) {
        match &mut self.payload {
            Some(existing) => existing.extend(kv),
            None => self.payload = Some(kv),
        }
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
