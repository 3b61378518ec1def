use std::collections::HashMap;

use crate::error::RouterError;
use crate::routing::lexer::{self, Fragment};
use crate::routing::node::Node;
use crate::routing::Edge;

/// A successful [`Router::match_path`] — the payload at the matched route
/// plus whatever placeholders were captured along the way.
#[derive(Debug, PartialEq, Eq)]
pub struct Matched<'a, V> {
    pub payload: &'a HashMap<String, V>,
    pub params: HashMap<String, String>,
}

/// Top-level radix trie over URL path patterns. Build with repeated [`add`],
/// then read with any number of [`match_path`] calls from any number of
/// threads — the tree is never mutated after `add` stops being called (see
/// the module's concurrency notes).
///
/// [`add`]: Router::add
/// [`match_path`]: Router::match_path
#[derive(Debug)]
pub struct Router<V = String> {
    root: Node<V>,
}

impl<V> Default for Router<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Router<V> {
    pub fn new() -> Self {
        Self { root: Node::new() }
    }

    /// Indexes `pattern`, merging `payload` into whatever is already stored
    /// at that exact pattern (P3/P4). Returns `RouterError::InvalidRoute` or
    /// `RouterError::InvalidRegex` for a malformed pattern; the router is
    /// unaffected and remains usable (§7).
    pub fn add(&mut self, pattern: &str, payload: HashMap<String, V>) -> Result<(), RouterError> {
        // Validate the whole pattern upfront — malformed braces/names/specs
        // are rejected before any tree mutation happens.
        lexer::lex(pattern.as_bytes())?;
        tracing::trace!(pattern, fields = payload.len(), "routing: inserting route");
        insert(&mut self.root, pattern.as_bytes(), payload)
    }

    /// Looks up `path`. Returns `None` — the miss sentinel — if no inserted
    /// pattern matches; `Some` with the payload and captured params on a hit.
    /// Never errors: a bad custom regex would already have been rejected by
    /// `add`.
    pub fn match_path<'a>(&'a self, path: &str) -> Option<Matched<'a, V>> {
        let mut params = HashMap::new();
        let hit = match_node(&self.root, path.as_bytes(), 0, &mut params)?;
        tracing::trace!(path, params = params.len(), "routing: matched");
        Some(Matched {
            payload: hit.payload().expect("match_node only returns nodes with a payload"),
            params,
        })
    }

    pub(crate) fn root(&self) -> &Node<V> {
        &self.root
    }
}

/// Inserts `remaining` (the not-yet-consumed suffix of the original pattern)
/// under `node`, splitting literal edges at their longest common prefix with
/// the new text as needed (§4.4.1).
fn insert<V>(node: &mut Node<V>, remaining: &[u8], payload: HashMap<String, V>) -> Result<(), RouterError> {
    if remaining.is_empty() {
        node.merge_payload(payload);
        return Ok(());
    }

    if remaining.first() == Some(&b'{') {
        let (fragment, rest) = lexer::next_fragment(remaining)?;
        let Fragment::Placeholder { name, spec } = fragment else {
            unreachable!("remaining starts with '{{', next_fragment must yield a Placeholder");
        };
        // The exact token text (braces included) is how identical
        // placeholders are recognized on re-insertion — byte-identical name
        // and spec, not just "some placeholder".
        let token = remaining[..remaining.len() - rest.len()].to_vec();
        if let Some(edge) = node.find_placeholder_edge_mut(&token) {
            return insert(edge.child_mut(), rest, payload);
        }
        let mut edge = Edge::new_placeholder(token, name, spec, Node::new())?;
        let result = insert(edge.child_mut(), rest, payload);
        node.push_edge(edge);
        return result;
    }

    let lit_end = remaining.iter().position(|&b| b == b'{').unwrap_or(remaining.len());
    let literal_prefix = &remaining[..lit_end];
    let first_byte = literal_prefix[0];

    match node.find_literal_edge_mut(first_byte) {
        None => {
            let mut edge = Edge::new_literal(literal_prefix.to_vec(), Node::new());
            let result = insert(edge.child_mut(), &remaining[lit_end..], payload);
            node.push_edge(edge);
            result
        }
        Some(edge) => {
            let cp = common_prefix_len(edge.pattern(), literal_prefix);
            if cp == edge.pattern().len() {
                // Existing edge is fully consumed by the new text — descend
                // and let the next iteration extend or terminate.
                insert(edge.child_mut(), &remaining[cp..], payload)
            } else {
                // Partial overlap — split at the common prefix. The old
                // suffix becomes a sibling edge of whatever `remaining[cp..]`
                // needs, both hung off a fresh intermediate node.
                let suffix = edge.pattern()[cp..].to_vec();
                let old_child = edge.truncate_and_repoint(cp, Node::new());
                let intermediate = edge.child_mut();
                intermediate.push_edge(Edge::new_literal(suffix, old_child));
                insert(intermediate, &remaining[cp..], payload)
            }
        }
    }
}

/// Longest common byte prefix of `a` and `b`. Plain byte comparison — edges
/// split at arbitrary byte offsets (E1), and `Vec<u8>` truncation has no
/// char-boundary constraint to worry about.
fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Recursive lookup with backtracking (§4.4.2). A node's edges — literal and
/// placeholder alike — are tried in one insertion-ordered sequence (N1/N2
/// corrected): whichever edge was registered at this node first is tried
/// first, regardless of kind. A literal edge beats a placeholder sibling
/// only when it happened to be added first, never by blanket priority. A
/// hit requires the cursor to be exhausted *and* the node to carry a
/// payload — children with no payload at path's end are not a match.
fn match_node<'a, V>(
    node: &'a Node<V>,
    path: &[u8],
    cursor: usize,
    captures: &mut HashMap<String, String>,
) -> Option<&'a Node<V>> {
    if cursor == path.len() && node.payload().is_some() {
        return Some(node);
    }

    for edge in node.edges() {
        if edge.is_placeholder() {
            if let Some(hit) = edge.placeholder_match(path, cursor) {
                let name = edge.name().to_string();
                let previous = captures.insert(name.clone(), hit.value.to_string());
                if let Some(found) = match_node(hit.next, path, cursor + hit.advance, captures) {
                    return Some(found);
                }
                match previous {
                    Some(prev) => {
                        captures.insert(name, prev);
                    }
                    None => {
                        captures.remove(&name);
                    }
                }
            }
        } else if cursor < path.len() && path[cursor] == edge.pattern()[0] {
            if let Some(advance) = edge.literal_match(path, cursor) {
                if let Some(found) = match_node(edge.child(), path, cursor + advance, captures) {
                    return Some(found);
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn matches_literal_exact() {
        let mut router = Router::new();
        router.add("/foo/bar", payload(&[("h", "1")])).unwrap();
        let hit = router.match_path("/foo/bar").unwrap();
        assert_eq!(hit.payload.get("h"), Some(&"1".to_string()));
        assert!(hit.params.is_empty());
    }

    #[test]
    fn misses_on_unknown_path() {
        let mut router = Router::new();
        router.add("/foo/bar", payload(&[("h", "1")])).unwrap();
        assert!(router.match_path("/foo/baz").is_none());
        assert!(router.match_path("/foo/bar/extra").is_none());
        assert!(router.match_path("/foo").is_none());
    }

    #[test]
    fn captures_default_placeholder() {
        let mut router = Router::new();
        router.add("/users/{id}", payload(&[("h", "1")])).unwrap();
        let hit = router.match_path("/users/42").unwrap();
        assert_eq!(hit.params.get("id"), Some(&"42".to_string()));
    }

    #[test]
    fn typed_digit_placeholder_rejects_non_digits() {
        let mut router = Router::new();
        router.add("/users/{id:digit}", payload(&[("h", "1")])).unwrap();
        assert!(router.match_path("/users/abc").is_none());
        assert_eq!(
            router.match_path("/users/42").unwrap().params.get("id"),
            Some(&"42".to_string())
        );
    }

    #[test]
    fn literal_wins_over_placeholder_at_same_node() {
        let mut router = Router::new();
        router.add("/foo/priority", payload(&[("which", "literal")])).unwrap();
        router.add("/foo/{bar:any}", payload(&[("which", "placeholder")])).unwrap();

        let hit = router.match_path("/foo/priority").unwrap();
        assert_eq!(hit.payload.get("which"), Some(&"literal".to_string()));
        assert!(hit.params.is_empty());

        let hit = router.match_path("/foo/").unwrap();
        assert_eq!(hit.payload.get("which"), Some(&"placeholder".to_string()));
        assert_eq!(hit.params.get("bar"), Some(&"".to_string()));

        let hit = router.match_path("/foo/baz").unwrap();
        assert_eq!(hit.payload.get("which"), Some(&"placeholder".to_string()));
        assert_eq!(hit.params.get("bar"), Some(&"baz".to_string()));
    }

    #[test]
    fn splits_literal_edge_on_partial_overlap() {
        let mut router = Router::new();
        router.add("/team", payload(&[("r", "team")])).unwrap();
        router.add("/teapot", payload(&[("r", "teapot")])).unwrap();

        assert_eq!(
            router.match_path("/team").unwrap().payload.get("r"),
            Some(&"team".to_string())
        );
        assert_eq!(
            router.match_path("/teapot").unwrap().payload.get("r"),
            Some(&"teapot".to_string())
        );
        assert!(router.match_path("/tea").is_none());
    }

    #[test]
    fn backtracks_past_failed_placeholder_to_sibling() {
        let mut router = Router::new();
        router.add("/a/{x:digit}/fixed", payload(&[("r", "digit-branch")])).unwrap();
        router.add("/a/{x}/other", payload(&[("r", "string-branch")])).unwrap();

        let hit = router.match_path("/a/abc/other").unwrap();
        assert_eq!(hit.payload.get("r"), Some(&"string-branch".to_string()));
        assert_eq!(hit.params.get("x"), Some(&"abc".to_string()));
    }

    #[test]
    fn restores_shadowed_capture_on_backtrack() {
        let mut router = Router::new();
        router.add("/a/{x}/b/{x:digit}/c", payload(&[("r", "inner")])).unwrap();
        router.add("/a/{x}/b/literal", payload(&[("r", "outer")])).unwrap();

        let hit = router.match_path("/a/hello/b/literal").unwrap();
        assert_eq!(hit.payload.get("r"), Some(&"outer".to_string()));
        assert_eq!(hit.params.get("x"), Some(&"hello".to_string()));

        let hit = router.match_path("/a/hello/b/99/c").unwrap();
        assert_eq!(hit.payload.get("r"), Some(&"inner".to_string()));
        assert_eq!(hit.params.get("x"), Some(&"99".to_string()));
    }

    #[test]
    fn later_add_merges_payload_by_key() {
        let mut router = Router::new();
        router.add("/foo", payload(&[("a", "1")])).unwrap();
        router.add("/foo", payload(&[("b", "2")])).unwrap();
        router.add("/foo", payload(&[("a", "overwritten")])).unwrap();

        let hit = router.match_path("/foo").unwrap();
        assert_eq!(hit.payload.get("a"), Some(&"overwritten".to_string()));
        assert_eq!(hit.payload.get("b"), Some(&"2".to_string()));
    }

    #[test]
    fn alnum_and_alpha_are_unicode_aware() {
        let mut router = Router::new();
        router.add("/w/{s:alpha}", payload(&[("h", "alpha")])).unwrap();
        let hit = router.match_path("/w/caf\u{e9}").unwrap();
        assert_eq!(hit.params.get("s"), Some(&"caf\u{e9}".to_string()));
    }

    #[test]
    fn unicode_literal_segments_split_correctly() {
        let mut router = Router::new();
        router.add("/caf\u{e9}", payload(&[("r", "acute")])).unwrap();
        router.add("/caf\u{e8}", payload(&[("r", "grave")])).unwrap();

        assert_eq!(
            router.match_path("/caf\u{e9}").unwrap().payload.get("r"),
            Some(&"acute".to_string())
        );
        assert_eq!(
            router.match_path("/caf\u{e8}").unwrap().payload.get("r"),
            Some(&"grave".to_string())
        );
    }

    #[test]
    fn bounded_placeholder_then_trailing_literal_matches() {
        let mut router = Router::new();
        router.add("/foo/{id:alnum}.html", payload(&[("r", "hit")])).unwrap();
        let hit = router.match_path("/foo/bar2.html").unwrap();
        assert_eq!(hit.params.get("id"), Some(&"bar2".to_string()));
    }

    #[test]
    fn default_placeholder_then_trailing_literal_matches() {
        let mut router = Router::new();
        router.add("/foo/{id}.html", payload(&[("r", "hit")])).unwrap();
        let hit = router.match_path("/foo/bar.html").unwrap();
        assert_eq!(hit.payload.get("r"), Some(&"hit".to_string()));
        assert_eq!(hit.params.get("id"), Some(&"bar".to_string()));
        assert!(router.match_path("/foo/bar").is_none());
    }

    #[test]
    fn matchall_placeholder_then_trailing_literal_matches_across_separators() {
        let mut router = Router::new();
        router.add("/foo/{id:path}.html", payload(&[("r", "hit")])).unwrap();
        let hit = router.match_path("/foo/bar/2.html").unwrap();
        assert_eq!(hit.params.get("id"), Some(&"bar/2".to_string()));
    }

    /// Mirrors the reference library's
    /// `test_add_respesct_clashing_edges_registration_order`: a placeholder
    /// registered before a clashing literal sibling must win the clash, the
    /// same way a literal registered first wins in
    /// `literal_wins_over_placeholder_at_same_node`. Neither kind has
    /// blanket priority — only registration order does (N1/N2).
    #[test]
    fn placeholder_wins_when_registered_before_clashing_literal() {
        let mut router = Router::new();
        router
            .add("/foo/{id}/{sub}", payload(&[("s", "y")]))
            .unwrap();
        router.add("/foo/{id}/path", payload(&[("s", "x")])).unwrap();

        let hit = router.match_path("/foo/id/path").unwrap();
        assert_eq!(hit.payload.get("s"), Some(&"y".to_string()));
        assert_eq!(hit.params.get("id"), Some(&"id".to_string()));
        assert_eq!(hit.params.get("sub"), Some(&"path".to_string()));
    }

    #[test]
    fn invalid_pattern_rejected_without_mutating_tree() {
        let mut router: Router<String> = Router::new();
        assert!(router.add("/foo/{id", HashMap::new()).is_err());
        assert_eq!(router.root().edge_count(), 0);
    }

    #[test]
    fn invalid_custom_regex_rejected() {
        let mut router: Router<String> = Router::new();
        assert!(router.add("/foo/{id:[}", HashMap::new()).is_err());
    }
}
