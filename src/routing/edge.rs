use std::sync::OnceLock;

use regex::bytes::Regex;

use crate::error::RouterError;
use crate::routing::lexer::expand_spec;
use crate::routing::node::Node;

/// Tag distinguishing what an [`Edge`] carries. Kept as a plain enum rather
/// than a trait object — the match path dispatches on it once per visit and
/// then works with concrete fields, no virtual calls.
#[derive(Debug)]
enum EdgeKind {
    Literal,
    Placeholder { name: String, spec: String },
}

/// The outcome of matching a placeholder edge: how many bytes were
/// consumed, the captured value, and which node to resume matching from.
/// `next` is usually the edge's own child, but is the child of a *fused*
/// trailing literal edge when one applied (see [`Edge::placeholder_match`]).
///
/// Two lifetimes because `next` borrows from the trie itself (as long-lived
/// as the `Router`) while `value` borrows from the path being matched
/// (often much shorter-lived) — tying them together would force every node
/// reference handed back from a match to live only as long as the query
/// string, which is wrong.
pub(crate) struct PlaceholderHit<'n, 'p, V> {
    pub(crate) advance: usize,
    pub(crate) value: &'p str,
    pub(crate) next: &'n Node<V>,
}

/// One outbound arc from a [`Node`]. Immutable after construction except for
/// `pattern` (trimmed on a split, literal edges only — E2 makes this
/// impossible for placeholder edges) and `child`.
///
/// `pattern` is raw bytes, not `String`: edges split at arbitrary byte
/// offsets (E1 is defined byte-first), and a `Vec<u8>` has no char-boundary
/// constraint to violate when that split lands inside a multi-byte UTF-8
/// sequence shared by two otherwise-distinct literals.
#[derive(Debug)]
pub(crate) struct Edge<V> {
    pattern: Vec<u8>,
    kind: EdgeKind,
    /// Compiled eagerly for placeholders at construction time (`add`-time),
    /// so a bad custom regex surfaces as `RouterError` from `add` rather than
    /// at first match. `OnceLock` is still the right home for it — it keeps
    /// the field identically typed and accessed for every edge regardless of
    /// kind, and leaves the door open for genuinely lazy matchers later.
    matcher: OnceLock<Regex>,
    /// Lazily built the first time this placeholder edge is matched against:
    /// a combined regex covering the placeholder body *and* a trailing
    /// literal, when this edge's child consists of exactly one literal edge
    /// and nothing else. `None` once resolved means no such fusion applies
    /// (the node doesn't have the single-literal-child shape) and the plain
    /// `matcher` should be used instead. Built lazily, not at `add` time,
    /// because the child node can still gain more edges from later `add`
    /// calls; by the time any match happens all inserts are done.
    fused: OnceLock<Option<Regex>>,
    child: Box<Node<V>>,
}

impl<V> Edge<V> {
    pub(crate) fn new_literal(pattern: Vec<u8>, child: Node<V>) -> Self {
        Self {
            pattern,
            kind: EdgeKind::Literal,
            matcher: OnceLock::new(),
            fused: OnceLock::new(),
            child: Box::new(child),
        }
    }

    pub(crate) fn new_placeholder(
        token: Vec<u8>,
        name: String,
        spec: String,
        child: Node<V>,
    ) -> Result<Self, RouterError> {
        let anchored = format!("^(?:{})", expand_spec(&spec));
        let compiled = Regex::new(&anchored).map_err(|e| {
            RouterError::InvalidRegex(format!(
                "placeholder {{{name}:{spec}}} failed to compile as /{anchored}/: {e}"
            ))
        })?;
        let matcher = OnceLock::new();
        let _ = matcher.set(compiled);
        Ok(Self {
            pattern: token,
            kind: EdgeKind::Placeholder { name, spec },
            matcher,
            fused: OnceLock::new(),
            child: Box::new(child),
        })
    }

    pub(crate) fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    pub(crate) fn is_placeholder(&self) -> bool {
        matches!(self.kind, EdgeKind::Placeholder { .. })
    }

    pub(crate) fn name(&self) -> &str {
        match &self.kind {
            EdgeKind::Placeholder { name, .. } => name,
            EdgeKind::Literal => unreachable!("name() called on a literal edge"),
        }
    }

    pub(crate) fn child(&self) -> &Node<V> {
        &self.child
    }

    pub(crate) fn child_mut(&mut self) -> &mut Node<V> {
        &mut self.child
    }

    /// Truncates a literal edge's pattern to its first `len` bytes and
    /// re-points it at a fresh intermediate node, returning the edge's
    /// previous child (whose subtree — payload included — the caller must
    /// reattach under the intermediate node). Only ever called on literal
    /// edges — splitting a placeholder edge is impossible (E2).
    pub(crate) fn truncate_and_repoint(&mut self, len: usize, intermediate: Node<V>) -> Node<V> {
        debug_assert!(matches!(self.kind, EdgeKind::Literal));
        self.pattern.truncate(len);
        *std::mem::replace(&mut self.child, Box::new(intermediate))
    }

    /// Attempts to match this literal edge's pattern against
    /// `input[cursor..]`. Returns the number of bytes consumed on success.
    pub(crate) fn literal_match(&self, input: &[u8], cursor: usize) -> Option<usize> {
        debug_assert!(matches!(self.kind, EdgeKind::Literal));
        input
            .get(cursor..)
            .filter(|rest| rest.starts_with(self.pattern.as_slice()))
            .map(|_| self.pattern.len())
    }

    /// If this placeholder's child is shaped as exactly one literal edge and
    /// nothing else, builds a regex matching the placeholder body followed
    /// immediately by that literal's text, body captured in group 1.
    ///
    /// This mirrors the way a combined literal-plus-placeholder run compiles
    /// to one regex (`bar/{id}` -> `^bar/([^/]+)`), applied to the symmetric
    /// placeholder-then-literal shape: without it, an unbounded or
    /// slash-crossing placeholder type (the default `string`, or `path`/
    /// `any`) immediately followed by a literal such as `.html` can never
    /// match, because its greedy body consumes the trailing literal's bytes
    /// too and nothing retries with a shorter capture (single-attempt rule).
    /// Folding the literal into the same compiled regex keeps it a single
    /// attempt — the regex engine, not a retry loop, finds the boundary.
    fn fused(&self) -> Option<&Regex> {
        self.fused
            .get_or_init(|| {
                let EdgeKind::Placeholder { spec, .. } = &self.kind else {
                    return None;
                };
                let [only] = self.child.edges() else {
                    return None;
                };
                if only.is_placeholder() {
                    return None;
                }
                let literal = std::str::from_utf8(only.pattern())
                    .expect("literal edge pattern is valid UTF-8 sliced from a valid UTF-8 route pattern");
                let anchored = format!("^({}){}", expand_spec(spec), regex::escape(literal));
                Regex::new(&anchored).ok()
            })
            .as_ref()
    }

    /// The node reached by a successful [`fused`] match: the single
    /// trailing literal edge's own child, skipping the literal edge itself
    /// since its bytes were already consumed as part of the combined match.
    fn fused_target(&self) -> Option<&Node<V>> {
        match self.child.edges() {
            [only] if !only.is_placeholder() => Some(only.child()),
            _ => None,
        }
    }

    /// Attempts this placeholder edge against `input[cursor..]`, trying a
    /// fused body-plus-trailing-literal regex first (when this edge's child
    /// has the single-literal shape `fused` requires) and falling back to
    /// the bare body regex otherwise. Either way this is one match attempt
    /// per visit: on failure the caller moves on to the next sibling rather
    /// than retrying this edge with a shorter capture.
    ///
    /// The returned slice is valid UTF-8 whenever `input` is: every
    /// expansion is unicode-aware (never forced into `(?-u:...)` byte
    /// mode), so match boundaries always fall on char boundaries of valid
    /// UTF-8 input.
    pub(crate) fn placeholder_match<'n, 'p>(
        &'n self,
        input: &'p [u8],
        cursor: usize,
    ) -> Option<PlaceholderHit<'n, 'p, V>> {
        let rest = input.get(cursor..)?;

        if let (Some(re), Some(target)) = (self.fused(), self.fused_target()) {
            if let Some(caps) = re.captures(rest) {
                let whole = caps.get(0).expect("capture group 0 is present on any match");
                let body = caps
                    .get(1)
                    .expect("fused regex always wraps the placeholder body in group 1");
                debug_assert_eq!(whole.start(), 0, "expansion must be anchored at the start");
                let value = std::str::from_utf8(body.as_bytes()).expect(
                    "unicode-aware regex match on valid UTF-8 input stays on char boundaries",
                );
                return Some(PlaceholderHit {
                    advance: whole.end(),
                    value,
                    next: target,
                });
            }
        }

        let re = self
            .matcher
            .get()
            .expect("placeholder matcher is compiled at construction");
        let m = re.find(rest)?;
        debug_assert_eq!(m.start(), 0, "expansion must be anchored at the start");
        let value = std::str::from_utf8(m.as_bytes())
            .expect("unicode-aware regex match on valid UTF-8 input stays on char boundaries");
        Some(PlaceholderHit {
            advance: m.end(),
            value,
            next: &self.child,
        })
    }
}
