//! Radix trie over URL path patterns: literal runs share edges by longest
//! common prefix, and typed placeholders (`{name}`, `{name:type}`,
//! `{name:regex}`) branch off as their own edges backed by an anchored,
//! eagerly-compiled regex.
//!
//! - [`lexer`] splits a pattern into literal/placeholder fragments and
//!   expands type tags to their regex bodies.
//! - [`edge`] and [`node`] are the trie's storage: a `Node` holds all of its
//!   outbound edges — literal and placeholder alike — in one insertion-
//!   ordered vector, so match-time ordering falls out of registration order
//!   rather than a sort or a kind-based priority at lookup time.
//! - [`router`] ties them together: `Router::add` inserts with edge
//!   splitting, `Router::match_path` looks up with backtracking.
//! - [`dump`] renders the tree for diagnostics, in the same traversal order
//!   `match_path` uses.

mod dump;
mod edge;
mod lexer;
mod node;
mod router;

use edge::Edge;

pub use dump::TreeDump;
pub use router::{Matched, Router};
