//! Splits a pattern into literal runs and placeholder tokens, and expands a
//! placeholder's type tag (or custom spec) into the regex body that backs it.
//!
//! Everything here works over raw bytes rather than `&str`. Patterns and
//! paths are byte sequences (§6) and edges split at arbitrary byte offsets
//! (E1 is defined byte-first, not char-first); the only multi-byte-safety
//! argument we need is that every slice we take is bounded by one of the
//! single-byte ASCII delimiters `{`, `}`, `:`, `/` — which, because no
//! continuation byte of a multi-byte UTF-8 sequence ever equals an ASCII
//! byte value, always land on a char boundary when the input is valid
//! UTF-8. That's why `str::from_utf8` below is infallible in practice.

use crate::error::RouterError;

const OPEN: u8 = b'{';
const CLOSE: u8 = b'}';
const SEPARATOR: u8 = b'/';

/// One piece of a lexed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Fragment {
    Literal(Vec<u8>),
    Placeholder { name: String, spec: String },
}

/// Lexes an entire pattern into fragments, validating brace balance and name
/// / spec non-emptiness along the way. Used for upfront `add`-time
/// validation and by the tree dump; the insertion loop itself re-walks the
/// raw bytes one fragment at a time via [`next_fragment`].
pub(crate) fn lex(pattern: &[u8]) -> Result<Vec<Fragment>, RouterError> {
    let mut fragments = Vec::new();
    let mut rest = pattern;
    while !rest.is_empty() {
        let (fragment, remainder) = next_fragment(rest)?;
        fragments.push(fragment);
        rest = remainder;
    }
    Ok(fragments)
}

/// Splits the next fragment — a literal run up to (not including) the next
/// `{`, or a single `{name}`/`{name:spec}` placeholder — off the front of
/// `remaining`, returning it alongside what's left.
pub(crate) fn next_fragment(remaining: &[u8]) -> Result<(Fragment, &[u8]), RouterError> {
    if remaining.first() == Some(&OPEN) {
        let (token, rest) = take_placeholder(remaining)?;
        let (name, spec) = split_placeholder(token)?;
        Ok((Fragment::Placeholder { name, spec }, rest))
    } else {
        let end = remaining.iter().position(|&b| b == OPEN).unwrap_or(remaining.len());
        let (literal, rest) = remaining.split_at(end);
        Ok((Fragment::Literal(literal.to_vec()), rest))
    }
}

/// Extracts the full `{...}` token (braces included) from the front of
/// `remaining`, which must start with `{`. Returns the token and whatever
/// follows it.
pub(crate) fn take_placeholder(remaining: &[u8]) -> Result<(&[u8], &[u8]), RouterError> {
    debug_assert_eq!(remaining.first(), Some(&OPEN));
    for (i, &b) in remaining.iter().enumerate().skip(1) {
        match b {
            CLOSE => return Ok(remaining.split_at(i + 1)),
            SEPARATOR => {
                return Err(RouterError::InvalidRoute(format!(
                    "unterminated placeholder before path separator in {:?}",
                    String::from_utf8_lossy(remaining)
                )))
            }
            _ => {}
        }
    }
    Err(RouterError::InvalidRoute(format!(
        "unbalanced '{{' with no matching '}}' in {:?}",
        String::from_utf8_lossy(remaining)
    )))
}

/// Splits a `{name}` or `{name:spec}` token (braces included) into its name
/// and spec (spec is `""` when the short form is used — the default type).
fn split_placeholder(token: &[u8]) -> Result<(String, String), RouterError> {
    let inner = &token[1..token.len() - 1];
    let colon = inner.iter().position(|&b| b == b':');
    let (name, spec) = match colon {
        Some(i) => {
            let spec = &inner[i + 1..];
            if spec.is_empty() {
                return Err(RouterError::InvalidRoute(format!(
                    "empty spec after ':' in placeholder {:?}",
                    String::from_utf8_lossy(token)
                )));
            }
            (&inner[..i], spec)
        }
        None => (inner, &inner[inner.len()..]),
    };
    if name.is_empty() {
        return Err(RouterError::InvalidRoute(format!(
            "empty placeholder name in {:?}",
            String::from_utf8_lossy(token)
        )));
    }
    // `name`/`spec` are bounded by `{`, `:`, `}` — all ASCII — so this is
    // infallible for a `token` taken from a valid UTF-8 pattern.
    let name = std::str::from_utf8(name)
        .expect("placeholder name bounded by ASCII delimiters")
        .to_string();
    let spec = std::str::from_utf8(spec)
        .expect("placeholder spec bounded by ASCII delimiters")
        .to_string();
    Ok((name, spec))
}

/// Expands a type tag (or custom spec) into the regex body it compiles to.
/// See the type tag table: unmarked specs default to `string`.
pub(crate) fn expand_spec(spec: &str) -> &str {
    match spec {
        "" | "string" => r"[^/]+",
        "digit" => r"\d+",
        "alpha" => r"[^\W\d_]+",
        "alnum" => r"[^\W_]+",
        "path" | "any" => r".*",
        custom => custom,
    }
}
