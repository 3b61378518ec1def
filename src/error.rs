use std::fmt;

/// Failures the router can report. Matching itself never fails — a miss is
/// an ordinary `None`, never an error (see `routing::Router::match_path`).
#[derive(Debug)]
pub enum RouterError {
    /// A pattern passed to `Router::add` was malformed: unbalanced braces,
    /// an empty placeholder name, an empty custom spec, or a path separator
    /// inside an unterminated placeholder.
    InvalidRoute(String),
    /// A placeholder's custom regex spec failed to compile.
    InvalidRegex(String),
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::InvalidRoute(msg) => write!(f, "invalid route: {}", msg),
            RouterError::InvalidRegex(msg) => write!(f, "invalid placeholder regex: {}", msg),
        }
    }
}

impl std::error::Error for RouterError {}
