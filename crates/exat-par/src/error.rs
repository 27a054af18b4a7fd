//! Parser error type.
//!
//! Errors carry the 1-based source line where they were detected, and
//! outer parsing layers wrap inner failures with a context prefix, so a
//! failure deep inside a nested construct still reads top-down:
//! `error parsing IF on line 3: error parsing condition: unexpected EOL`.

use thiserror::Error;

/// Errors surfaced by the parser.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The token stream ran out mid-construct.
    #[error("unexpected end of program")]
    UnexpectedEnd,

    /// A specific token was required but something else was found.
    #[error("expected {want} but got '{got}' on line {line}")]
    Expected { want: String, got: String, line: u32 },

    /// A non-empty token was required but the line ended.
    #[error("unexpected EOL")]
    UnexpectedEol,

    /// An operator position held something unrecognized.
    #[error("invalid operator: {0}")]
    InvalidOperator(String),

    /// A fixed-arity instruction had the wrong argument count.
    #[error("expected {want} arguments but got {got}")]
    ArgCount { want: usize, got: usize },

    /// `BREAK` used with no enclosing loop.
    #[error("BREAK called outside of loop on line {0}")]
    BreakOutsideLoop(u32),

    /// `CONTINUE` used with no enclosing loop.
    #[error("CONTINUE called outside of loop on line {0}")]
    ContinueOutsideLoop(u32),

    /// The body dispatcher found a token it cannot begin a statement with.
    #[error("unexpected token on line {line}: {token}")]
    UnexpectedToken { line: u32, token: String },

    /// A wrapped inner error with a context prefix.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<ParseError>,
    },
}

/// Attaches context prefixes to parse results.
pub(crate) trait Context<T> {
    /// Wraps the error with a static context prefix.
    fn context(self, context: &str) -> Result<T, ParseError>;

    /// Wraps the error with a lazily built context prefix.
    fn with_context<F>(self, f: F) -> Result<T, ParseError>
    where
        F: FnOnce() -> String;
}

impl<T> Context<T> for Result<T, ParseError> {
    fn context(self, context: &str) -> Result<T, ParseError> {
        self.map_err(|err| ParseError::Context {
            context: context.to_string(),
            source: Box::new(err),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, ParseError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| ParseError::Context {
            context: f(),
            source: Box::new(err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_plain() {
        assert_eq!(
            ParseError::UnexpectedEnd.to_string(),
            "unexpected end of program"
        );
        assert_eq!(
            ParseError::Expected {
                want: "EOL".to_string(),
                got: "X".to_string(),
                line: 3,
            }
            .to_string(),
            "expected EOL but got 'X' on line 3"
        );
        assert_eq!(
            ParseError::ArgCount { want: 2, got: 3 }.to_string(),
            "expected 2 arguments but got 3"
        );
    }

    #[test]
    fn test_display_chained_context() {
        let err: Result<(), ParseError> = Err(ParseError::UnexpectedEol);
        let err = err
            .context("error parsing value")
            .context("error parsing left operand")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "error parsing left operand: error parsing value: unexpected EOL"
        );
    }
}
