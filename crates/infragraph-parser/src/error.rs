//! Parser errors. These never cross the crate boundary: each one is turned
//! into an `EngineWarning::ParseFailure` for the document that produced it.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unterminated string starting at line {line}")]
    UnterminatedString { line: usize },

    #[error("unterminated block comment starting at line {line}")]
    UnterminatedComment { line: usize },

    #[error("unterminated heredoc <<{marker} starting at line {line}")]
    UnterminatedHeredoc { marker: String, line: usize },

    #[error("unterminated interpolation starting at line {line}")]
    UnterminatedInterpolation { line: usize },

    #[error("unbalanced braces: '{kind}' block opened at line {line} is never closed")]
    UnclosedBlock { kind: String, line: usize },

    #[error("unexpected '}}' at line {line}")]
    UnexpectedClose { line: usize },

    #[error("'{kind}' block at line {line} expects {expected} label(s), found {found}")]
    MissingLabels {
        kind: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("expected a block at line {line}, found {found}")]
    UnexpectedToken { line: usize, found: String },
}
