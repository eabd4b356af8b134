//! Compiler error types.
//!
//! Every fatal condition the compiler can hit - lexical, syntactic, semantic,
//! or I/O - is modeled as a variant of [`CompileError`]. There is no recovery:
//! the first error aborts the compilation unit that raised it (see
//! `driver::compile_path`), and callers report it and move on to the next file.

use std::path::PathBuf;

/// A 1-based source position used to point at the offending lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A fatal compilation error, tagged with the file it occurred in.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Invalid character sequence, unterminated string/block comment, or an
    /// integer literal outside `[0, 32767]`.
    #[error("{file}:{pos}: error: {message}")]
    Lex {
        file: PathBuf,
        pos: Position,
        message: String,
    },

    /// The parser found a token that cannot continue the current production.
    #[error("{file}:{pos}: error: {message}")]
    Parse {
        file: PathBuf,
        pos: Position,
        message: String,
    },

    /// Duplicate definition in a scope, or use of an undefined name where a
    /// local/field/static/arg binding is required.
    #[error("{file}:{pos}: error: {message}")]
    Semantic {
        file: PathBuf,
        pos: Position,
        message: String,
    },

    /// A token accessor (`keyword`, `symbol`, `intVal`, `stringVal`, ...) was
    /// called against a token of the wrong kind.
    #[error("{file}:{pos}: error: wrong token kind: {message}")]
    WrongTokenKind {
        file: PathBuf,
        pos: Position,
        message: String,
    },

    /// The input path did not end in `.jack`.
    #[error("{path}: error: not a .jack file")]
    BadExtension { path: PathBuf },

    /// Could not open an input or create/write an output sink.
    #[error("{path}: I/O error: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompileError {
    pub fn file(&self) -> &std::path::Path {
        match self {
            CompileError::Lex { file, .. }
            | CompileError::Parse { file, .. }
            | CompileError::Semantic { file, .. }
            | CompileError::WrongTokenKind { file, .. } => file,
            CompileError::BadExtension { path } | CompileError::Io { path, .. } => path,
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
