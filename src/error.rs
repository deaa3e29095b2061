//! Error types for mv1 label parsing, file writing and reading.
//!
//! ## Error Categories
//!
//! - **Grammar Errors**: The label string is malformed. This is a single failure
//!   kind; the attached [`GrammarFault`] only explains what went wrong.
//! - **I/O Errors**: A channel file could not be opened, written or read.
//! - **Capacity Errors**: A handle or file name does not fit its buffer or limit.
//! - **File Name Errors**: A derived file name would leave the output directory.
//! - **Shape Errors**: Numeric data does not match the label decomposition.
//! - **Parse Errors**: An mv1 file read back from disk is malformed.
//!
//! Grammar and shape errors are raised before any file is touched, so a failed
//! call never leaves a half-written file behind.
//!
//! ## Examples
//!
//! ```rust
//! use mv1::{Error, LabelSpec};
//!
//! let result = LabelSpec::parse("x; t");
//! assert!(matches!(result, Err(Error::Grammar { .. })));
//!
//! if let Err(err) = result {
//!     eprintln!("Label error: {}", err);
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Why a label string was rejected.
///
/// Every fault maps to the same [`Error::Grammar`] kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarFault {
    #[error("no semicolon separating inputs from outputs")]
    MissingSemicolon,

    #[error("more than one semicolon")]
    MultipleSemicolons,

    #[error("forbidden character {0:?} (labels cannot contain '_' or '-')")]
    ForbiddenChar(char),

    #[error("empty input segment")]
    EmptyInputs,

    #[error("empty output segment")]
    EmptyOutputs,

    #[error("empty label between separators")]
    EmptyLabel,

    #[error("labels must be separated by a comma")]
    MissingSeparator,

    #[error("time label 't' cannot be an output")]
    TimeAsOutput,

    #[error("time label 't' appears more than once")]
    DuplicateTime,

    #[error("label string longer than {max} bytes")]
    TooLong { max: usize },
}

/// Represents all possible errors raised by this crate.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Malformed label string
    #[error("Invalid label grammar at column {col}: {fault}\n{context}")]
    Grammar {
        col: usize,
        fault: GrammarFault,
        context: String,
    },

    /// File could not be opened, written or read
    #[error("IO error on {path}: {msg}")]
    Io { path: String, msg: String },

    /// Buffer or name limit too small for the labels
    #[error("Capacity exceeded: need {needed} bytes, have {capacity}")]
    Capacity { needed: usize, capacity: usize },

    /// Derived file name is not a plain name inside the output directory
    #[error("Unsafe file name {name:?}: must not contain path separators")]
    FileName { name: String },

    /// Numeric data does not match the label decomposition
    #[error("Shape mismatch for {what}: expected {expected}, found {found}")]
    Shape {
        what: String,
        expected: usize,
        found: usize,
    },

    /// Malformed mv1 text
    #[error("Parse error at line {line}, column {col}: {msg}")]
    Parse { line: usize, col: usize, msg: String },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a grammar error pointing at a 1-based column of `labels`.
    ///
    /// The context shows the label string with a caret under the column.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mv1::{Error, GrammarFault};
    ///
    /// let err = Error::grammar("x_1; u", 2, GrammarFault::ForbiddenChar('_'));
    /// assert!(err.to_string().contains("column 2"));
    /// ```
    pub fn grammar(labels: &str, col: usize, fault: GrammarFault) -> Self {
        let shown: String = labels
            .chars()
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .collect();
        let caret = format!("{}^", " ".repeat(col.saturating_sub(1)));
        Error::Grammar {
            col,
            fault,
            context: format!("  {}\n  {}", shown, caret),
        }
    }

    /// Creates an I/O error for a file path.
    pub fn io(path: impl AsRef<std::path::Path>, err: &std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().display().to_string(),
            msg: err.to_string(),
        }
    }

    /// Creates a capacity error.
    pub fn capacity(needed: usize, capacity: usize) -> Self {
        Error::Capacity { needed, capacity }
    }

    /// Creates an error for a file name that is not a single path component.
    pub fn file_name(name: &str) -> Self {
        Error::FileName {
            name: name.to_string(),
        }
    }

    /// Creates a shape error for a named piece of data.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mv1::Error;
    ///
    /// let err = Error::shape("row", 3, 2);
    /// assert!(err.to_string().contains("expected 3"));
    /// ```
    pub fn shape(what: &str, expected: usize, found: usize) -> Self {
        Error::Shape {
            what: what.to_string(),
            expected,
            found,
        }
    }

    /// Creates a parse error for mv1 text read back from disk.
    pub fn parse(line: usize, col: usize, msg: &str) -> Self {
        Error::Parse {
            line,
            col,
            msg: msg.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Returns the grammar fault if this is a grammar error.
    #[must_use]
    pub fn grammar_fault(&self) -> Option<&GrammarFault> {
        match self {
            Error::Grammar { fault, .. } => Some(fault),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
