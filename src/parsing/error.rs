//! Error types for reflection extraction.
//!
//! Every variant is fatal for the file being extracted. Callers that
//! process several files (see [`crate::loader`]) record the error and move
//! on to the next file.

use crate::parsing::cst::NodeKind;
use crate::parsing::scanner::ScanError;
use crate::reflection::TreeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    /// The text could not be parsed into a syntax tree at all.
    #[error("{}:{line}:{column}: syntax error: {message}", .file.display())]
    Grammar {
        file: PathBuf,
        line: u32,
        column: u32,
        message: String,
    },

    /// The syntax tree contains an arrangement the extractor does not accept.
    #[error("{}:{line}: unexpected {} node: {detail}", .file.display(), .kind.as_str())]
    Shape {
        kind: NodeKind,
        file: PathBuf,
        line: u32,
        detail: String,
    },

    #[error("Scanner contract violated: {0}")]
    Scan(#[from] ScanError),

    #[error("Reflection tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Failed to set language: {0}")]
    LanguageSetup(String),

    #[error("{}: parser produced no syntax tree", .file.display())]
    NoTree { file: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// Grammar failures come from the input; everything else is a contract failure
    pub fn is_grammar_error(&self) -> bool {
        matches!(self, Self::Grammar { .. } | Self::NoTree { .. })
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
