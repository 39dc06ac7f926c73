//! Process exit codes.

use crate::loader::LoaderError;
use crate::parsing::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    /// Module, package or file not found
    NotFound = 1,
    /// Syntax error or unsupported construct in a source file
    ParseError = 2,
    ConfigError = 3,
    /// Some files of a load failed
    PartialSuccess = 4,
}

impl ExitCode {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_parse_error(error: &ParseError) -> Self {
        match error {
            ParseError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                Self::NotFound
            }
            _ => Self::ParseError,
        }
    }

    pub fn from_loader_error(error: &LoaderError) -> Self {
        match error {
            LoaderError::ModuleNotFound { .. }
            | LoaderError::PathNotFound(_)
            | LoaderError::InvalidModuleName(_) => Self::NotFound,
            LoaderError::Parser(e) => Self::from_parse_error(e),
            LoaderError::Walk { .. } | LoaderError::ThreadPool(_) => Self::ParseError,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code())
    }
}
