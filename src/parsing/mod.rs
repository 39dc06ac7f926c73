pub mod cst;
pub mod docstring;
pub mod error;
pub mod paths;
pub mod python;
pub mod scanner;
pub mod signature;
pub mod trivia;

pub use cst::{NodeId, NodeKind, SyntaxTree};
pub use error::{ParseError, ParseResult};
pub use python::PythonParser;
pub use scanner::{Advance, ListScanner, ScanError};
