//! Python declaration extraction
//!
//! Builds a [`crate::reflection::ReflectionTree`] from one Python source
//! file: module, class and function docstrings, signatures, decorators and
//! module/class level assignments. Function bodies and control flow are not
//! descended into.

pub mod parser;

pub use parser::PythonParser;
