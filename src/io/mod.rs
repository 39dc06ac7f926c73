//! Output handling for the CLI.
//!
//! - JSON envelope shared by all commands
//! - Exit codes
//! - Plain-text outline of a reflection tree

pub mod envelope;
pub mod exit_code;
pub mod outline;

pub use envelope::{
    EntityType as EnvelopeEntityType, Envelope, ErrorDetails, MessageType, Meta, ResultCode,
    SCHEMA_VERSION, Status,
};
pub use exit_code::ExitCode;
pub use outline::{format_arguments, render_outline};
