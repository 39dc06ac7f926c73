//! JSON output envelope for all CLI commands.
//!
//! Every command prints this structure when `--json` is used, so scripts
//! can rely on `status`/`code` without parsing the payload.

use serde::{Deserialize, Serialize};

use crate::io::exit_code::ExitCode;

/// Schema version for this envelope format.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Message type for stream discrimination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Successful result (may contain data or be empty)
    Result,
    /// Error occurred
    Error,
}

/// Operation outcome status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    NotFound,
    /// Some files were reflected, some failed
    PartialSuccess,
    Error,
}

/// Machine-readable result codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    Ok,
    NotFound,
    ParseError,
    ConfigError,
    PartialFailure,
    InternalError,
}

impl ResultCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NotFound => "NOT_FOUND",
            Self::ParseError => "PARSE_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::PartialFailure => "PARTIAL_FAILURE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Ok => ExitCode::Success,
            Self::NotFound => ExitCode::NotFound,
            Self::ParseError | Self::InternalError => ExitCode::ParseError,
            Self::ConfigError => ExitCode::ConfigError,
            Self::PartialFailure => ExitCode::PartialSuccess,
        }
    }
}

/// Entity type in the data payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A single reflected module
    Module,
    /// Reflected modules plus load failures
    LoadReport,
    Settings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    #[serde(rename = "type")]
    pub message_type: MessageType,

    pub status: Status,

    pub code: ResultCode,

    /// Process exit code (0-255)
    pub exit_code: u8,

    /// Human-readable message
    pub message: String,

    /// Suggested next step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,

    /// Result payload (null on error)
    pub data: Option<T>,

    /// Error details (null on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,

    pub meta: Meta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub schema_version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,

    /// Number of items in data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    /// File or module names the command was run on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            entity_type: None,
            count: None,
            query: None,
            duration_ms: None,
        }
    }
}

impl<T> Envelope<T> {
    fn new(message_type: MessageType, status: Status, code: ResultCode, message: String) -> Self {
        Self {
            message_type,
            status,
            code,
            exit_code: code.exit_code().code(),
            message,
            hint: None,
            data: None,
            error: None,
            meta: Meta::default(),
        }
    }

    pub fn success(data: T) -> Self {
        let mut envelope = Self::new(
            MessageType::Result,
            Status::Success,
            ResultCode::Ok,
            "Operation completed successfully".to_string(),
        );
        envelope.data = Some(data);
        envelope
    }

    /// Data for the parts that worked, failures in the error context
    pub fn partial(data: T, message: impl Into<String>) -> Self {
        let mut envelope = Self::new(
            MessageType::Result,
            Status::PartialSuccess,
            ResultCode::PartialFailure,
            message.into(),
        );
        envelope.data = Some(data);
        envelope
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(
            MessageType::Result,
            Status::NotFound,
            ResultCode::NotFound,
            message.into(),
        )
    }

    pub fn error(code: ResultCode, message: impl Into<String>) -> Self {
        Self::new(MessageType::Error, Status::Error, code, message.into())
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_entity_type(mut self, entity_type: EntityType) -> Self {
        self.meta.entity_type = Some(entity_type);
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.meta.count = Some(count);
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.meta.query = Some(query.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.meta.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_error_details(mut self, details: ErrorDetails) -> Self {
        self.error = Some(details);
        self
    }

    /// Serialize to JSON, pretty-printed or compact
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error>
    where
        T: Serialize,
    {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let envelope = Envelope::success(vec!["pkg", "pkg.util"])
            .with_entity_type(EntityType::LoadReport)
            .with_count(2)
            .with_message("Reflected 2 modules");

        assert_eq!(envelope.message_type, MessageType::Result);
        assert_eq!(envelope.status, Status::Success);
        assert_eq!(envelope.code, ResultCode::Ok);
        assert_eq!(envelope.exit_code, 0);
        assert_eq!(envelope.meta.count, Some(2));
        assert!(envelope.data.is_some());
    }

    #[test]
    fn test_not_found_envelope() {
        let envelope: Envelope<()> =
            Envelope::not_found("Module 'missing' not found").with_hint("Check the search path");

        assert_eq!(envelope.status, Status::NotFound);
        assert_eq!(envelope.exit_code, 1);
        assert!(envelope.data.is_none());
        assert!(envelope.hint.is_some());
    }

    #[test]
    fn test_error_envelope_exit_codes() {
        let parse: Envelope<()> = Envelope::error(ResultCode::ParseError, "bad.py:2:7: syntax error")
            .with_error_details(ErrorDetails {
                suggestions: vec!["Fix the syntax error and retry".to_string()],
                context: None,
            });
        assert_eq!(parse.message_type, MessageType::Error);
        assert_eq!(parse.exit_code, 2);
        assert!(parse.error.is_some());

        let config: Envelope<()> = Envelope::error(ResultCode::ConfigError, "invalid TOML");
        assert_eq!(config.exit_code, 3);
    }

    #[test]
    fn test_internal_error_envelope() {
        let envelope: Envelope<()> =
            Envelope::error(ResultCode::InternalError, "Failed to build worker pool");
        assert_eq!(envelope.code.as_str(), "INTERNAL_ERROR");
        assert_eq!(envelope.exit_code, 2);
    }

    #[test]
    fn test_partial_envelope() {
        let envelope = Envelope::partial(vec![1], "1 of 2 files failed");
        assert_eq!(envelope.status, Status::PartialSuccess);
        assert_eq!(envelope.exit_code, 4);
    }

    #[test]
    fn test_json_serialization() {
        let envelope = Envelope::success(serde_json::json!({"name": "pkg"}))
            .with_entity_type(EntityType::Module)
            .with_count(1);

        let json = envelope.to_json(true).unwrap();
        assert!(json.contains("\"type\": \"result\""));
        assert!(json.contains("\"status\": \"success\""));
        assert!(json.contains("\"entity_type\": \"module\""));
        assert!(!envelope.to_json(false).unwrap().contains('\n'));
    }
}
