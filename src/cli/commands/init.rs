//! Init and Config commands.

use crate::config::Settings;
use crate::io::{Envelope, EnvelopeEntityType, ExitCode, ResultCode};

use super::print_envelope;

/// Create `.pyreflect/settings.toml` in the current directory
pub fn run_init(force: bool) -> ExitCode {
    match Settings::init_config_file(".", force) {
        Ok(path) => {
            println!("Created configuration file at: {}", path.display());
            println!("Edit this file to customize your settings.");
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::ConfigError
        }
    }
}

/// Display the effective configuration
pub fn run_config(settings: &Settings, json: bool) -> ExitCode {
    if json {
        let envelope = match serde_json::to_value(settings) {
            Ok(value) => Envelope::success(value)
                .with_entity_type(EnvelopeEntityType::Settings)
                .with_message("Effective settings"),
            Err(e) => Envelope::error(
                ResultCode::InternalError,
                format!("Failed to serialize settings: {e}"),
            ),
        };
        print_envelope(&envelope, settings.output.pretty);
        return envelope.code.exit_code();
    }

    println!("Current Configuration:");
    println!("{}", "=".repeat(50));
    match settings.to_toml() {
        Ok(toml_str) => {
            println!("{toml_str}");
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error displaying config: {e}");
            ExitCode::ConfigError
        }
    }
}
