//! Parse command: reflect one source file.

use std::path::Path;
use std::time::Instant;

use crate::config::Settings;
use crate::io::{Envelope, EnvelopeEntityType, ErrorDetails, ExitCode, ResultCode, render_outline};
use crate::parsing::{ParseError, PythonParser};

use super::print_envelope;

/// Run parse command and report the outcome as an exit code
pub fn run(file: &Path, module_name: Option<&str>, json: bool, settings: &Settings) -> ExitCode {
    let start = Instant::now();
    let include_locations = settings.output.include_locations;

    let result = PythonParser::new().and_then(|mut parser| parser.parse_file(file, module_name));
    let elapsed = start.elapsed().as_millis() as u64;

    match result {
        Ok(module) => {
            tracing::debug!(
                target: "cli",
                "Reflected {} in {elapsed}ms",
                module.module_name()
            );
            if json {
                let envelope = Envelope::success(module.to_json(include_locations))
                    .with_entity_type(EnvelopeEntityType::Module)
                    .with_count(module.walk().len())
                    .with_query(file.display().to_string())
                    .with_duration_ms(elapsed)
                    .with_message(format!("Reflected module '{}'", module.module_name()));
                print_envelope(&envelope, settings.output.pretty);
            } else {
                print!("{}", render_outline(&module, include_locations));
            }
            ExitCode::Success
        }
        Err(error) => report_error(file, &error, json, settings.output.pretty),
    }
}

fn report_error(file: &Path, error: &ParseError, json: bool, pretty: bool) -> ExitCode {
    let exit_code = ExitCode::from_parse_error(error);
    if json {
        let envelope: Envelope<()> = match exit_code {
            ExitCode::NotFound => Envelope::not_found(error.to_string())
                .with_hint("Check the file path"),
            _ => Envelope::error(result_code(error), error.to_string()).with_error_details(
                ErrorDetails {
                    suggestions: suggestions(error),
                    context: None,
                },
            ),
        };
        print_envelope(&envelope.with_query(file.display().to_string()), pretty);
    } else {
        eprintln!("Error: {error}");
    }
    exit_code
}

/// Problems in the input are parse errors; the rest are failures of the tool
fn result_code(error: &ParseError) -> ResultCode {
    match error {
        ParseError::Grammar { .. } | ParseError::Shape { .. } | ParseError::NoTree { .. } => {
            ResultCode::ParseError
        }
        _ => ResultCode::InternalError,
    }
}

fn suggestions(error: &ParseError) -> Vec<String> {
    if error.is_grammar_error() {
        vec!["Fix the syntax error and retry".to_string()]
    } else {
        Vec::new()
    }
}
