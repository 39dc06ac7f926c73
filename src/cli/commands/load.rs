//! Load command: discover modules and packages and reflect every file.

use std::path::PathBuf;
use std::time::Instant;

use serde_json::{Value, json};

use crate::config::Settings;
use crate::io::{Envelope, EnvelopeEntityType, ErrorDetails, ExitCode, ResultCode, render_outline};
use crate::loader::{LoadReport, ModuleLoader};

use super::print_envelope;

/// Command line overrides for the `[loader]` settings
#[derive(Debug, Default)]
pub struct LoadArgs {
    pub modules: Vec<String>,
    pub search_path: Vec<PathBuf>,
    pub threads: Option<usize>,
    pub json: bool,
}

pub fn run(args: LoadArgs, settings: &Settings) -> ExitCode {
    let pretty = settings.output.pretty;
    let modules = if args.modules.is_empty() {
        settings.loader.modules.clone()
    } else {
        args.modules
    };

    if modules.is_empty() {
        let message = "No modules given and loader.modules is empty";
        if args.json {
            let envelope: Envelope<()> = Envelope::error(ResultCode::ConfigError, message)
                .with_hint("Pass module names or set loader.modules in settings.toml");
            print_envelope(&envelope, pretty);
        } else {
            eprintln!("Error: {message}");
        }
        return ExitCode::ConfigError;
    }

    let mut config = settings.loader.clone();
    if !args.search_path.is_empty() {
        config.search_path = args.search_path;
    }
    if let Some(threads) = args.threads {
        config.parallel_threads = threads;
    }
    let loader = ModuleLoader::from_config(&config);
    let query = modules.join(" ");

    let start = Instant::now();
    let report = match loader.load(&modules) {
        Ok(report) => report,
        Err(error) => {
            let exit_code = ExitCode::from_loader_error(&error);
            if args.json {
                let envelope: Envelope<()> = match exit_code {
                    ExitCode::NotFound => Envelope::not_found(error.to_string())
                        .with_hint("Check the module name and --search-path"),
                    _ => Envelope::error(ResultCode::InternalError, error.to_string()),
                };
                print_envelope(&envelope.with_query(query), pretty);
            } else {
                eprintln!("Error: {error}");
            }
            return exit_code;
        }
    };
    let elapsed = start.elapsed().as_millis() as u64;

    if args.json {
        print_report(&report, &query, elapsed, settings);
    } else {
        for module in &report.modules {
            print!("{}", render_outline(module, settings.output.include_locations));
        }
        for failure in &report.failures {
            eprintln!("Failed: {}: {}", failure.file.module_name, failure.error);
        }
    }

    if report.is_complete() {
        ExitCode::Success
    } else {
        ExitCode::PartialSuccess
    }
}

fn failures_json(report: &LoadReport) -> Vec<Value> {
    report
        .failures
        .iter()
        .map(|failure| {
            json!({
                "module": failure.file.module_name,
                "path": failure.file.path.display().to_string(),
                "error": failure.error.to_string(),
            })
        })
        .collect()
}

fn print_report(report: &LoadReport, query: &str, elapsed: u64, settings: &Settings) {
    let modules: Vec<Value> = report
        .modules
        .iter()
        .map(|module| module.to_json(settings.output.include_locations))
        .collect();
    let failures = failures_json(report);
    let data = json!({ "modules": modules, "failures": failures });

    let envelope = if report.is_complete() {
        Envelope::success(data).with_message(format!("Reflected {} modules", modules.len()))
    } else {
        Envelope::partial(
            data,
            format!(
                "Reflected {} modules, {} failed",
                modules.len(),
                report.failures.len()
            ),
        )
        .with_error_details(ErrorDetails {
            suggestions: vec!["Fix the failing files and retry".to_string()],
            context: Some(Value::Array(failures_json(report))),
        })
    };

    let envelope = envelope
        .with_entity_type(EnvelopeEntityType::LoadReport)
        .with_count(report.modules.len())
        .with_query(query)
        .with_duration_ms(elapsed);
    print_envelope(&envelope, settings.output.pretty);
}
