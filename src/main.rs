use anyhow::Context;
use clap::Parser;
use pyreflect::cli::commands::{init, load, parse};
use pyreflect::cli::{Cli, Commands};
use pyreflect::io::ExitCode;
use pyreflect::{Settings, logging};

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Settings::load().context("Failed to load configuration")?,
    };
    Ok(settings)
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Init must work even when the existing configuration is broken
    if let Commands::Init { force } = cli.command {
        logging::init();
        return init::run_init(force).into();
    }

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            logging::init();
            eprintln!("Error: {e:#}");
            return ExitCode::ConfigError.into();
        }
    };
    logging::init_with_config(&settings.logging);

    let code = match cli.command {
        Commands::Init { .. } => ExitCode::Success,
        Commands::Parse {
            file,
            module_name,
            json,
        } => parse::run(&file, module_name.as_deref(), json, &settings),
        Commands::Load {
            modules,
            search_path,
            threads,
            json,
        } => load::run(
            load::LoadArgs {
                modules,
                search_path,
                threads,
                json,
            },
            &settings,
        ),
        Commands::Config { json } => init::run_config(&settings, json),
    };
    code.into()
}
