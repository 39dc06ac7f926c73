//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Reflect Python modules into classes, functions, signatures and docstrings
#[derive(Parser, Debug)]
#[command(
    name = "pyreflect",
    version = env!("CARGO_PKG_VERSION"),
    about = "Reflect Python modules into classes, functions, signatures and docstrings",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default .pyreflect/settings.toml in the current directory
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Reflect a single source file
    #[command(after_help = "Examples:\n  pyreflect parse src/app/models.py\n  pyreflect parse util.py --module-name app.util --json")]
    Parse {
        /// Python file to reflect
        file: PathBuf,

        /// Dotted module name (defaults to the file stem)
        #[arg(short, long)]
        module_name: Option<String>,

        /// Print the JSON envelope instead of the outline
        #[arg(long)]
        json: bool,
    },

    /// Discover and reflect modules and packages
    #[command(after_help = "Examples:\n  pyreflect load mypkg -p src\n  pyreflect load mypkg.sub tools --json")]
    Load {
        /// Dotted module or package names (defaults to loader.modules)
        #[arg(value_name = "MODULE")]
        modules: Vec<String>,

        /// Directory to search for modules, repeatable (overrides loader.search_path)
        #[arg(short = 'p', long = "search-path", value_name = "DIR")]
        search_path: Vec<PathBuf>,

        /// Number of threads to use (overrides config)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Print the JSON envelope instead of outlines
        #[arg(long)]
        json: bool,
    },

    /// Display the effective settings
    Config {
        /// Print the JSON envelope instead of TOML
        #[arg(long)]
        json: bool,
    },
}
