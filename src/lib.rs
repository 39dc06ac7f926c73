pub mod cli;
pub mod config;
pub mod io;
pub mod loader;
pub mod logging;
pub mod parsing;
pub mod reflection;
pub mod types;

pub use config::Settings;
pub use loader::{LoadFailure, LoadReport, LoaderError, ModuleLoader, SourceFile};
pub use parsing::{ParseError, ParseResult, PythonParser};
pub use reflection::{
    Argument, ArgumentKind, Class, Data, Decorator, Entity, EntityKind, Function, ReflectionTree,
    TreeError,
};
pub use types::{EntityId, Expression, Location};
