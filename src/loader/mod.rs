//! Module and package discovery
//!
//! Resolves dotted module names against a search path and enumerates the
//! files of a package: each package's `__init__.py` first, then its modules
//! and subpackages in file name order. Files are reflected in parallel; a
//! file that fails to parse is reported and does not stop the others.

pub mod error;

pub use error::{LoaderError, LoaderResult};

use crate::config::LoaderConfig;
use crate::parsing::paths::{
    PACKAGE_INIT, SOURCE_EXTENSION, is_package_dir, is_python_source, join_module_name,
    module_name_from_path, module_relative_path,
};
use crate::parsing::{ParseError, PythonParser};
use crate::reflection::ReflectionTree;
use rayon::prelude::*;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Search path entry that expands to the directories listed in `PYTHONPATH`
pub const INHERIT_MARKER: &str = "*";

/// One file to reflect and the dotted name it is reflected under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub module_name: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, module_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            module_name: module_name.into(),
        }
    }
}

#[derive(Debug)]
pub struct LoadFailure {
    pub file: SourceFile,
    pub error: ParseError,
}

/// Outcome of loading a set of files, in discovery order
#[derive(Debug, Default)]
pub struct LoadReport {
    pub modules: Vec<ReflectionTree>,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Reachable entities over all modules, module roots included
    pub fn entity_count(&self) -> usize {
        self.modules.iter().map(|module| module.walk().len()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct ModuleLoader {
    search_path: Vec<PathBuf>,
    parallel_threads: usize,
}

impl ModuleLoader {
    /// An empty search path means the current directory.
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self {
            search_path: expand_search_path(search_path),
            parallel_threads: num_cpus::get(),
        }
    }

    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(config.search_path.clone()).with_threads(config.parallel_threads)
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.parallel_threads = threads.max(1);
        self
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Locate `module_name`: a package directory or a `.py` file.
    ///
    /// Search path entries are tried in order; within one entry a package
    /// shadows a module file of the same name.
    pub fn resolve(&self, module_name: &str) -> LoaderResult<PathBuf> {
        let relative = module_relative_path(module_name)
            .ok_or_else(|| LoaderError::InvalidModuleName(module_name.to_string()))?;

        for dir in &self.search_path {
            let package = dir.join(&relative);
            if is_package_dir(&package) {
                return Ok(package);
            }
            let file = package.with_extension(SOURCE_EXTENSION);
            if file.is_file() {
                return Ok(file);
            }
        }

        Err(LoaderError::ModuleNotFound {
            name: module_name.to_string(),
            search_path: self.search_path.clone(),
        })
    }

    /// Resolve `module_name` and list every file it consists of
    pub fn discover(&self, module_name: &str) -> LoaderResult<Vec<SourceFile>> {
        let path = self.resolve(module_name)?;
        enumerate(&path, module_name)
    }

    /// Discover and reflect all `modules`.
    ///
    /// Fails only if a module cannot be found; parse failures end up in the
    /// report.
    pub fn load(&self, modules: &[String]) -> LoaderResult<LoadReport> {
        let mut files = Vec::new();
        for name in modules {
            files.extend(self.discover(name)?);
        }
        self.load_files(files)
    }

    /// Reflect `files` on a worker pool, one parser per worker
    pub fn load_files(&self, files: Vec<SourceFile>) -> LoaderResult<LoadReport> {
        // Language setup failures concern every file, not one
        PythonParser::new()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.parallel_threads)
            .build()
            .map_err(|e| LoaderError::ThreadPool(e.to_string()))?;

        let results: Vec<Result<ReflectionTree, ParseError>> = pool.install(|| {
            files
                .par_iter()
                .map_init(PythonParser::new, |parser, file| {
                    let parser = parser
                        .as_mut()
                        .map_err(|e| ParseError::LanguageSetup(e.to_string()))?;
                    parser.parse_file(&file.path, Some(&file.module_name))
                })
                .collect()
        });

        let mut report = LoadReport::default();
        for (file, result) in files.into_iter().zip(results) {
            match result {
                Ok(module) => report.modules.push(module),
                Err(error) => {
                    tracing::warn!(
                        target: "loader",
                        "Failed to reflect {} ({}): {error}",
                        file.module_name,
                        file.path.display()
                    );
                    report.failures.push(LoadFailure { file, error });
                }
            }
        }

        tracing::info!(
            target: "loader",
            "Reflected {} modules ({} entities), {} failed",
            report.modules.len(),
            report.entity_count(),
            report.failures.len()
        );
        Ok(report)
    }
}

fn expand_search_path(entries: Vec<PathBuf>) -> Vec<PathBuf> {
    if entries.is_empty() {
        return vec![PathBuf::from(".")];
    }

    let mut expanded = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.as_os_str() == INHERIT_MARKER {
            if let Some(paths) = std::env::var_os("PYTHONPATH") {
                expanded.extend(std::env::split_paths(&paths));
            }
        } else {
            expanded.push(entry);
        }
    }
    expanded
}

/// Files of the module or package at `path`, named below `module_name`.
///
/// A package yields its `__init__.py` first, then its entries sorted by
/// file name, descending into subdirectories that are packages themselves.
pub fn enumerate(path: &Path, module_name: &str) -> LoaderResult<Vec<SourceFile>> {
    if path.is_file() {
        return Ok(vec![SourceFile::new(path, module_name)]);
    }
    if !is_package_dir(path) {
        return Err(LoaderError::PathNotFound(path.join(PACKAGE_INIT)));
    }

    let walker = WalkDir::new(path)
        .sort_by(|a, b| package_order(a).cmp(&package_order(b)))
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !entry.file_type().is_dir() || is_package_dir(entry.path())
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_python_source(entry.path()) {
            continue;
        }
        let relative = entry.path().strip_prefix(path).unwrap_or(entry.path());
        files.push(SourceFile::new(
            entry.path(),
            nested_module_name(module_name, relative),
        ));
    }
    Ok(files)
}

/// `__init__.py` sorts before everything else, the rest by file name
fn package_order(entry: &DirEntry) -> (bool, std::ffi::OsString) {
    (
        entry.file_name() != PACKAGE_INIT,
        entry.file_name().to_os_string(),
    )
}

fn nested_module_name(root: &str, relative: &Path) -> String {
    let mut name = root.to_string();
    if let Some(parent) = relative.parent() {
        for component in parent.components() {
            name = join_module_name(&name, &component.as_os_str().to_string_lossy());
        }
    }
    if relative.file_name() != Some(OsStr::new(PACKAGE_INIT)) {
        name = join_module_name(&name, &module_name_from_path(relative));
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_module_name() {
        assert_eq!(nested_module_name("pkg", Path::new("__init__.py")), "pkg");
        assert_eq!(nested_module_name("pkg", Path::new("util.py")), "pkg.util");
        assert_eq!(
            nested_module_name("pkg", &Path::new("sub").join("__init__.py")),
            "pkg.sub"
        );
        assert_eq!(
            nested_module_name("pkg", &Path::new("sub").join("deep.py")),
            "pkg.sub.deep"
        );
    }

    #[test]
    fn test_empty_search_path_is_current_dir() {
        let loader = ModuleLoader::new(Vec::new());
        assert_eq!(loader.search_path(), &[PathBuf::from(".")]);
    }

    #[test]
    fn test_invalid_module_name() {
        let loader = ModuleLoader::new(Vec::new());
        assert!(matches!(
            loader.resolve("pkg..mod"),
            Err(LoaderError::InvalidModuleName(_))
        ));
    }
}
