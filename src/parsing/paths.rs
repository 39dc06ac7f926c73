//! Path utilities for module name computation
//!
//! All functions use `Path` APIs instead of string manipulation to handle
//! different path separators across operating systems.

use std::path::{Path, PathBuf};

/// Extension of Python source files, without the dot
pub const SOURCE_EXTENSION: &str = "py";

/// File that turns a directory into a package
pub const PACKAGE_INIT: &str = "__init__.py";

/// Default module name for a file: its stem (`pkg/util.py` -> `util`).
pub fn module_name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Relative directory path of a dotted module name (`a.b.c` -> `a/b/c`).
///
/// Returns `None` for names with empty components such as `a..b` or `.a`.
pub fn module_relative_path(module_name: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for part in module_name.split('.') {
        if part.is_empty() {
            return None;
        }
        path.push(part);
    }
    Some(path)
}

/// `parent.child`, or just `child` at the top level
pub fn join_module_name(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

pub fn is_python_source(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == SOURCE_EXTENSION)
}

pub fn is_package_dir(path: &Path) -> bool {
    path.join(PACKAGE_INIT).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_name_from_path() {
        assert_eq!(module_name_from_path(Path::new("pkg/util.py")), "util");
        assert_eq!(module_name_from_path(Path::new("pkg/__init__.py")), "__init__");
        assert_eq!(module_name_from_path(Path::new("script")), "script");
    }

    #[test]
    fn test_module_relative_path() {
        assert_eq!(
            module_relative_path("a.b.c"),
            Some(Path::new("a").join("b").join("c"))
        );
        assert_eq!(module_relative_path("single"), Some(PathBuf::from("single")));
        assert_eq!(module_relative_path("a..b"), None);
        assert_eq!(module_relative_path(""), None);
    }

    #[test]
    fn test_join_module_name() {
        assert_eq!(join_module_name("", "pkg"), "pkg");
        assert_eq!(join_module_name("pkg", "sub"), "pkg.sub");
    }

    #[test]
    fn test_is_python_source() {
        assert!(is_python_source(Path::new("mod.py")));
        assert!(!is_python_source(Path::new("mod.pyc")));
        assert!(!is_python_source(Path::new("README")));
    }
}
