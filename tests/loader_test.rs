//! Module discovery and loading against real directory layouts.

use pyreflect::{LoaderError, ModuleLoader};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn sample_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "pkg/__init__.py", "\"\"\"The package.\"\"\"\n");
    write(root, "pkg/b.py", "def second():\n    pass\n");
    write(root, "pkg/a.py", "class First:\n    pass\n");
    write(root, "pkg/sub/__init__.py", "");
    write(root, "pkg/sub/c.py", "#: Nested value.\nVALUE = 1\n");
    write(root, "pkg/data/readme.py", "IGNORED = True\n");
    write(root, "pkg/notes.txt", "not python\n");
    write(root, "single.py", "X = 1\n");
    temp
}

#[test]
fn test_package_enumeration_order() {
    let temp = sample_project();
    let loader = ModuleLoader::new(vec![temp.path().to_path_buf()]);

    let files = loader.discover("pkg").unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.module_name.as_str()).collect();
    assert_eq!(names, vec!["pkg", "pkg.a", "pkg.b", "pkg.sub", "pkg.sub.c"]);
}

#[test]
fn test_load_reflects_every_file() {
    let temp = sample_project();
    let loader = ModuleLoader::new(vec![temp.path().to_path_buf()]).with_threads(2);

    let report = loader
        .load(&["pkg".to_string(), "single".to_string()])
        .unwrap();
    assert!(report.is_complete());

    let names: Vec<&str> = report.modules.iter().map(|m| m.module_name()).collect();
    assert_eq!(
        names,
        vec!["pkg", "pkg.a", "pkg.b", "pkg.sub", "pkg.sub.c", "single"]
    );
    assert_eq!(report.modules[0].root().docstring.as_deref(), Some("The package."));

    let nested = &report.modules[4];
    let value = nested.find("VALUE").unwrap();
    assert_eq!(value.docstring.as_deref(), Some("Nested value."));
    assert_eq!(nested.qualified_name(value.id), "pkg.sub.c.VALUE");
}

#[test]
fn test_failing_file_does_not_stop_others() {
    let temp = sample_project();
    write(temp.path(), "pkg/broken.py", "def broken(:\n");
    let loader = ModuleLoader::new(vec![temp.path().to_path_buf()]);

    let report = loader.load(&["pkg".to_string()]).unwrap();
    assert!(!report.is_complete());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].file.module_name, "pkg.broken");
    assert!(report.failures[0].error.is_grammar_error());
    assert_eq!(report.modules.len(), 5);
}

#[test]
fn test_resolution_precedence() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write(first.path(), "shared.py", "");
    write(first.path(), "shadowed/__init__.py", "");
    write(first.path(), "shadowed.py", "");
    write(second.path(), "shared/__init__.py", "");

    let loader = ModuleLoader::new(vec![first.path().to_path_buf(), second.path().to_path_buf()]);

    assert_eq!(loader.resolve("shared").unwrap(), first.path().join("shared.py"));
    assert_eq!(loader.resolve("shadowed").unwrap(), first.path().join("shadowed"));
}

#[test]
fn test_dotted_module_inside_package() {
    let temp = sample_project();
    let loader = ModuleLoader::new(vec![temp.path().to_path_buf()]);

    let files = loader.discover("pkg.sub.c").unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].module_name, "pkg.sub.c");
    assert_eq!(files[0].path, temp.path().join("pkg/sub/c.py"));
}

#[test]
fn test_missing_module() {
    let temp = sample_project();
    let loader = ModuleLoader::new(vec![temp.path().to_path_buf()]);

    let error = loader.load(&["pkg".to_string(), "missing".to_string()]).unwrap_err();
    match error {
        LoaderError::ModuleNotFound { name, search_path } => {
            assert_eq!(name, "missing");
            assert_eq!(search_path, vec![temp.path().to_path_buf()]);
        }
        other => panic!("unexpected error {other:?}"),
    }
}
