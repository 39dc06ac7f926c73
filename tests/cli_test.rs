//! End-to-end runs of the `pyreflect` binary.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn pyreflect(dir: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_pyreflect"));
    command.current_dir(dir.path()).env_remove("RUST_LOG");
    command
}

#[test]
fn test_init_creates_settings() {
    let temp = TempDir::new().unwrap();

    let output = pyreflect(&temp).arg("init").output().unwrap();
    assert!(output.status.success());

    let content = fs::read_to_string(temp.path().join(".pyreflect/settings.toml")).unwrap();
    assert!(content.contains("[loader]"));
    assert!(content.contains("[output]"));

    let again = pyreflect(&temp).arg("init").output().unwrap();
    assert_eq!(again.status.code(), Some(3));
    let forced = pyreflect(&temp).args(["init", "--force"]).output().unwrap();
    assert!(forced.status.success());
}

#[test]
fn test_parse_outline_and_json() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("shapes.py"),
        "class Square(Shape):\n    \"\"\"A square.\"\"\"\n\n    def area(self) -> float:\n        pass\n",
    )
    .unwrap();

    let output = pyreflect(&temp).args(["parse", "shapes.py"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("module shapes  [shapes.py:1]\n"));
    assert!(stdout.contains("class Square(Shape)"));
    assert!(stdout.contains("# A square."));
    assert!(stdout.contains("def area(self) -> float"));

    let output = pyreflect(&temp)
        .args(["parse", "shapes.py", "--module-name", "geo.shapes", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope["status"], "success");
    assert_eq!(envelope["data"]["name"], "geo.shapes");
    assert_eq!(envelope["data"]["members"][0]["bases"][0], "Shape");
}

#[test]
fn test_exit_codes() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("bad.py"), "def broken(:\n").unwrap();

    let missing = pyreflect(&temp).args(["parse", "nope.py"]).output().unwrap();
    assert_eq!(missing.status.code(), Some(1));

    let bad = pyreflect(&temp).args(["parse", "bad.py"]).output().unwrap();
    assert_eq!(bad.status.code(), Some(2));

    let not_found = pyreflect(&temp).args(["load", "nothing"]).output().unwrap();
    assert_eq!(not_found.status.code(), Some(1));
}

#[test]
fn test_load_partial_failure() {
    let temp = TempDir::new().unwrap();
    let pkg = temp.path().join("src/pkg");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(pkg.join("__init__.py"), "").unwrap();
    fs::write(pkg.join("good.py"), "X = 1\n").unwrap();
    fs::write(pkg.join("bad.py"), "def broken(:\n").unwrap();

    let output = pyreflect(&temp)
        .args(["load", "pkg", "-p", "src", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));

    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope["status"], "partial_success");
    assert_eq!(envelope["data"]["modules"].as_array().unwrap().len(), 2);
    assert_eq!(envelope["data"]["failures"][0]["module"], "pkg.bad");
}

#[test]
fn test_load_uses_configured_modules() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join(".pyreflect")).unwrap();
    fs::write(
        temp.path().join(".pyreflect/settings.toml"),
        "[loader]\nmodules = [\"tool\"]\nsearch_path = [\"lib\"]\n",
    )
    .unwrap();
    fs::create_dir_all(temp.path().join("lib")).unwrap();
    fs::write(temp.path().join("lib/tool.py"), "def main():\n    pass\n").unwrap();

    let output = pyreflect(&temp).arg("load").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("module tool"));
    assert!(stdout.contains("def main()"));
}

#[test]
fn test_config_json_envelope() {
    let temp = TempDir::new().unwrap();

    let output = pyreflect(&temp).args(["config", "--json"]).output().unwrap();
    assert!(output.status.success());

    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope["meta"]["entity_type"], "settings");
    assert_eq!(envelope["data"]["logging"]["default"], "warn");
    assert!(envelope["data"]["loader"]["parallel_threads"].as_u64().unwrap() > 0);
}
