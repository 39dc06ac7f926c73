use pyreflect::Settings;
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_env_overrides_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("settings.toml");
    fs::write(
        &config_path,
        "[loader]\nparallel_threads = 2\n\n[output]\npretty = false\n",
    )
    .unwrap();

    unsafe {
        // Double underscore separates the section from the field
        env::set_var("PYREFLECT_LOADER__PARALLEL_THREADS", "7");
        env::set_var("PYREFLECT_LOGGING__DEFAULT", "debug");
    }

    let settings = Settings::load_from(&config_path).unwrap();

    unsafe {
        env::remove_var("PYREFLECT_LOADER__PARALLEL_THREADS");
        env::remove_var("PYREFLECT_LOGGING__DEFAULT");
    }

    assert_eq!(settings.loader.parallel_threads, 7);
    assert_eq!(settings.logging.default, "debug");
    assert!(!settings.output.pretty);
}
