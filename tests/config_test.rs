//! Integration tests for layered settings and the config command
//!
//! Precedence, lowest first: compiled defaults, global file, project
//! `.quill.toml`, `QUILL_*` environment variables.
//!
//! Note: these tests never read the user's global config; an explicit
//! global path inside a temp directory is passed instead.

mod common;

use std::fs;

use tempfile::TempDir;

use common::{project_dir, Harness, RecordingEnvManager};
use quill::config::{local_config_path, Settings};

// ============================================================
// Settings::load_from()
// ============================================================

#[test]
fn given_global_file_when_load_then_overrides_defaults() {
    // Arrange
    let global_dir = TempDir::new().unwrap();
    let global = global_dir.path().join("config.toml");
    fs::write(&global, "[virtualenvs]\nin-project = true\ncreate = false\n").unwrap();

    // Act
    let settings = Settings::load_from(Some(global.as_path()), None).expect("load settings");

    // Assert
    assert!(settings.virtualenvs.in_project);
    assert!(!settings.virtualenvs.create);
    assert!(settings.experimental.new_installer, "untouched default");
}

#[test]
fn given_project_file_when_load_then_overrides_global() {
    // Arrange
    let global_dir = TempDir::new().unwrap();
    let global = global_dir.path().join("config.toml");
    fs::write(&global, "[experimental]\nnew-installer = true\n").unwrap();
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        "[experimental]\nnew-installer = false\n",
    )
    .unwrap();

    // Act
    let settings = Settings::load_from(Some(global.as_path()), Some(project.path())).unwrap();

    // Assert
    assert!(!settings.experimental.new_installer);
    assert!(!settings.get_bool("experimental.new-installer", true));
}

#[test]
fn given_missing_files_when_load_then_defaults() {
    let empty = TempDir::new().unwrap();

    let settings =
        Settings::load_from(Some(empty.path().join("absent.toml").as_path()), Some(empty.path())).unwrap();

    assert!(settings.plugins.enabled);
    assert!(settings.virtualenvs.create);
}

#[test]
fn given_malformed_project_file_when_load_then_config_error() {
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), "[virtualenvs\ncreate = ").unwrap();

    let err = Settings::load_from(None, Some(project.path())).unwrap_err();

    assert!(matches!(
        err,
        quill::application::ApplicationError::Config { .. }
    ));
}

#[test]
fn given_tilde_plugin_path_when_load_then_expanded() {
    let global_dir = TempDir::new().unwrap();
    let global = global_dir.path().join("config.toml");
    fs::write(&global, "[plugins]\npath = \"~/quill-plugins\"\n").unwrap();

    let settings = Settings::load_from(Some(global.as_path()), None).unwrap();

    assert!(!settings.plugins.path.to_string_lossy().starts_with('~'));
    assert!(settings.plugins.path.ends_with("quill-plugins"));
}

#[test]
fn given_settings_when_to_toml_then_renders_tables() {
    let settings = Settings::default();

    let rendered = settings.to_toml().unwrap();

    assert!(rendered.contains("[experimental]"));
    assert!(rendered.contains("new_installer = true"));
}

// ============================================================
// config command
// ============================================================

#[test]
fn given_project_settings_when_config_key_then_project_value_shown() {
    // Arrange
    let mut settings = Settings::default();
    settings.experimental.new_installer = false;
    let mut harness = Harness::with(
        project_dir(Some(&[])),
        settings,
        RecordingEnvManager::default(),
        0,
    );

    // Act
    let code = harness.run(&["config", "experimental.new-installer"]);

    // Assert
    assert_eq!(code, 0);
    assert_eq!(harness.stdout.contents(), "false\n");
}

#[test]
fn given_table_key_when_config_then_nested_entries_shown() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    harness.run(&["config", "virtualenvs"]);

    let out = harness.stdout.contents();
    assert!(out.contains("virtualenvs.create = true"), "{out}");
    assert!(out.contains("virtualenvs.in_project = false"), "{out}");
    assert!(!out.contains("plugins."), "{out}");
}

#[test]
fn given_list_option_when_config_then_every_setting_shown() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    let code = harness.run(&["config", "--list"]);

    assert_eq!(code, 0);
    let out = harness.stdout.contents();
    for key in ["cache_dir", "experimental.new_installer", "plugins.enabled"] {
        assert!(out.contains(key), "{key} missing from {out}");
    }
}

#[test]
fn given_unknown_key_when_config_then_config_exit_code() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    let code = harness.run(&["config", "no.such.key"]);

    assert_eq!(code, quill::exitcode::CONFIG);
    assert!(harness.stderr.contents().contains("there is no no.such.key setting"));
}
