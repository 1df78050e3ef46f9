//! Integration tests for the application shell run loop

mod common;

use common::{project_dir, Harness, RecordingEnvManager};
use quill::cli::plugins::{ApplicationPlugin, ExecutablePlugin};
use quill::cli::RunState;
use quill::config::Settings;
use quill::infrastructure::io::Verbosity;
use quill::util::testing::with_routed_logs;

// ============================================================
// Plugins
// ============================================================

#[test]
fn given_two_runs_when_plugins_enabled_then_discovered_once() {
    // Arrange
    let mut harness = Harness::new(project_dir(Some(&[])));

    // Act
    let first = harness.run(&["greet"]);
    let second = harness.run(&["greet"]);

    // Assert
    assert_eq!(first, 0);
    assert_eq!(second, 0);
    assert_eq!(harness.discovery.calls(), 1);
    assert_eq!(
        harness.stdout.contents(),
        "hello from a plugin\nhello from a plugin\n"
    );
    assert!(harness.app.plugin_state().is_loaded());
}

#[test]
fn given_no_plugins_on_first_run_when_run_again_then_plugins_stay_unloaded() {
    // Arrange
    let mut harness = Harness::new(project_dir(Some(&[])));

    // Act
    let first = harness.run(&["--no-plugins", "about"]);
    let second = harness.run(&["greet"]);

    // Assert
    assert_eq!(first, 0);
    assert_eq!(second, quill::exitcode::USAGE);
    assert_eq!(harness.discovery.calls(), 0);
    assert!(harness.app.plugin_state().is_disabled());
}

#[test]
fn given_plugins_disabled_in_settings_when_run_then_discovery_skipped() {
    let mut settings = Settings::default();
    settings.plugins.enabled = false;
    let mut harness = Harness::with(
        project_dir(Some(&[])),
        settings,
        RecordingEnvManager::default(),
        0,
    );

    let code = harness.run(&["about"]);

    assert_eq!(code, 0);
    assert_eq!(harness.discovery.calls(), 0);
}

#[test]
fn given_executable_plugin_when_run_with_options_then_forwarded_verbatim() {
    // Arrange
    let mut harness = Harness::new(project_dir(Some(&[])));
    ExecutablePlugin::new("export", "/opt/plugins/quill-export")
        .activate(&mut harness.app)
        .unwrap();

    // Act
    let code = harness.run(&["--no-plugins", "export", "--format", "json", "-v", "--help"]);

    // Assert
    assert_eq!(code, 0);
    assert_eq!(harness.app.io().verbosity(), Verbosity::Normal);
    let runs = harness.runner.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].cmd, "/opt/plugins/quill-export");
    assert_eq!(runs[0].args, vec!["--format", "json", "-v", "--help"]);
    assert!(runs[0].inherited);
}

#[test]
fn given_executable_plugin_when_global_option_precedes_it_then_applies_to_shell() {
    let mut harness = Harness::new(project_dir(Some(&[])));
    ExecutablePlugin::new("export", "/opt/plugins/quill-export")
        .activate(&mut harness.app)
        .unwrap();

    let code = harness.run(&["-vv", "export", "--format", "json"]);

    assert_eq!(code, 0);
    assert_eq!(harness.app.io().verbosity(), Verbosity::VeryVerbose);
    assert_eq!(harness.runner.runs()[0].args, vec!["--format", "json"]);
}

// ============================================================
// Errors and solutions
// ============================================================

#[test]
fn given_unknown_namespaced_command_when_run_then_usage_error_and_solutions_built() {
    // Arrange
    let mut harness = Harness::new(project_dir(Some(&[])));
    assert!(!harness.app.has_solution_repository());

    // Act
    let code = harness.run(&["cache", "clear"]);

    // Assert
    assert_eq!(code, quill::exitcode::USAGE);
    assert_eq!(harness.app.state(), RunState::Failed);
    assert!(harness.app.has_solution_repository());
    assert!(harness
        .stderr
        .contents()
        .contains("the command \"cache\" does not exist"));
}

#[test]
fn given_successful_run_when_finished_then_no_solution_repository() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    let code = harness.run(&["about"]);

    assert_eq!(code, 0);
    assert_eq!(harness.app.state(), RunState::Succeeded);
    assert!(!harness.app.has_solution_repository());
}

#[test]
fn given_misspelled_command_when_run_then_suggestion_rendered() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    let code = harness.run(&["--no-plugins", "instal"]);

    assert_eq!(code, quill::exitcode::USAGE);
    let err = harness.stderr.contents();
    assert!(err.contains("Did you mean one of these?"), "{err}");
    assert!(err.contains("\n    install\n"), "{err}");
    assert!(!err.contains("        install"), "{err}");
}

#[test]
fn given_missing_lock_file_when_check_then_warns_about_lock() {
    // Arrange
    let mut harness = Harness::new(project_dir(None));

    // Act
    let code = harness.run(&["--no-plugins", "check"]);

    // Assert: check only warns about the lock file
    assert_eq!(code, 0);
    assert!(harness.stdout.contents().contains("quill.lock"));
}

// ============================================================
// Install
// ============================================================

#[test]
fn given_no_plugins_install_when_run_then_installer_attached_and_run() {
    // Arrange
    let mut harness = Harness::new(project_dir(Some(&[("requests", "2.31.0")])));

    // Act
    let code = harness.run(&["--no-plugins", "install"]);

    // Assert
    assert_eq!(code, 0);
    assert_eq!(harness.discovery.calls(), 0);
    assert_eq!(harness.env_manager.call_count(), 1);
    let log = harness.installers.log();
    assert_eq!(log.builds, 1);
    assert_eq!(log.runs, 1);
    assert_eq!(log.dry_run, Some(false));
    assert_eq!(log.use_executor, Some(true));
}

#[test]
fn given_dry_run_option_when_install_then_installer_told() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    let code = harness.run(&["install", "--dry-run"]);

    assert_eq!(code, 0);
    assert_eq!(harness.installers.log().dry_run, Some(true));
}

#[test]
fn given_two_install_runs_when_run_then_each_gets_fresh_configuration() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    harness.run(&["install"]);
    harness.run(&["install"]);

    assert_eq!(harness.installers.log().builds, 2);
    assert_eq!(harness.env_manager.call_count(), 2);
}

#[test]
fn given_env_creation_failure_when_install_then_software_error() {
    let mut harness = Harness::with(
        project_dir(Some(&[])),
        Settings::default(),
        RecordingEnvManager::failing(),
        0,
    );

    let code = harness.run(&["install"]);

    assert_eq!(code, quill::exitcode::SOFTWARE);
    assert!(harness.stderr.contents().contains("python3 not found"));
    assert_eq!(harness.installers.log().builds, 0);
}

// ============================================================
// Pass-through run
// ============================================================

#[test]
fn given_run_with_trailing_options_when_run_then_forwarded_untouched() {
    // Arrange
    let mut harness = Harness::with(
        project_dir(Some(&[])),
        Settings::default(),
        RecordingEnvManager::default(),
        5,
    );

    // Act
    let code = harness.run(&["run", "pytest", "-v", "--bar", "baz"]);

    // Assert
    assert_eq!(code, 5);
    assert_eq!(harness.app.io().verbosity(), Verbosity::Normal);
    let runs = harness.runner.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].cmd, "pytest");
    assert_eq!(runs[0].args, vec!["-v", "--bar", "baz"]);
    assert!(runs[0].inherited);
}

#[test]
fn given_global_option_before_run_when_run_then_applies_to_shell() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    let code = harness.run(&["--verbose", "run", "foo", "--bar", "baz"]);

    assert_eq!(code, 0);
    assert_eq!(harness.app.io().verbosity(), Verbosity::Verbose);
    assert_eq!(harness.runner.runs()[0].args, vec!["--bar", "baz"]);
    assert!(harness.stdout.contents().contains("Using virtualenv:"));
}

#[test]
fn given_no_plugins_after_run_when_run_then_forwarded_and_plugins_still_load() {
    // Arrange
    let mut harness = Harness::new(project_dir(Some(&[])));

    // Act
    let code = harness.run(&["run", "mytool", "--no-plugins"]);

    // Assert
    assert_eq!(code, 0);
    assert_eq!(harness.discovery.calls(), 1);
    assert!(!harness.app.plugin_state().is_disabled());
    assert_eq!(harness.runner.runs()[0].args, vec!["--no-plugins"]);
}

#[test]
fn given_no_plugins_before_run_when_run_then_plugins_disabled() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    let code = harness.run(&["--no-plugins", "run", "mytool"]);

    assert_eq!(code, 0);
    assert_eq!(harness.discovery.calls(), 0);
    assert!(harness.app.plugin_state().is_disabled());
}

#[test]
fn given_version_option_after_run_when_run_then_tool_executed() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    let code = harness.run(&["run", "mytool", "-V"]);

    assert_eq!(code, 0);
    assert!(!harness.stdout.contents().contains(env!("CARGO_PKG_VERSION")));
    assert_eq!(harness.runner.runs()[0].args, vec!["-V"]);
}

#[test]
fn given_no_interaction_after_run_when_run_then_shell_stays_interactive() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    harness.run(&["run", "mytool", "-n", "--no-ansi"]);

    assert!(harness.app.io().is_interactive());
    assert_eq!(harness.runner.runs()[0].args, vec!["-n", "--no-ansi"]);
}

#[test]
fn given_run_without_command_when_run_then_usage_error() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    let code = harness.run(&["run"]);

    assert_eq!(code, quill::exitcode::USAGE);
    assert!(harness.runner.runs().is_empty());
}

// ============================================================
// Global options and default command
// ============================================================

#[test]
fn given_version_option_when_run_then_prints_version() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    let code = harness.run(&["--version"]);

    assert_eq!(code, 0);
    assert!(harness
        .stdout
        .contents()
        .contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn given_no_command_when_run_then_lists_commands() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    let code = harness.run(&[]);

    assert_eq!(code, 0);
    let out = harness.stdout.contents();
    assert!(out.contains("install"), "{out}");
    assert!(out.contains("info"), "{out}");
}

#[test]
fn given_quiet_and_verbose_when_run_then_quiet_wins() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    harness.run(&["-q", "-vvv", "about"]);

    assert_eq!(harness.app.io().verbosity(), Verbosity::Quiet);
}

#[test]
fn given_successive_runs_when_verbosity_differs_then_reset_between_runs() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    harness.run(&["-vv", "about"]);
    let first = harness.app.io().verbosity();
    harness.run(&["about"]);

    assert_eq!(first, Verbosity::VeryVerbose);
    assert_eq!(harness.app.io().verbosity(), Verbosity::Normal);
}

#[test]
fn given_namespaced_command_when_run_then_resolved_with_its_options() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    let code = harness.run(&["env", "info", "--path"]);

    assert_eq!(code, 0);
    assert_eq!(
        harness.stdout.contents().trim(),
        harness.dir.path().join(".venv").display().to_string()
    );
}

#[test]
fn given_plugin_command_when_completions_then_script_lists_it() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    let code = harness.run(&["completions", "bash"]);

    assert_eq!(code, 0);
    let script = harness.stdout.contents();
    assert!(script.contains("greet"), "{script}");
    assert!(script.contains("install"), "{script}");
}

#[test]
fn given_help_option_when_run_then_command_not_executed() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    let code = harness.run(&["install", "--help"]);

    assert_eq!(code, 0);
    assert_eq!(harness.installers.log().runs, 0);
    assert!(harness.stdout.contents().contains("--dry-run"));
}

#[test]
fn given_unknown_option_when_run_then_usage_error() {
    let mut harness = Harness::new(project_dir(Some(&[])));

    let code = harness.run(&["about", "--frobnicate"]);

    assert_eq!(code, quill::exitcode::USAGE);
}

// ============================================================
// Output-bound logging
// ============================================================

#[test]
fn given_unlocked_project_when_install_then_locker_warning_on_command_output() {
    // Arrange
    let mut harness = Harness::new(project_dir(None));
    let router = harness.app.log_router().clone();

    // Act
    let code = with_routed_logs(&router, || harness.run(&["install"]));

    // Assert
    assert_eq!(code, 0);
    assert!(harness.stdout.contents().contains("no lock file at"));
}

#[test]
fn given_command_without_loggers_when_project_warns_then_nothing_routed() {
    let mut harness = Harness::new(project_dir(None));
    let router = harness.app.log_router().clone();

    let code = with_routed_logs(&router, || harness.run(&["env", "info", "--path"]));

    assert_eq!(code, 0);
    assert!(!harness.stdout.contents().contains("no lock file at"));
}
