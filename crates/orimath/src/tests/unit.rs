//! Unit tests for bootstrap, sessions and the process entry point.

use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8Path;
use mockall::{Sequence, mock};
use orimath_config::{Config, PluginSetting};
use rstest::{fixture, rstest};

use super::support::{
    ArgsConfigLoader, BrokenSource, FailingConfigLoader, HealthEvent, SettingsDir,
    recording_reporter,
};
use crate::bootstrap::{BootstrapError, StaticConfigLoader, bootstrap_with};
use crate::builtin::{BuiltinPlugins, MeasureViewPlugin};
use crate::health::HealthReporter;
use crate::session::{Outcome, SessionError, SessionSummary};

mock! {
    Reporter {}

    impl HealthReporter for Reporter {
        fn bootstrap_starting(&self);
        fn bootstrap_succeeded(&self, config: &Config, setting: &PluginSetting);
        fn bootstrap_failed(&self, error: &BootstrapError);
        fn session_ready(&self, executed: usize, failed: usize);
        fn session_failed(&self, error: &SessionError);
        fn order_persisted(&self, path: &Utf8Path);
    }
}

#[fixture]
fn settings() -> SettingsDir {
    SettingsDir::new()
}

fn static_loader(settings: &SettingsDir) -> StaticConfigLoader {
    StaticConfigLoader::new(Config::default().with_plugin_settings(settings.path()))
}

#[rstest]
fn bootstrap_reports_start_then_success(settings: SettingsDir) {
    let mut reporter = MockReporter::new();
    let mut sequence = Sequence::new();
    reporter
        .expect_bootstrap_starting()
        .times(1)
        .in_sequence(&mut sequence)
        .return_const(());
    reporter
        .expect_bootstrap_succeeded()
        .withf(|_, setting| {
            setting.plugin_order().is_empty() && setting.view_plugin_order().is_empty()
        })
        .times(1)
        .in_sequence(&mut sequence)
        .return_const(());
    reporter.expect_bootstrap_failed().never();

    let host = bootstrap_with(&static_loader(&settings), Arc::new(reporter))
        .expect("bootstrap should succeed");

    assert_eq!(host.config().plugin_setting_path(), settings.path());
}

#[rstest]
fn bootstrap_shares_the_installed_subscriber(settings: SettingsDir) {
    let host = bootstrap_with(&static_loader(&settings), recording_reporter())
        .expect("bootstrap should succeed");

    let again = crate::telemetry::initialise(&Config::default()).expect("telemetry");

    assert_eq!(host.telemetry(), again);
}

#[rstest]
fn bootstrap_reads_existing_preferences(settings: SettingsDir) {
    settings.write(r#"{ "viewPluginOrder": ["measure", "toolbox"] }"#);
    let reporter = recording_reporter();

    let host = bootstrap_with(&static_loader(&settings), reporter.clone())
        .expect("bootstrap should succeed");

    assert_eq!(host.setting().view_plugin_order(), ["measure", "toolbox"]);
    assert!(host.setting().plugin_order().is_empty());
    assert_eq!(
        reporter.events(),
        [
            HealthEvent::BootstrapStarting,
            HealthEvent::BootstrapSucceeded { preferred_view: 2 }
        ]
    );
}

#[rstest]
fn malformed_settings_fail_bootstrap(settings: SettingsDir) {
    settings.write("{ not json");
    let mut reporter = MockReporter::new();
    reporter.expect_bootstrap_starting().return_const(());
    reporter
        .expect_bootstrap_failed()
        .withf(|error| matches!(error, BootstrapError::Setting { .. }))
        .times(1)
        .return_const(());
    reporter.expect_bootstrap_succeeded().never();

    let error = bootstrap_with(&static_loader(&settings), Arc::new(reporter))
        .expect_err("bootstrap should fail");

    assert!(matches!(error, BootstrapError::Setting { .. }));
}

#[rstest]
fn rejected_arguments_fail_bootstrap() {
    let reporter = recording_reporter();

    let error = bootstrap_with(&FailingConfigLoader, reporter.clone())
        .expect_err("bootstrap should fail");

    assert!(matches!(error, BootstrapError::Configuration { .. }));
    assert!(matches!(
        reporter.events().last(),
        Some(HealthEvent::BootstrapFailed(message)) if message.contains("configuration")
    ));
}

#[rstest]
fn default_session_loads_builtin_set(settings: SettingsDir) {
    let reporter = recording_reporter();
    let host = bootstrap_with(&static_loader(&settings), reporter.clone()).expect("bootstrap");
    let mut out = Vec::new();

    let outcome = host.run(&BuiltinPlugins, &mut out).expect("session runs");

    let Outcome::Running(running) = outcome else {
        panic!("expected a running session");
    };
    assert_eq!(
        running.summary(),
        SessionSummary {
            executed: 6,
            failed: 0,
            view_models: 5,
            dialogs: 0,
        }
    );
    assert!(running.persisted().is_none());
    assert!(out.is_empty());
    assert!(
        reporter
            .events()
            .contains(&HealthEvent::SessionReady { executed: 6, failed: 0 })
    );
    assert!(!settings.path().exists());
    running.shutdown();
}

#[rstest]
fn list_plugins_writes_descriptors_without_loading(settings: SettingsDir) {
    let loader = ArgsConfigLoader::new([
        "--list-plugins",
        "--plugin-settings",
        settings.path().as_str(),
    ]);
    let reporter = recording_reporter();
    let host = bootstrap_with(&loader, reporter.clone()).expect("bootstrap");
    let mut out = Vec::new();

    let outcome = host.run(&BuiltinPlugins, &mut out).expect("listing runs");

    assert!(matches!(outcome, Outcome::Listed { plugins: 6 }));
    let text = String::from_utf8(out).expect("listing is UTF-8");
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines.first().is_some_and(|line| line.starts_with("general\t")));
    assert!(lines.get(1).is_some_and(|line| {
        line.starts_with("view\t") && line.contains("\tMain view\t")
    }));
    assert!(
        !reporter
            .events()
            .iter()
            .any(|event| matches!(event, HealthEvent::SessionReady { .. }))
    );
}

#[rstest]
fn write_order_pins_the_resolved_order(settings: SettingsDir) {
    let measure = std::any::type_name::<MeasureViewPlugin>();
    settings.write(&format!(r#"{{ "viewPluginOrder": ["{measure}", "unknown"] }}"#));
    let loader = ArgsConfigLoader::new([
        "--write-order",
        "--plugin-settings",
        settings.path().as_str(),
    ]);
    let reporter = recording_reporter();
    let host = bootstrap_with(&loader, reporter.clone()).expect("bootstrap");

    let outcome = host.run(&BuiltinPlugins, &mut Vec::new()).expect("session runs");

    let Outcome::Running(running) = outcome else {
        panic!("expected a running session");
    };
    assert_eq!(running.persisted(), Some(settings.path()));
    let saved = settings.read();
    assert_eq!(saved.plugin_order().len(), 1);
    assert_eq!(saved.view_plugin_order().len(), 5);
    assert_eq!(saved.view_plugin_order().first().map(String::as_str), Some(measure));
    assert!(!saved.view_plugin_order().iter().any(|id| id == "unknown"));
    assert!(
        reporter
            .events()
            .contains(&HealthEvent::OrderPersisted(settings.path().to_owned()))
    );
}

#[rstest]
fn discovery_failure_is_reported(settings: SettingsDir) {
    let reporter = recording_reporter();
    let host = bootstrap_with(&static_loader(&settings), reporter.clone()).expect("bootstrap");

    let error = host
        .run(&BrokenSource, &mut Vec::new())
        .expect_err("discovery should fail");

    assert!(matches!(error, SessionError::Discovery { .. }));
    assert!(matches!(
        reporter.events().last(),
        Some(HealthEvent::SessionFailed(message)) if message.contains("manifest unreadable")
    ));
}

#[rstest]
fn process_lists_plugins_on_stdout(settings: SettingsDir) {
    let loader = ArgsConfigLoader::new([
        "--list-plugins",
        "--plugin-settings",
        settings.path().as_str(),
    ]);
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let code = crate::run(
        &loader,
        recording_reporter(),
        &BuiltinPlugins,
        &mut stdout,
        &mut stderr,
    );

    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(String::from_utf8_lossy(&stdout).lines().count(), 6);
    assert!(stderr.is_empty());
}

#[rstest]
fn process_prints_help_to_stdout() {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let code = crate::run(
        &ArgsConfigLoader::new(["--help"]),
        recording_reporter(),
        &BuiltinPlugins,
        &mut stdout,
        &mut stderr,
    );

    assert_eq!(code, ExitCode::SUCCESS);
    assert!(String::from_utf8_lossy(&stdout).contains("--list-plugins"));
    assert!(stderr.is_empty());
}

#[rstest]
fn process_rejects_unknown_flags_on_stderr() {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let code = crate::run(
        &FailingConfigLoader,
        recording_reporter(),
        &BuiltinPlugins,
        &mut stdout,
        &mut stderr,
    );

    assert_eq!(code, ExitCode::from(2));
    assert!(stdout.is_empty());
    assert!(String::from_utf8_lossy(&stderr).contains("--no-such-flag"));
}

#[rstest]
fn process_reports_session_failures(settings: SettingsDir) {
    let mut stderr = Vec::new();

    let code = crate::run(
        &static_loader(&settings),
        recording_reporter(),
        &BrokenSource,
        &mut Vec::new(),
        &mut stderr,
    );

    assert_eq!(code, ExitCode::FAILURE);
    assert!(String::from_utf8_lossy(&stderr).contains("plugin discovery failed"));
}
