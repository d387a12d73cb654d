//! Process entry point shared by the binary and the tests.

use std::fmt::Display;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use orimath_plugins::PluginSource;

use crate::bootstrap::{BootstrapError, ConfigLoader, bootstrap_with};
use crate::health::HealthReporter;
use crate::session::Outcome;

/// Bootstraps the host, runs one session and maps the result to an exit
/// code.
///
/// Help and version requests are written to `stdout` and exit successfully.
/// Other failures are written to `stderr`. Contained plugin failures do not
/// change the exit code.
pub fn run(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    plugin_source: &dyn PluginSource,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> ExitCode {
    let host = match bootstrap_with(loader, reporter) {
        Ok(host) => host,
        Err(BootstrapError::Configuration { source }) => {
            let parser_error = source.parser_error();
            let rendered = parser_error.render();
            if parser_error.use_stderr() {
                emit(stderr, &rendered);
            } else {
                emit(stdout, &rendered);
            }
            return exit_code_from_status(parser_error.exit_code());
        }
        Err(error) => {
            emit(stderr, &error);
            return ExitCode::FAILURE;
        }
    };

    match host.run(plugin_source, stdout) {
        Ok(Outcome::Listed { .. }) => ExitCode::SUCCESS,
        Ok(Outcome::Running(running)) => {
            let summary = running.summary();
            tracing::info!(
                target: "orimath::process",
                event = "session_summary",
                executed = summary.executed,
                failed = summary.failed,
                view_models = summary.view_models,
                dialogs = summary.dialogs,
                "session finished"
            );
            running.shutdown();
            ExitCode::SUCCESS
        }
        Err(error) => {
            emit(stderr, &error);
            ExitCode::FAILURE
        }
    }
}

fn emit(stream: &mut dyn Write, message: &dyn Display) {
    if let Err(error) = writeln!(stream, "{message}") {
        tracing::warn!(
            target: "orimath::process",
            event = "output_failed",
            error = %error,
            "failed to write diagnostic"
        );
    }
}

fn exit_code_from_status(status: i32) -> ExitCode {
    u8::try_from(status).map_or(ExitCode::FAILURE, ExitCode::from)
}
