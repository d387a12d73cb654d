//! Orimath host binary.
//!
//! Loads the built-in plugin set in the configured order. Pass
//! `--list-plugins` to print the resolved order instead, or `--write-order`
//! to pin it in the settings file.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use orimath::builtin::BuiltinPlugins;
use orimath::{StructuredHealthReporter, SystemConfigLoader};

fn main() -> ExitCode {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    orimath::run(
        &SystemConfigLoader,
        Arc::new(StructuredHealthReporter::new()),
        &BuiltinPlugins,
        &mut stdout,
        &mut stderr,
    )
}
