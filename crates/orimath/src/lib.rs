//! Host process for Orimath.
//!
//! The host owns the sequence around the plugin composition core: load the
//! configuration, install structured telemetry, read the plugin ordering
//! settings, then discover, order and run the plugin set. Every stage
//! reports through a [`HealthReporter`] so failures are visible in the
//! logs before the process exits.
//!
//! The binary links the [`builtin`] plugin set. Embedders and tests drive
//! the same sequence through [`bootstrap_with`] and [`Host::run`] with
//! their own [`ConfigLoader`] and plugin source.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use orimath::builtin::BuiltinPlugins;
//! use orimath::{Outcome, StructuredHealthReporter, SystemConfigLoader, bootstrap_with};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let host = bootstrap_with(&SystemConfigLoader, Arc::new(StructuredHealthReporter::new()))?;
//! let mut out = Vec::new();
//! if let Outcome::Running(running) = host.run(&BuiltinPlugins, &mut out)? {
//!     assert_eq!(running.summary().failed, 0);
//!     running.shutdown();
//! }
//! # Ok(())
//! # }
//! ```

mod bootstrap;
pub mod builtin;
mod health;
mod process;
mod session;
pub mod telemetry;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Host, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::run;
pub use session::{Outcome, RunningSession, Session, SessionError, SessionSummary};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
