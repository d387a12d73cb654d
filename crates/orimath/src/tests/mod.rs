//! Test suites for the host bootstrap and session.

mod support;
mod unit;
