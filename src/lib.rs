#![doc(test(attr(deny(warnings))))]

//! Expense Core tracks day-to-day spending: a persisted expense list, monthly
//! summaries and category breakdowns, a mocked receipt scanner, and a mocked
//! local sign-in, all driven from an interactive shell.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Expense Core tracing initialized.");
    });
}
