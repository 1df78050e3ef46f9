//! Tracing setup for tests
//!
//! [`init_test_setup`] installs the process-wide developer subscriber once,
//! filtered by `QUILL_LOG`. [`with_routed_logs`] runs a closure under a
//! thread-local subscriber that feeds a [`LogRouter`], so output-bound logging
//! can be asserted on without touching the global subscriber.

use std::sync::Once;

use tracing::debug;
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::cli::logging::{IoLogLayer, LogRouter, LOG_ENV};

static TEST_SETUP: Once = Once::new();

const DEFAULT_FILTER: &str = "quill=debug";

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let noisy_modules = ["walkdir"];
        let module_filter = filter_fn(move |metadata| {
            !noisy_modules
                .iter()
                .any(|name| metadata.target().starts_with(name))
        });
        let env_filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(module_filter)
                .with_filter(env_filter),
        );
        if tracing::dispatcher::has_been_set() {
            debug!("tracing subscriber already set");
        } else if let Err(e) = subscriber.try_init() {
            eprintln!("Error: failed to set up test logging: {e}");
        }
    });
}

/// Run `f` with events on this thread routed through `router`.
pub fn with_routed_logs<R>(router: &LogRouter, f: impl FnOnce() -> R) -> R {
    let subscriber = tracing_subscriber::registry().with(IoLogLayer::new(router.clone()));
    tracing::subscriber::with_default(subscriber, f)
}
