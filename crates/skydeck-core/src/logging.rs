//! Logging facilities for Skydeck.
//!
//! Skydeck uses the `tracing` crate for instrumentation. Every crate logs
//! under its own target so output can be filtered per subsystem:
//!
//! ```text
//! SKYDECK_LOG="skydeck::wizard=debug,skydeck_net=trace"
//! ```
//!
//! Libraries never install a subscriber on their own. Applications (and the
//! console root, when asked to) call [`init`] once at startup.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "skydeck_core::signal";
    /// HTTP client target.
    pub const HTTP: &str = "skydeck_net::http";
    /// Bearer token storage target.
    pub const AUTH: &str = "skydeck_net::auth";
    /// Wizard controller target.
    pub const WIZARD: &str = "skydeck::wizard";
    /// Cascading dropdown configurator target.
    pub const CASCADE: &str = "skydeck::cascade";
    /// Query state target.
    pub const QUERY: &str = "skydeck::query";
    /// Backend API calls target.
    pub const API: &str = "skydeck::api";
    /// Application store target.
    pub const STORE: &str = "skydeck::store";
    /// Notification bus target.
    pub const NOTIFY: &str = "skydeck::notifications";
    /// Configuration loading target.
    pub const CONFIG: &str = "skydeck::config";
}

/// Default filter directive when neither the caller nor the environment set one.
pub const DEFAULT_FILTER: &str = "info";

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Install a global `fmt` subscriber with the given `EnvFilter` directive.
///
/// Only the first call has an effect. Returns `true` if this call installed
/// the subscriber, `false` if one was already present (installed by us or by
/// the host application).
pub fn init(filter: &str) -> bool {
    let mut installed_now = false;
    INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        installed_now = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok();
        installed_now
    });
    installed_now
}

/// Build the span wrapped around one backend call.
///
/// Attach it with `tracing::Instrument::instrument` so request latency shows
/// up in traces without holding an entered guard across `.await`.
pub fn perf_span(operation: &'static str) -> tracing::Span {
    tracing::info_span!(target: "skydeck::perf", "perf", operation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let _ = init("debug");
        assert!(!init("trace"));
    }

    #[test]
    fn test_perf_span() {
        let span = perf_span("test_operation");
        let _entered = span.enter();
    }
}
