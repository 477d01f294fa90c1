//! Log subscriber setup.
//!
//! `RUST_LOG` wins when set, then `LOG_LEVEL`. A bare level such as `debug`
//! is widened with quieter defaults for the HTTP stack. `LOG_FORMAT=json`
//! switches to one JSON object per line.

use std::str::FromStr;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "info,veilbatch_executor=debug";

/// Filter directives for a configured level.
#[must_use]
pub fn filter_spec(level: Option<&str>) -> String {
    let Some(level) = level.map(str::trim).filter(|l| !l.is_empty()) else {
        return DEFAULT_FILTER.to_string();
    };
    if level.contains(',') || level.contains('=') {
        level.to_string()
    } else {
        format!("{level},h2=info,hyper=info,hyper_util=info,reqwest=info,tower_http=info")
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init() {
    let spec = std::env::var("RUST_LOG")
        .ok()
        .or_else(|| std::env::var("LOG_LEVEL").ok());
    let spec = filter_spec(spec.as_deref());
    let filter = EnvFilter::from_str(&spec).unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let subscriber = tracing_subscriber::registry().with(filter);
    if json {
        subscriber
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        subscriber.with(fmt::layer().with_target(true).compact()).init();
    }

    tracing::debug!(filter = %spec, format = if json { "json" } else { "compact" }, "logging initialized");
}
