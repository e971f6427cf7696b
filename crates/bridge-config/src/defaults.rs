use crate::dispatch::DispatchMode;
use crate::logging::LogFormat;

/// Environment variable enabling diagnostic detail in error responses.
pub const DEBUG_ENV: &str = "BRIDGE_DEBUG";

/// Environment variable overriding the log filter expression.
pub const LOG_FILTER_ENV: &str = "BRIDGE_LOG_FILTER";

/// Environment variable overriding the log output format.
pub const LOG_FORMAT_ENV: &str = "BRIDGE_LOG_FORMAT";

/// Environment variable overriding the request dispatch mode.
pub const DISPATCH_MODE_ENV: &str = "BRIDGE_DISPATCH_MODE";

/// Default log filter expression used by the bridge.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the bridge.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the bridge.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default request dispatch mode.
#[must_use]
pub const fn default_dispatch_mode() -> DispatchMode {
    DispatchMode::Sequential
}
