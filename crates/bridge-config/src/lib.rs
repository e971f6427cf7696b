//! Shared configuration for the plugin bridge.
//!
//! The bridge is spawned by a host process, so its whole configuration
//! surface is the command line and the environment the host provides. One
//! positional argument names the plugin to load; everything else is optional
//! and falls back to an environment variable and then to a built-in default.
//!
//! | Flag | Environment | Default |
//! |------|-------------|---------|
//! | `--debug[=VALUE]` | `BRIDGE_DEBUG` | off |
//! | `--log-filter` | `BRIDGE_LOG_FILTER` | `info` |
//! | `--log-format` | `BRIDGE_LOG_FORMAT` | `json` |
//! | `--dispatch-mode` | `BRIDGE_DISPATCH_MODE` | `sequential` |

mod debug;
mod defaults;
mod dispatch;
mod logging;

use std::ffi::OsString;

use clap::{ArgAction, Parser};
use thiserror::Error;

pub use self::debug::{is_truthy, parse_toggle};
pub use self::defaults::{
    DEBUG_ENV, DEFAULT_LOG_FILTER, DISPATCH_MODE_ENV, LOG_FILTER_ENV, LOG_FORMAT_ENV,
    default_dispatch_mode, default_log_filter, default_log_format,
};
pub use self::dispatch::DispatchMode;
pub use self::logging::LogFormat;

/// Errors raised while resolving the bridge configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The command line or environment could not be parsed.
    ///
    /// This also covers `--help` and `--version`, which `clap` reports as
    /// errors carrying the rendered text.
    #[error(transparent)]
    Cli(Box<clap::Error>),
}

impl From<clap::Error> for ConfigError {
    fn from(error: clap::Error) -> Self {
        Self::Cli(Box::new(error))
    }
}

/// Resolved bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "bridged",
    version,
    about = "Drives a compiled plugin over line-delimited JSON on standard I/O"
)]
pub struct Config {
    /// Catalog name of the plugin to load.
    #[arg(value_name = "PLUGIN", required_unless_present = "list_plugins")]
    plugin: Option<String>,

    /// Attach diagnostic detail to error responses.
    #[arg(
        long,
        env = DEBUG_ENV,
        action = ArgAction::Set,
        value_parser = parse_toggle,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true"
    )]
    debug: bool,

    /// Tracing filter expression for stderr logs.
    #[arg(long, env = LOG_FILTER_ENV, default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,

    /// Log output format.
    #[arg(long, env = LOG_FORMAT_ENV, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    /// Request scheduling strategy.
    #[arg(long, env = DISPATCH_MODE_ENV, default_value_t = DispatchMode::Sequential)]
    dispatch_mode: DispatchMode,

    /// Print the plugins compiled into this binary and exit.
    #[arg(long)]
    list_plugins: bool,
}

impl Config {
    /// Builds a configuration for `plugin` with every other value defaulted.
    #[must_use]
    pub fn for_plugin(plugin: impl Into<String>) -> Self {
        Self {
            plugin: Some(plugin.into()),
            debug: false,
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
            dispatch_mode: default_dispatch_mode(),
            list_plugins: false,
        }
    }

    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Cli`] when the arguments are invalid or help
    /// output was requested.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument list and the environment.
    ///
    /// The first item is treated as the binary name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Cli`] when the arguments are invalid.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(ConfigError::from)
    }

    /// Enables or disables diagnostic detail in error responses.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Overrides the dispatch mode.
    #[must_use]
    pub const fn with_dispatch_mode(mut self, mode: DispatchMode) -> Self {
        self.dispatch_mode = mode;
        self
    }

    /// Overrides the log filter expression.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Catalog name of the plugin to load, absent only with `--list-plugins`.
    #[must_use]
    pub fn plugin(&self) -> Option<&str> {
        self.plugin.as_deref()
    }

    /// Whether error responses carry diagnostic detail.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Tracing filter expression.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Request scheduling strategy.
    #[must_use]
    pub const fn dispatch_mode(&self) -> DispatchMode {
        self.dispatch_mode
    }

    /// Whether the caller only wants the plugin catalog listed.
    #[must_use]
    pub const fn list_plugins(&self) -> bool {
        self.list_plugins
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn parse(args: &[&str]) -> Result<Config, ConfigError> {
        let mut argv = vec!["bridged"];
        argv.extend_from_slice(args);
        Config::load_from_iter(argv)
    }

    #[rstest]
    #[case::bare(&["--debug", "echo"], true)]
    #[case::explicit_yes(&["--debug=yes", "echo"], true)]
    #[case::explicit_off(&["--debug=off", "echo"], false)]
    fn debug_flag_uses_truthy_parsing(#[case] args: &[&str], #[case] expected: bool) {
        let config = parse(args).expect("arguments should parse");
        assert_eq!(config.debug(), expected);
        assert_eq!(config.plugin(), Some("echo"));
    }

    #[test]
    fn plugin_argument_is_required() {
        let error = parse(&[]).expect_err("missing plugin must fail");
        assert!(matches!(error, ConfigError::Cli(_)));
    }

    #[test]
    fn list_plugins_does_not_require_a_plugin() {
        let config = parse(&["--list-plugins"]).expect("listing should parse");
        assert!(config.list_plugins());
        assert_eq!(config.plugin(), None);
    }

    #[rstest]
    #[case::sequential("sequential", DispatchMode::Sequential)]
    #[case::concurrent("CONCURRENT", DispatchMode::Concurrent)]
    fn dispatch_mode_is_case_insensitive(#[case] value: &str, #[case] expected: DispatchMode) {
        let config =
            parse(&["--dispatch-mode", value, "echo"]).expect("dispatch mode should parse");
        assert_eq!(config.dispatch_mode(), expected);
    }

    #[test]
    fn rejects_unknown_log_format() {
        let error = parse(&["--log-format", "xml", "echo"]).expect_err("xml is not supported");
        assert!(error.to_string().contains("xml"));
    }

    #[test]
    fn builder_defaults_match_cli_defaults() {
        let built = Config::for_plugin("echo");
        assert_eq!(built.log_filter(), default_log_filter());
        assert_eq!(built.log_format(), default_log_format());
        assert_eq!(built.dispatch_mode(), default_dispatch_mode());
        assert!(!built.debug());
    }
}
