use std::fmt::Display;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use bridge_config::{Config, ConfigError};
use bridge_plugins::PluginSource;
use bridged::{StructuredHealthReporter, bootstrap_with, default_catalog};
use tokio::io::BufReader;

fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(ConfigError::Cli(error)) => error.exit(),
    };

    let catalog = default_catalog();
    if config.list_plugins() {
        return list_plugins(&catalog);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => return fail(format_args!("failed to start runtime: {error}")),
    };

    let reporter = Arc::new(StructuredHealthReporter::new());
    let bridge = match bootstrap_with(config, &catalog, reporter) {
        Ok(bridge) => bridge,
        Err(error) => return fail(error),
    };

    let stdin = BufReader::new(tokio::io::stdin());
    match runtime.block_on(bridge.serve(stdin, tokio::io::stdout())) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(target: "bridged::main", %error, "session ended abnormally");
            ExitCode::FAILURE
        }
    }
}

fn list_plugins(catalog: &dyn PluginSource) -> ExitCode {
    let mut stdout = std::io::stdout().lock();
    for specifier in catalog.specifiers() {
        if writeln!(stdout, "{specifier}").is_err() {
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

/// Reports a start-up failure on stderr. Stdout stays reserved for the protocol.
fn fail(message: impl Display) -> ExitCode {
    // A closed stderr leaves nowhere to report; the exit code still signals failure.
    drop(writeln!(std::io::stderr().lock(), "bridged: {message}"));
    ExitCode::FAILURE
}
