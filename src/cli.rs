//! Command line handling for the binary

use crate::types::LogLevel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Serve,
    Version,
    Help,
    Invalid(String),
}

/// Interpret the arguments after the program name
pub fn parse_args<I, S>(args: I) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = args.into_iter();
    let Some(first) = args.next() else {
        return Command::Serve;
    };

    match first.as_ref() {
        "--version" | "-v" => Command::Version,
        "--help" | "-h" => Command::Help,
        other => Command::Invalid(other.to_string()),
    }
}

pub fn version_text() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

pub fn help_text() -> String {
    format!(
        "{name} {version}
{description}

USAGE:
    {name} [OPTIONS]

OPTIONS:
    -h, --help       Print help information
    -v, --version    Print version information

ENVIRONMENT:
    BEARER_LOCAL                      Bind to 127.0.0.1 instead of 0.0.0.0
    BEARER_PORT                       Listen port (default: ephemeral)
    BEARER_LOG_LEVEL                  One of: {levels} (default: info)
    BEARER_MAX_PAYLOAD                Maximum request body in bytes
    BEARER_CONNECTION_TIMEOUT_SECS    Per-connection timeout
    BEARER_MAX_CONNECTIONS            Concurrent connection cap
    BEARER_REALM                      Realm for WWW-Authenticate challenges",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        description = env!("CARGO_PKG_DESCRIPTION"),
        levels = LogLevel::valid_values().join(", "),
    )
}

pub fn invalid_arg_text(arg: &str) -> String {
    format!(
        "error: unexpected argument '{arg}'\n\nRun '{} --help' for usage.",
        env!("CARGO_PKG_NAME")
    )
}
