use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Inspect host compatibility and drive the call bridge against the simulated host.
#[derive(Debug, Parser)]
#[command(name = "hostbridge", version, about)]
pub(crate) struct Cli {
    /// Configuration file (TOML, JSON or YAML). `HOSTBRIDGE__*` variables override it.
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Detect the installed host version and report on the environment.
    Detect,

    /// Print the feature by version compatibility matrix.
    Matrix {
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
    },

    /// Validate one feature against a host version.
    Check {
        feature: String,

        /// Release year; the detected version when omitted.
        #[arg(long)]
        version: Option<u32>,
    },

    /// Call a bridge method against a simulated host.
    Call {
        method: String,

        /// JSON parameters.
        #[arg(default_value = "{}")]
        params: String,

        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Release year of the simulated host; the detected version when omitted.
        #[arg(long)]
        host_year: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    Json,
    Markdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn call_defaults_to_empty_params() {
        let cli = Cli::parse_from(["hostbridge", "call", "host.ping"]);
        match cli.command {
            Command::Call { method, params, timeout_ms, host_year } => {
                assert_eq!(method, "host.ping");
                assert_eq!(params, "{}");
                assert!(timeout_ms.is_none() && host_year.is_none());
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn matrix_format_parses() {
        let cli = Cli::parse_from(["hostbridge", "matrix", "--format", "json"]);
        assert!(matches!(cli.command, Command::Matrix { format: Format::Json }));
    }
}
