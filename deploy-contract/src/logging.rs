//! Logging configuration of the command-line driver.
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Logging arguments.
#[derive(Debug, Clone, Default, Parser)]
pub(crate) struct LogArgs {
    /// Increase logging verbosity (-v = debug, -vv = trace).
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    pub(crate) verbose: u8,

    /// Only log errors.
    #[arg(short = 'q', long, conflicts_with = "verbose", global = true)]
    pub(crate) quiet: bool,

    /// Disable colorful console logging.
    #[arg(long = "log.no-color", visible_aliases = ["log-no-color"], global = true)]
    pub(crate) log_no_color: bool,
}

impl LogArgs {
    /// Level of this crate's and the library's logs.
    pub(crate) fn level(&self) -> Level {
        if self.quiet {
            return Level::ERROR;
        }
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    /// Initializes the tracing subscriber, logging to stderr.
    ///
    /// `RUST_LOG` takes precedence over the verbosity flags. Log targets are
    /// only shown from the debug level on.
    pub(crate) fn init(&self) {
        let level = self.level();
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(format!("deploy_contract={level},deployer={level}"))
        };

        fmt()
            .with_env_filter(filter)
            .with_target(level >= Level::DEBUG)
            .with_writer(std::io::stderr)
            .with_ansi(!self.log_no_color)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> LogArgs {
        LogArgs::try_parse_from(std::iter::once("test").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(parse(&[]).level(), Level::INFO);
        assert_eq!(parse(&["-v"]).level(), Level::DEBUG);
        assert_eq!(parse(&["-vvv"]).level(), Level::TRACE);
        assert_eq!(parse(&["-q"]).level(), Level::ERROR);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(LogArgs::try_parse_from(["test", "-q", "-v"]).is_err());
    }
}
