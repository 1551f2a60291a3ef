use clap::Parser;
use std::{borrow::Cow, path::PathBuf};
use tripsplit_domain::SettlementContext;

/// Settle up a trip: prints balances, the payments that clear them, and the
/// balances afterwards.
#[derive(Parser, Debug)]
#[command(name = "tripsplit", version, about, long_about = None)]
pub struct Cli {
    /// Trip file to settle.
    pub file: PathBuf,

    /// Decimal places of the smallest currency unit (2 for cents, 0 for yen).
    #[arg(long, env = "TRIPSPLIT_SCALE", default_value_t = 2)]
    pub scale: u32,

    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Resolved settings for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub trip_path: PathBuf,
    pub context: SettlementContext,
    pub verbosity: u8,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, Cow<'static, str>> {
        let context = SettlementContext::new(cli.scale)
            .map_err(|err| format!("Invalid --scale: {err}"))?;

        Ok(Self {
            trip_path: cli.file,
            context,
            verbosity: cli.verbose,
        })
    }

    /// Default filter directive when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::quiet(&["tripsplit", "trip.txt"], "warn")]
    #[case::verbose(&["tripsplit", "-v", "trip.txt"], "info")]
    #[case::very_verbose(&["tripsplit", "-vv", "trip.txt"], "debug")]
    #[case::saturates(&["tripsplit", "-vvvvv", "trip.txt"], "trace")]
    fn verbosity_maps_to_level(#[case] args: &[&str], #[case] expected: &str) {
        let cli = Cli::try_parse_from(args).expect("parses");
        let config = AppConfig::from_cli(cli).expect("config");
        assert_eq!(config.log_level(), expected);
    }

    #[test]
    fn explicit_scale_is_used() {
        let cli = Cli::try_parse_from(["tripsplit", "--scale", "0", "trip.txt"]).expect("parses");
        let config = AppConfig::from_cli(cli).expect("config");

        assert_eq!(config.trip_path, PathBuf::from("trip.txt"));
        assert_eq!(config.context, SettlementContext { scale: 0 });
    }

    #[test]
    fn oversized_scale_is_rejected() {
        let cli = Cli::try_parse_from(["tripsplit", "--scale", "40", "trip.txt"]).expect("parses");
        assert!(AppConfig::from_cli(cli).is_err());
    }

    #[test]
    fn file_argument_is_required() {
        assert!(Cli::try_parse_from(["tripsplit"]).is_err());
    }
}
