use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "weather-alerts",
    version,
    about = "Evaluate forecast alert rules and send email notifications"
)]
pub struct Cli {
    /// Evaluate rules and print what would fire without sending email
    #[arg(long)]
    pub dry_run: bool,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter implied by `-v` flags, used when RUST_LOG is unset
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["weather-alerts"]).unwrap();

        assert!(!cli.dry_run);
        assert!(cli.config.is_none());
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn dry_run_and_config() {
        let cli =
            Cli::try_parse_from(["weather-alerts", "--dry-run", "-c", "/etc/alerts.yaml"]).unwrap();

        assert!(cli.dry_run);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/alerts.yaml")));
    }

    #[test]
    fn verbosity_levels() {
        let cli = Cli::try_parse_from(["weather-alerts", "-v"]).unwrap();
        assert_eq!(cli.log_filter(), "debug");

        let cli = Cli::try_parse_from(["weather-alerts", "-vv"]).unwrap();
        assert_eq!(cli.log_filter(), "trace");
    }

    #[test]
    fn rejects_unknown_flag() {
        assert!(Cli::try_parse_from(["weather-alerts", "--send-now"]).is_err());
    }
}
