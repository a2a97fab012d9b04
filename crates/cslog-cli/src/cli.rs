use std::path::PathBuf;

use clap::Parser;
use cslog_core::config::HOME_ENV;

#[derive(Parser)]
#[command(
    name = "cslog",
    about = "Merge the latest consensus record of each node log into per-family summary files",
    version,
)]
pub struct Cli {
    /// Root path pattern; every directory matching `<ROOT>*` is scanned
    pub root: PathBuf,

    /// Output home; merged files go to `<HOME>/logs/` [default: ~/.sinalgo]
    #[arg(long, env = HOME_ENV)]
    pub home: Option<PathBuf>,

    /// Fail a whole log file on its first malformed consensus line
    #[arg(long)]
    pub strict: bool,

    /// Print summary lines without appending them
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_root_only() {
        let cli = Cli::try_parse_from(["cslog", "/tmp/runs/run"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("/tmp/runs/run"));
        assert!(!cli.strict);
        assert!(!cli.dry_run);
        assert!(matches!(cli.format, OutputFormat::Text));
    }

    #[test]
    fn root_is_required() {
        assert!(Cli::try_parse_from(["cslog"]).is_err());
    }

    #[test]
    fn parse_home() {
        let cli = Cli::try_parse_from(["cslog", "--home", "/srv/sim", "logs/"]).unwrap();
        assert_eq!(cli.home, Some(PathBuf::from("/srv/sim")));
    }

    #[test]
    fn parse_flags() {
        let cli =
            Cli::try_parse_from(["cslog", "--strict", "--dry-run", "-v", "logs/run"]).unwrap();
        assert!(cli.strict);
        assert!(cli.dry_run);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["cslog", "--format", "json", "logs/run"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn reject_unknown_format() {
        assert!(Cli::try_parse_from(["cslog", "--format", "xml", "logs/run"]).is_err());
    }
}
