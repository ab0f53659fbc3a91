use clap::{ArgAction, Parser, Subcommand};
use rowdex_lookup::KeyQuery;
use std::path::PathBuf;

/// Cached row lookups over spreadsheets in blob storage.
#[derive(Debug, Parser)]
#[command(name = "rowdex", version, about)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON). Defaults to the platform config
    /// directory, if a file exists there.
    #[arg(short, long, global = true, env = "ROWDEX_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// More logging (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print one row by file row number (the first data row is 2).
    Get { source: String, position: u64 },
    /// Print rows by file row number; missing rows print as null.
    Rows {
        source: String,
        #[arg(required = true)]
        positions: Vec<u64>,
    },
    /// Print the first row matching each PRIMARY:SECONDARY query. Either
    /// side may be left empty (`AB12:` or `:WVWZZZ1JZXW000001`).
    Search {
        source: String,
        #[arg(required = true, value_name = "PRIMARY:SECONDARY", value_parser = parse_query)]
        queries: Vec<KeyQuery>,
    },
    /// Cache sources ahead of time. Defaults to the configured warm list.
    Warm { sources: Vec<String> },
    /// Print cache statistics.
    Stats,
}

fn parse_query(s: &str) -> Result<KeyQuery, String> {
    let query = KeyQuery::from(s);
    if query == KeyQuery::default() {
        return Err("at least one key is required".to_string());
    }
    Ok(query)
}

impl Cli {
    /// Log filter directive for the `-v` count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
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

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("rowdex").chain(args.iter().copied()))
    }

    #[test]
    fn test_search() {
        let cli = parse(&["search", "fleet.xlsx", "AB12:V1", ":V2", "CD34"]).unwrap();
        let Command::Search { source, queries } = cli.command else {
            panic!("expected search");
        };
        assert_eq!(source, "fleet.xlsx");
        assert_eq!(queries, [KeyQuery::both("AB12", "V1"), KeyQuery::secondary("V2"), KeyQuery::primary("CD34")]);
    }

    #[rstest]
    #[case(&["search", "fleet.xlsx", ":"])]
    #[case(&["search", "fleet.xlsx"])]
    #[case(&["rows", "fleet.xlsx"])]
    #[case(&["get", "fleet.xlsx", "two"])]
    #[case(&["get", "fleet.xlsx", "-3"])]
    fn test_rejected(#[case] args: &[&str]) {
        assert!(parse(args).is_err());
    }

    #[rstest]
    #[case(&["stats"], "warn")]
    #[case(&["-v", "stats"], "info")]
    #[case(&["stats", "-vv"], "debug")]
    #[case(&["-vvvv", "stats"], "trace")]
    fn test_verbosity(#[case] args: &[&str], #[case] expected: &str) {
        assert_eq!(parse(args).unwrap().log_level(), expected);
    }

    #[test]
    fn test_config_and_rows() {
        let cli = parse(&["-c", "/etc/rowdex.toml", "rows", "fleet.xlsx", "2", "3", "999"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/rowdex.toml")));
        assert!(matches!(cli.command, Command::Rows { positions, .. } if positions == [2, 3, 999]));
    }
}
