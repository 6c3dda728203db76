//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! No argument is required: with none given, the built-in source registry
//! and keyword list are used and articles land in `articles.db`.

use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Default registry and keywords
/// newswatch
///
/// # Custom config file, database elsewhere
/// newswatch --config newswatch.yaml --database /var/lib/newswatch/articles.db
///
/// # Ad-hoc keyword override
/// newswatch -k rust -k tokio
/// ```
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Path to a YAML config file (built-in defaults when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// SQLite database path, overriding the configured one
    #[arg(short, long, env = "NEWSWATCH_DB")]
    pub database: Option<String>,

    /// Keyword to search for instead of the configured list (repeatable)
    #[arg(short = 'k', long = "keyword")]
    pub keywords: Vec<String>,

    /// Also append log output to this file
    #[arg(long)]
    pub log_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_with_no_arguments() {
        let cli = Cli::parse_from(["newswatch"]);
        assert!(cli.config.is_none());
        assert!(cli.database.is_none());
        assert!(cli.keywords.is_empty());
    }

    #[test]
    fn test_cli_keyword_override_is_repeatable() {
        let cli = Cli::parse_from(["newswatch", "-k", "rust", "--keyword", "tokio"]);
        assert_eq!(cli.keywords, vec!["rust".to_string(), "tokio".to_string()]);
    }

    #[test]
    fn test_cli_database_flag() {
        let cli = Cli::parse_from(["newswatch", "--database", "/tmp/articles.db"]);
        assert_eq!(cli.database.as_deref(), Some("/tmp/articles.db"));
    }
}
