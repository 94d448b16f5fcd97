// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API, which lets us describe the CLI as a plain struct
// and have clap generate the parsing and --help output.
//
// Everything here is raw user input. Turning it into a validated crawl
// configuration happens in config.rs.
// =============================================================================

use std::path::PathBuf;

use clap::Parser;

// #[derive(Parser)] tells clap to generate the parsing code for this struct
#[derive(Parser, Debug)]
#[command(
    name = "octoprobe",
    version,
    about = "Crawl a website and report every broken link",
    long_about = "octoprobe starts at a base URL, follows every link it can reach on that site, \
                  checks that each one answers with 200 or 204, and reports the ones that don't. \
                  External links are checked but never crawled further."
)]
pub struct Cli {
    /// Website URL to crawl (https:// is assumed when no scheme is given)
    ///
    /// Optional at the parser level so a missing URL exits with code 1
    pub url: Option<String>,

    /// Timeout for each request, in milliseconds
    #[arg(long, default_value_t = 2000, value_name = "MS")]
    pub timeout: u64,

    /// Only print broken links and the summary, no per-request progress
    #[arg(long, short)]
    pub silent: bool,

    /// Skip links whose query string sets this parameter (repeatable or comma-separated)
    #[arg(long = "ignore-query", value_name = "NAME", value_delimiter = ',')]
    pub ignore_query: Vec<String>,

    /// Don't check links that leave the base host
    #[arg(long)]
    pub ignore_external: bool,

    /// Also check the src of <img> elements
    #[arg(long)]
    pub include_images: bool,

    /// Skip anchors marked rel="nofollow"
    #[arg(long)]
    pub ignore_nofollow: bool,

    /// JSON file with {"urls": [...], "domains": [...]} to skip
    #[arg(long, value_name = "FILE")]
    pub ignore_list: Option<PathBuf>,

    /// Slack incoming webhook that receives one message per broken link
    #[arg(long, value_name = "URL")]
    pub slack_webhook: Option<String>,

    /// Number of requests in flight at once
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Stop after this many links have been checked
    #[arg(long, value_name = "N")]
    pub max_links: Option<usize>,

    /// Print the broken links and summary as JSON at the end
    #[arg(long)]
    pub json: bool,
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is the URL an Option<String>?
//    - clap would exit with code 2 on a missing positional argument
//    - A missing base URL is a configuration error (exit code 1), so we
//      accept None here and report it in config.rs
//
// 2. What does value_delimiter = ',' do?
//    - --ignore-query=a,b and --ignore-query=a --ignore-query=b both give
//      vec!["a", "b"]
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["octoprobe", "example.com"]).unwrap();
        assert_eq!(cli.url.as_deref(), Some("example.com"));
        assert_eq!(cli.timeout, 2000);
        assert_eq!(cli.concurrency, 1);
        assert!(!cli.silent);
        assert!(cli.ignore_query.is_empty());
        assert!(cli.max_links.is_none());
    }

    #[test]
    fn test_url_is_optional_for_the_parser() {
        let cli = Cli::try_parse_from(["octoprobe"]).unwrap();
        assert!(cli.url.is_none());
    }

    #[test]
    fn test_ignore_query_accepts_both_forms() {
        let cli = Cli::try_parse_from([
            "octoprobe",
            "example.com",
            "--ignore-query=continue",
            "--ignore-query",
            "page,sort",
        ])
        .unwrap();
        assert_eq!(cli.ignore_query, vec!["continue", "page", "sort"]);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "octoprobe",
            "example.com",
            "--silent",
            "--ignore-external",
            "--include-images",
            "--ignore-nofollow",
            "--timeout",
            "500",
            "--ignore-list",
            "ignore.json",
        ])
        .unwrap();
        assert!(cli.silent && cli.ignore_external && cli.include_images && cli.ignore_nofollow);
        assert_eq!(cli.timeout, 500);
        assert_eq!(cli.ignore_list, Some(PathBuf::from("ignore.json")));
    }
}
