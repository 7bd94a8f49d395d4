//! Command-line interface definitions for vn_market_news.
//!
//! All arguments are optional: with none, every built-in source is scraped
//! for today's articles and a CSV export lands in the current directory.

use chrono::NaiveDate;
use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Today's news from every built-in source
/// vn_market_news
///
/// # Since a given day, two sources only, with JSON and Markdown files
/// vn_market_news --date 2024-03-04 --only cafef --only vietstock \
///     --json-output-dir ./json --markdown-output-dir ./md
///
/// # Add a site on the fly
/// vn_market_news --add-source "Tin Nhanh=https://tinnhanh.vn/chung-khoan"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Earliest publication day kept (YYYY-MM-DD); defaults to today
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Scrape only these source ids (repeatable)
    #[arg(long = "only", value_name = "SOURCE_ID")]
    pub only: Vec<String>,

    /// Leave these source ids out (repeatable)
    #[arg(long = "skip", value_name = "SOURCE_ID")]
    pub skip: Vec<String>,

    /// Append a source as NAME=URL, using the generic teaser layout (repeatable)
    #[arg(long = "add-source", value_name = "NAME=URL")]
    pub add_source: Vec<String>,

    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output directory for the CSV export
    #[arg(long, default_value = ".")]
    pub csv_output_dir: String,

    /// Output directory for the JSON export
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Output directory for the Markdown listing; printed to stdout when absent
    #[arg(short, long)]
    pub markdown_output_dir: Option<String>,

    /// Show only these source ids in the Markdown listing (repeatable)
    #[arg(long = "show-source", value_name = "SOURCE_ID")]
    pub show_source: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["vn_market_news"]);
        assert_eq!(cli.date, None);
        assert!(cli.only.is_empty());
        assert_eq!(cli.csv_output_dir, ".");
        assert_eq!(cli.json_output_dir, None);
        assert_eq!(cli.markdown_output_dir, None);
    }

    #[test]
    fn test_cli_full() {
        let cli = Cli::parse_from([
            "vn_market_news",
            "--date",
            "2024-03-04",
            "--only",
            "cafef",
            "--only",
            "baomoi",
            "--skip",
            "vietstock",
            "--add-source",
            "Tin Nhanh=https://tinnhanh.vn",
            "-j",
            "/tmp/json",
            "-m",
            "/tmp/md",
            "--show-source",
            "cafef",
        ]);

        assert_eq!(cli.date, NaiveDate::from_ymd_opt(2024, 3, 4));
        assert_eq!(cli.only, vec!["cafef", "baomoi"]);
        assert_eq!(cli.skip, vec!["vietstock"]);
        assert_eq!(cli.add_source, vec!["Tin Nhanh=https://tinnhanh.vn"]);
        assert_eq!(cli.json_output_dir.as_deref(), Some("/tmp/json"));
        assert_eq!(cli.markdown_output_dir.as_deref(), Some("/tmp/md"));
        assert_eq!(cli.show_source, vec!["cafef"]);
    }

    #[test]
    fn test_cli_rejects_bad_date() {
        assert!(Cli::try_parse_from(["vn_market_news", "--date", "05/03/2024"]).is_err());
    }
}
