//! Browsable Markdown listing of a run.
//!
//! Each article becomes a card: source badge, time as shown on the site,
//! title, summary and a link. The listing can be narrowed to some sources
//! without touching the underlying result set.

use chrono::NaiveDate;
use itertools::Itertools;
use std::error::Error;
use std::fmt::Write;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::Article;

/// Articles whose source is in `sources`; all of them when `sources` is empty.
pub fn filter_by_sources<'a>(articles: &'a [Article], sources: &[String]) -> Vec<&'a Article> {
    articles
        .iter()
        .filter(|a| sources.is_empty() || sources.iter().any(|s| *s == a.source_id))
        .collect()
}

fn escape_link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

/// Render the listing. `articles` is expected newest first.
///
/// # Arguments
/// * `articles` - Articles to show
/// * `cutoff` - Day named in the heading
///
/// # Returns
/// A Markdown document: heading, per-source counts, one card per article.
pub fn render(articles: &[&Article], cutoff: NaiveDate) -> String {
    let mut md = String::new();

    writeln!(md, "# Tin chứng khoán từ ngày {}\n", cutoff).unwrap();
    writeln!(md, "Kết quả: **{}** tin tức\n", articles.len()).unwrap();

    if !articles.is_empty() {
        let per_source = articles
            .iter()
            .counts_by(|a| a.source_id.as_str())
            .into_iter()
            .sorted()
            .map(|(source, n)| format!("`{}` {}", source.to_uppercase(), n))
            .join(" · ");
        writeln!(md, "{}\n", per_source).unwrap();
    }

    for article in articles {
        writeln!(md, "---\n").unwrap();
        writeln!(md, "### {}\n", article.title.trim()).unwrap();

        let time = if article.raw_time_text.is_empty() {
            article.timestamp.format("%H:%M %d/%m/%Y").to_string()
        } else {
            article.raw_time_text.clone()
        };
        writeln!(md, "`{}` · 🕐 {}\n", article.source_id.to_uppercase(), time).unwrap();

        if !article.summary.is_empty() {
            writeln!(md, "{}\n", article.summary).unwrap();
        }
        writeln!(
            md,
            "🔗 [Đọc thêm: {}]({})\n",
            escape_link_text(&article.title),
            article.link
        )
        .unwrap();
    }

    md
}

/// Write the listing to `{markdown_output_dir}/{cutoff}.md` and return the path.
#[instrument(level = "info", skip_all, fields(%markdown_output_dir))]
pub async fn write_markdown_file(
    markdown: &str,
    cutoff: NaiveDate,
    markdown_output_dir: &str,
) -> Result<String, Box<dyn Error>> {
    let path = format!("{}/{}.md", markdown_output_dir.trim_end_matches('/'), cutoff);
    fs::write(&path, markdown).await?;
    info!(%path, "Wrote Markdown listing");
    Ok(path)
}
