//! Spreadsheet export.
//!
//! One row per article with the columns `title,link,time,summary,source`.
//! The file starts with a UTF-8 byte order mark so spreadsheet tools pick
//! the right encoding for Vietnamese text.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::io;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::Article;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One exported row; `time` is the text as shown on the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub title: String,
    pub link: String,
    pub time: String,
    pub summary: String,
    pub source: String,
}

impl From<&Article> for ExportRow {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            link: article.link.clone(),
            time: article.raw_time_text.clone(),
            summary: article.summary.clone(),
            source: article.source_id.clone(),
        }
    }
}

/// Default export file name for a cutoff date.
pub fn csv_file_name(cutoff: NaiveDate) -> String {
    format!("tin-chung-khoan-{}.csv", cutoff)
}

/// Write `articles` as BOM-prefixed CSV, header included.
pub fn write_csv<W: io::Write>(articles: &[Article], mut writer: W) -> Result<(), csv::Error> {
    writer.write_all(UTF8_BOM)?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    for article in articles {
        csv_writer.serialize(ExportRow::from(article))?;
    }
    if articles.is_empty() {
        csv_writer.write_record(["title", "link", "time", "summary", "source"])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the export into `output_dir` and return the file path.
///
/// # Arguments
/// * `articles` - Rows to export, in order
/// * `output_dir` - Existing directory
/// * `cutoff` - Day used in the file name
///
/// # Returns
/// Path of `tin-chung-khoan-<cutoff>.csv`.
#[instrument(level = "info", skip_all, fields(%output_dir, count = articles.len()))]
pub async fn write_csv_file(
    articles: &[Article],
    output_dir: &str,
    cutoff: NaiveDate,
) -> Result<String, Box<dyn Error>> {
    let mut buffer = Vec::new();
    write_csv(articles, &mut buffer)?;

    let path = format!("{}/{}", output_dir.trim_end_matches('/'), csv_file_name(cutoff));
    fs::write(&path, buffer).await?;
    info!(%path, "Wrote CSV export");
    Ok(path)
}
