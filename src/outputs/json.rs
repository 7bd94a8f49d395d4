//! JSON export of a run.
//!
//! ```text
//! json_output_dir/
//! └── 2024-03-05.json
//! ```
//!
//! The document carries the cutoff date, the generation time and the sorted
//! articles with their normalized timestamps.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

use crate::models::Article;

#[derive(Debug, Serialize)]
pub struct RunDocument<'a> {
    pub cutoff: NaiveDate,
    pub generated_at: NaiveDateTime,
    pub count: usize,
    pub articles: &'a [Article],
}

/// Write the run to `{json_output_dir}/{cutoff}.json` and return the path.
///
/// # Arguments
/// * `articles` - Run results, newest first
/// * `cutoff` - Cutoff day, also used as the file name
/// * `json_output_dir` - Created when missing
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_results(
    articles: &[Article],
    cutoff: NaiveDate,
    json_output_dir: &str,
) -> Result<String, Box<dyn Error>> {
    let document = RunDocument {
        cutoff,
        generated_at: Local::now().naive_local(),
        count: articles.len(),
        articles,
    };
    let json = serde_json::to_string_pretty(&document)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(%json_output_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = format!("{}/{}.json", json_output_dir.trim_end_matches('/'), cutoff);
    fs::write(&path, json).await?;
    info!(%path, count = articles.len(), "Wrote JSON export");
    Ok(path)
}
