//! Date filtering and merging of per-source results.
//!
//! Raw items get their timestamp from [`normalize_time`], anything dated
//! before the cutoff day is dropped, and the survivors of all sources are
//! merged newest first. The sort is stable, so equal timestamps keep the
//! order in which their sources were processed.

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{Article, RawArticle};
use crate::timeparse::normalize_time;

/// Normalize one source's items and keep those dated on or after `cutoff`.
pub fn filter_by_cutoff(
    raw: Vec<RawArticle>,
    cutoff: NaiveDate,
    now: NaiveDateTime,
) -> Vec<Article> {
    raw.into_iter()
        .map(|item| {
            let timestamp = normalize_time(&item.time_text, now);
            Article {
                title: item.title,
                link: item.link,
                raw_time_text: item.time_text,
                timestamp,
                summary: item.summary,
                source_id: item.source_id,
            }
        })
        .filter(|article| article.timestamp.date() >= cutoff)
        .collect()
}

/// Concatenate per-source lists in processing order, then sort newest first.
pub fn merge_sorted(per_source: Vec<Vec<Article>>) -> Vec<Article> {
    let mut merged: Vec<Article> = per_source.into_iter().flatten().collect();
    merged.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-03-05 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn raw(title: &str, time_text: &str, source_id: &str) -> RawArticle {
        RawArticle {
            title: title.to_string(),
            link: format!("https://{}.vn/{}", source_id, title),
            time_text: time_text.to_string(),
            summary: String::new(),
            source_id: source_id.to_string(),
        }
    }

    #[test]
    fn test_cutoff_keeps_same_day_and_later() {
        let cutoff = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let items = vec![
            raw("d-2", "03/03/2024 09:00", "cafef"),
            raw("d-1", "04/03/2024 23:59", "cafef"),
            raw("d", "05/03/2024 00:00", "cafef"),
            raw("d+5m", "05/03/2024 00:05", "cafef"),
        ];
        let kept = filter_by_cutoff(items, cutoff, now());
        let titles: Vec<&str> = kept.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["d", "d+5m"]);
    }

    #[test]
    fn test_relative_times_across_midnight() {
        let cutoff = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let items = vec![
            raw("fresh", "11 giờ trước", "vietstock"),
            raw("stale", "13 giờ trước", "vietstock"),
        ];
        let kept = filter_by_cutoff(items, cutoff, now());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "fresh");
        assert_eq!(kept[0].raw_time_text, "11 giờ trước");
    }

    #[test]
    fn test_unparseable_time_is_kept_as_now() {
        let cutoff = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let kept = filter_by_cutoff(vec![raw("x", "", "baomoi")], cutoff, now());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].timestamp, now());
        assert_eq!(kept[0].raw_time_text, "");
    }

    #[test]
    fn test_merge_sorts_newest_first_across_sources() {
        let cutoff = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let a = filter_by_cutoff(
            vec![
                raw("a10", "05/03/2024 10:00", "a"),
                raw("a09", "05/03/2024 09:00", "a"),
            ],
            cutoff,
            now(),
        );
        let b = filter_by_cutoff(vec![raw("b0930", "05/03/2024 09:30", "b")], cutoff, now());

        let merged = merge_sorted(vec![a, b]);
        let titles: Vec<&str> = merged.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["a10", "b0930", "a09"]);
    }

    #[test]
    fn test_merge_is_stable_for_ties() {
        let cutoff = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let a = filter_by_cutoff(vec![raw("first", "05/03/2024 09:00", "a")], cutoff, now());
        let b = filter_by_cutoff(vec![raw("second", "05/03/2024 09:00", "b")], cutoff, now());
        let c = filter_by_cutoff(vec![raw("third", "05/03/2024 09:00", "c")], cutoff, now());

        let merged = merge_sorted(vec![a, b, c]);
        let titles: Vec<&str> = merged.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_sorted(vec![vec![], vec![]]).is_empty());
    }
}
