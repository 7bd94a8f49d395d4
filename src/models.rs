//! Data models for sources, extracted items and normalized articles.
//!
//! - [`Source`]: a configured news site with its extraction recipe
//! - [`RawArticle`]: one item as lifted off a listing page, time still as text
//! - [`Article`]: a raw item with its timestamp resolved, ready for display
//! - [`ItemOutcome`] / [`SourceOutcome`]: typed results of extraction, so an
//!   empty page and a failed fetch are never confused
//! - [`StatusEvent`]: per-source progress reported to the caller

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::FetchError;

/// Number of item containers read from a single-page listing.
pub const DEFAULT_MAX_ITEMS: usize = 20;

/// Number of pages walked for a paginated listing.
pub const DEFAULT_PAGES: u32 = 5;

/// Placeholder substituted with the page number in paginated listing URLs.
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// An element matched by tag name and, optionally, one class name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ElementSelector {
    pub tag: String,
    #[serde(default)]
    pub class: Option<String>,
}

impl ElementSelector {
    pub fn new(tag: &str, class: Option<&str>) -> Self {
        Self {
            tag: tag.to_string(),
            class: class.map(str::to_string),
        }
    }

    /// CSS form understood by `scraper::Selector::parse`.
    pub fn to_css(&self) -> String {
        match self.class.as_deref().map(str::trim) {
            Some(class) if !class.is_empty() => format!("{}.{}", self.tag.trim(), class),
            _ => self.tag.trim().to_string(),
        }
    }
}

/// The structural recipe for pulling items out of one source's listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SelectorRecipe {
    /// Repeated block holding one article teaser.
    pub container: ElementSelector,
    /// Mandatory heading inside the container.
    pub title: ElementSelector,
    /// Anchor looked up inside the title element.
    #[serde(default = "default_link_selector")]
    pub link: ElementSelector,
    pub time: ElementSelector,
    pub summary: ElementSelector,
    /// Read the title from the anchor's `title` attribute before its text.
    #[serde(default)]
    pub title_from_attr: bool,
}

fn default_link_selector() -> ElementSelector {
    ElementSelector::new("a", None)
}

impl SelectorRecipe {
    /// Recipe used for user-added sources that do not bring their own.
    ///
    /// Matches the common `<article><h3><a/></h3><time/><p/></article>` teaser.
    pub fn generic() -> Self {
        Self {
            container: ElementSelector::new("article", None),
            title: ElementSelector::new("h3", None),
            link: default_link_selector(),
            time: ElementSelector::new("time", None),
            summary: ElementSelector::new("p", None),
            title_from_attr: false,
        }
    }
}

/// How many pages a source spans and how many items are read from each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Paging {
    /// One page, at most `max_items` containers read.
    Single {
        #[serde(default = "default_max_items")]
        max_items: usize,
    },
    /// Pages `1..=pages` via [`PAGE_PLACEHOLDER`], every container read.
    Paged {
        #[serde(default = "default_pages")]
        pages: u32,
    },
}

fn default_max_items() -> usize {
    DEFAULT_MAX_ITEMS
}

fn default_pages() -> u32 {
    DEFAULT_PAGES
}

impl Default for Paging {
    fn default() -> Self {
        Paging::Single {
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

/// A configured news site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Stable identifier, unique within a [`crate::sources::SourceRegistry`].
    pub id: String,
    pub display_name: String,
    /// Listing page URL; may contain [`PAGE_PLACEHOLDER`] when paged.
    pub listing_url: String,
    /// Scheme and host that relative links are resolved against.
    pub origin: String,
    pub selectors: SelectorRecipe,
    pub paging: Paging,
    pub enabled: bool,
}

impl Source {
    /// URLs fetched for one run, in fetch order.
    pub fn page_urls(&self) -> Vec<String> {
        match self.paging {
            Paging::Single { .. } => vec![self.listing_url.replace(PAGE_PLACEHOLDER, "1")],
            Paging::Paged { pages } => (1..=pages)
                .map(|page| self.listing_url.replace(PAGE_PLACEHOLDER, &page.to_string()))
                .collect(),
        }
    }

    /// Container cap for each fetched page; `None` when every container is read.
    pub fn item_cap(&self) -> Option<usize> {
        match self.paging {
            Paging::Single { max_items } => Some(max_items),
            Paging::Paged { .. } => None,
        }
    }
}

/// One item as extracted from a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArticle {
    pub title: String,
    pub link: String,
    pub time_text: String,
    pub summary: String,
    pub source_id: String,
}

/// A normalized article. Built only by [`crate::aggregate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    /// Timestamp text exactly as the page showed it.
    pub raw_time_text: String,
    pub timestamp: NaiveDateTime,
    pub summary: String,
    pub source_id: String,
}

/// Why a container produced no item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingTitle,
    MissingAnchor,
    EmptyTitle,
    MissingLink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Extracted(RawArticle),
    Skipped(SkipReason),
}

/// Items pulled from every page of one source that answered.
#[derive(Debug, Default)]
pub struct SourceReport {
    pub items: Vec<RawArticle>,
    pub skipped: usize,
    /// Pages of a paginated source that could not be fetched.
    pub failed_pages: Vec<PageFailure>,
}

/// A listing page that was skipped because it could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub url: String,
    pub message: String,
}

/// Result of processing one source.
#[derive(Debug)]
pub enum SourceOutcome {
    /// At least one page was fetched; `items` may still be empty.
    Extracted(SourceReport),
    /// No page could be fetched.
    Failed(FetchError),
}

/// Progress reported while a run walks its sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    Started { source_id: String, name: String },
    /// `count` is the number of articles kept after the date filter.
    Succeeded { source_id: String, count: usize },
    /// One page of a paginated source was lost; the source carries on.
    PageFailed {
        source_id: String,
        url: String,
        message: String,
    },
    Failed { source_id: String, message: String },
}
