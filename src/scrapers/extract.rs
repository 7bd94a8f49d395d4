//! Generic listing-page extractor.
//!
//! One routine serves every source: the [`SelectorRecipe`] names the repeated
//! container and the title, link, time and summary elements inside it.
//!
//! For each container, in document order:
//!
//! 1. the title element is required, otherwise the item is skipped
//! 2. the anchor inside the title is required, otherwise the item is skipped
//! 3. the title is the anchor text, or its `title` attribute when preferred
//! 4. the link is the anchor `href`, resolved against the source origin
//! 5. time and summary fall back to the empty string
//!
//! A skipped item never affects its siblings.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use crate::errors::ConfigError;
use crate::models::{ItemOutcome, RawArticle, SelectorRecipe, SkipReason, Source};

/// A source's recipe with every selector parsed, plus its origin.
#[derive(Debug)]
pub struct CompiledRecipe {
    source_id: String,
    origin: Url,
    container: Selector,
    title: Selector,
    link: Selector,
    time: Selector,
    summary: Selector,
    title_from_attr: bool,
    cap: Option<usize>,
}

impl CompiledRecipe {
    pub fn compile(source: &Source) -> Result<Self, ConfigError> {
        let origin =
            Url::parse(&source.origin).map_err(|_| ConfigError::InvalidUrl(source.origin.clone()))?;
        let recipe: &SelectorRecipe = &source.selectors;
        let parse = |field: &'static str, css: String| {
            Selector::parse(&css).map_err(|_| ConfigError::InvalidSelector {
                source_id: source.id.clone(),
                field,
                selector: css.clone(),
            })
        };

        Ok(Self {
            source_id: source.id.clone(),
            origin,
            container: parse("container", recipe.container.to_css())?,
            title: parse("title", recipe.title.to_css())?,
            link: parse("link", recipe.link.to_css())?,
            time: parse("time", recipe.time.to_css())?,
            summary: parse("summary", recipe.summary.to_css())?,
            title_from_attr: recipe.title_from_attr,
            cap: source.item_cap(),
        })
    }

    /// Run the recipe over one page of HTML.
    ///
    /// # Arguments
    /// * `html` - Listing page body
    ///
    /// # Returns
    /// One outcome per container read, in document order. Single-page sources
    /// read at most their item cap.
    #[instrument(level = "debug", skip_all, fields(source = %self.source_id, bytes = html.len()))]
    pub fn extract_page(&self, html: &str) -> Vec<ItemOutcome> {
        let document = Html::parse_document(html);
        let outcomes: Vec<ItemOutcome> = document
            .select(&self.container)
            .take(self.cap.unwrap_or(usize::MAX))
            .map(|container| self.extract_item(container))
            .collect();

        debug!(containers = outcomes.len(), "Extracted listing page");
        outcomes
    }

    fn extract_item(&self, container: ElementRef<'_>) -> ItemOutcome {
        let Some(heading) = container.select(&self.title).next() else {
            return ItemOutcome::Skipped(SkipReason::MissingTitle);
        };
        let Some(anchor) = heading.select(&self.link).next() else {
            return ItemOutcome::Skipped(SkipReason::MissingAnchor);
        };

        let title = self
            .title_from_attr
            .then(|| anchor.value().attr("title").map(str::trim))
            .flatten()
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| element_text(anchor));
        if title.is_empty() {
            return ItemOutcome::Skipped(SkipReason::EmptyTitle);
        }

        let Some(link) = anchor
            .value()
            .attr("href")
            .and_then(|href| resolve_link(&self.origin, href))
        else {
            return ItemOutcome::Skipped(SkipReason::MissingLink);
        };

        let field = |selector: &Selector| {
            container
                .select(selector)
                .next()
                .map(element_text)
                .unwrap_or_default()
        };

        ItemOutcome::Extracted(RawArticle {
            title,
            link,
            time_text: field(&self.time),
            summary: field(&self.summary),
            source_id: self.source_id.clone(),
        })
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Turn an anchor `href` into an absolute article URL.
///
/// # Arguments
/// * `origin` - Scheme and host of the source
/// * `href` - Raw attribute value
///
/// # Returns
/// Absolute `http`/`https` links unchanged, relative ones joined onto
/// `origin`. `None` for an empty href, one that cannot be resolved, or any
/// other scheme (`javascript:`, `mailto:`).
pub fn resolve_link(origin: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match Url::parse(href) {
        Ok(url) if is_web(&url) => Some(href.to_string()),
        Ok(_) => None,
        Err(_) => origin
            .join(href)
            .ok()
            .filter(is_web)
            .map(String::from),
    }
}

fn is_web(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Paging;
    use crate::sources::SourceRegistry;

    fn origin() -> Url {
        Url::parse("https://cafef.vn").unwrap()
    }

    fn compiled(id: &str) -> CompiledRecipe {
        let registry = SourceRegistry::builtin();
        CompiledRecipe::compile(registry.get(id).unwrap()).unwrap()
    }

    fn extracted(outcomes: &[ItemOutcome]) -> Vec<&RawArticle> {
        outcomes
            .iter()
            .filter_map(|o| match o {
                ItemOutcome::Extracted(raw) => Some(raw),
                ItemOutcome::Skipped(_) => None,
            })
            .collect()
    }

    const CAFEF_PAGE: &str = r#"
        <html><body>
          <div class="tlitem">
            <h3 class="title"><a href="/vn-index-tang-diem-188.chn"> VN-Index tăng điểm </a></h3>
            <span class="time">5 phút trước</span>
            <p class="sapo">Thị trường khởi sắc.</p>
          </div>
          <div class="tlitem">
            <h4>Không có tiêu đề chuẩn</h4>
            <span class="time">1 giờ trước</span>
          </div>
          <div class="tlitem">
            <h3 class="title"><a href="https://cafef.vn/khoi-ngoai-ban-rong-189.chn">Khối ngoại bán ròng</a></h3>
          </div>
          <div class="tlitem">
            <h3 class="title">Tiêu đề không có liên kết</h3>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_extracts_fields_and_skips_broken_items() {
        let outcomes = compiled("cafef").extract_page(CAFEF_PAGE);
        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[1], ItemOutcome::Skipped(SkipReason::MissingTitle));
        assert_eq!(outcomes[3], ItemOutcome::Skipped(SkipReason::MissingAnchor));

        let items = extracted(&outcomes);
        assert_eq!(items.len(), 2);
        assert_eq!(
            *items[0],
            RawArticle {
                title: "VN-Index tăng điểm".to_string(),
                link: "https://cafef.vn/vn-index-tang-diem-188.chn".to_string(),
                time_text: "5 phút trước".to_string(),
                summary: "Thị trường khởi sắc.".to_string(),
                source_id: "cafef".to_string(),
            }
        );
        assert_eq!(items[1].title, "Khối ngoại bán ròng");
        assert_eq!(items[1].time_text, "");
        assert_eq!(items[1].summary, "");
    }

    #[test]
    fn test_title_attribute_preferred_when_configured() {
        let html = r#"
            <div class="story">
              <h4 class="story__heading"><a href="/c/1.epi" title="Tiêu đề đầy đủ">Tiêu đề ngắn…</a></h4>
              <time>2 giờ trước</time>
              <div class="story__summary">Tóm tắt</div>
            </div>
            <div class="story">
              <h4 class="story__heading"><a href="/c/2.epi" title="  ">Chỉ có chữ</a></h4>
            </div>
        "#;
        let outcomes = compiled("baomoi").extract_page(html);
        let items = extracted(&outcomes);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Tiêu đề đầy đủ");
        assert_eq!(items[0].link, "https://baomoi.com/c/1.epi");
        assert_eq!(items[0].time_text, "2 giờ trước");
        assert_eq!(items[1].title, "Chỉ có chữ");
    }

    #[test]
    fn test_empty_title_and_missing_href_are_skipped() {
        let html = r#"
            <div class="news-item"><h3><a href="/a.htm">   </a></h3></div>
            <div class="news-item"><h3><a>Không có href</a></h3></div>
            <div class="news-item"><h3><a href="/b.htm">Hợp lệ</a></h3></div>
        "#;
        let outcomes = compiled("vietstock").extract_page(html);
        assert_eq!(outcomes[0], ItemOutcome::Skipped(SkipReason::EmptyTitle));
        assert_eq!(outcomes[1], ItemOutcome::Skipped(SkipReason::MissingLink));
        assert_eq!(extracted(&outcomes)[0].link, "https://vietstock.vn/b.htm");
    }

    #[test]
    fn test_single_page_sources_are_capped() {
        let item = r#"<article class="item-news"><h3 class="title-news"><a href="/x">Tin</a></h3></article>"#;
        let html = item.repeat(25);
        let outcomes = compiled("nguoiquansat").extract_page(&html);
        assert_eq!(outcomes.len(), 20);
    }

    #[test]
    fn test_paged_sources_are_not_capped() {
        let mut source = SourceRegistry::builtin().get("cafef").unwrap().clone();
        source.paging = Paging::Paged { pages: 1 };
        let recipe = CompiledRecipe::compile(&source).unwrap();
        let item = r#"<div class="tlitem"><h3 class="title"><a href="/x.chn">Tin</a></h3></div>"#;
        assert_eq!(recipe.extract_page(&item.repeat(30)).len(), 30);
    }

    #[test]
    fn test_page_without_containers() {
        assert!(compiled("cafef").extract_page("<html><body></body></html>").is_empty());
        assert!(compiled("cafef").extract_page("not even html").is_empty());
    }

    #[test]
    fn test_resolve_link() {
        assert_eq!(
            resolve_link(&origin(), "/thi-truong.chn").as_deref(),
            Some("https://cafef.vn/thi-truong.chn")
        );
        assert_eq!(
            resolve_link(&origin(), "thi-truong.chn").as_deref(),
            Some("https://cafef.vn/thi-truong.chn")
        );
        assert_eq!(
            resolve_link(&origin(), "https://s.cafef.vn/a.chn?x=1").as_deref(),
            Some("https://s.cafef.vn/a.chn?x=1")
        );
        assert_eq!(
            resolve_link(&origin(), "//cdn.cafef.vn/b.chn").as_deref(),
            Some("https://cdn.cafef.vn/b.chn")
        );
        assert_eq!(resolve_link(&origin(), "  "), None);
    }

    #[test]
    fn test_non_web_links_are_rejected() {
        assert_eq!(resolve_link(&origin(), "javascript:void(0)"), None);
        assert_eq!(resolve_link(&origin(), "mailto:toasoan@cafef.vn"), None);
        assert_eq!(resolve_link(&origin(), "tel:0243"), None);

        let html = r#"
            <div class="news-item"><h3><a href="javascript:void(0)">Xem thêm</a></h3></div>
            <div class="news-item"><h3><a href="/c.htm">Hợp lệ</a></h3></div>
        "#;
        let outcomes = compiled("vietstock").extract_page(html);
        assert_eq!(outcomes[0], ItemOutcome::Skipped(SkipReason::MissingLink));
        assert_eq!(extracted(&outcomes)[0].link, "https://vietstock.vn/c.htm");
    }
}
