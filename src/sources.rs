//! Source configuration: the built-in news sites and user-added ones.
//!
//! # Built-in Sources
//!
//! | Id | Site | Listing | Paging |
//! |----|------|---------|--------|
//! | `cafef` | CafeF | stock market timeline | 5 pages |
//! | `vietstock` | VietStock | `chung-khoan.htm` | first 20 items |
//! | `nguoiquansat` | Người Quan Sát | `/chung-khoan` | first 20 items |
//! | `baomoi` | Báo Mới | `chung-khoan.epi` | first 20 items |
//!
//! Sources are appended with [`SourceRegistry::add`] and are never removed;
//! [`SourceRegistry::set_enabled`] only toggles participation in a run.

use scraper::Selector;
use tracing::{debug, info};
use url::Url;

use crate::errors::ConfigError;
use crate::models::{ElementSelector, Paging, SelectorRecipe, Source};

/// Ordered, id-unique collection of configured sources.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Source>,
}

/// A user-supplied source before validation.
#[derive(Debug, Clone, Default)]
pub struct NewSource {
    pub name: String,
    pub url: String,
    pub id: Option<String>,
    pub origin: Option<String>,
    pub selectors: Option<SelectorRecipe>,
    pub paging: Option<Paging>,
}

impl NewSource {
    /// Parse a `NAME=URL` pair as given on the command line.
    pub fn from_spec(spec: &str) -> Result<Self, ConfigError> {
        let (name, url) = spec
            .split_once('=')
            .ok_or_else(|| ConfigError::MalformedSpec(spec.to_string()))?;
        Ok(Self {
            name: name.trim().to_string(),
            url: url.trim().to_string(),
            ..Self::default()
        })
    }
}

/// Identifier for a user source: lower-cased, spaces replaced with `_`.
pub fn derive_source_id(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

impl SourceRegistry {
    /// Registry holding the four built-in sites, all enabled.
    pub fn builtin() -> Self {
        Self {
            sources: builtin_sources(),
        }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn get(&self, id: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Enabled sources, in configuration order.
    pub fn active(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter().filter(|s| s.enabled)
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<(), ConfigError> {
        let source = self
            .sources
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ConfigError::UnknownSource(id.to_string()))?;
        source.enabled = enabled;
        debug!(source_id = %id, enabled, "Toggled source");
        Ok(())
    }

    /// Validate and append a user source. On error the registry is unchanged.
    ///
    /// # Arguments
    /// * `new` - Name, listing URL and optional recipe; the id is derived
    ///   from the name when absent
    ///
    /// # Returns
    /// The stored [`Source`], enabled, or the [`ConfigError`] that rejected it.
    pub fn add(&mut self, new: NewSource) -> Result<&Source, ConfigError> {
        let source = self.validate(new)?;
        info!(source_id = %source.id, url = %source.listing_url, "Added source");
        self.sources.push(source);
        Ok(&self.sources[self.sources.len() - 1])
    }

    fn validate(&self, new: NewSource) -> Result<Source, ConfigError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        let url = new.url.trim();
        if url.is_empty() {
            return Err(ConfigError::EmptyUrl);
        }

        let id = match new.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => derive_source_id(name),
        };
        if self.get(&id).is_some() {
            return Err(ConfigError::DuplicateId(id));
        }

        let origin = match new.origin {
            Some(origin) => origin_of(&origin)?,
            None => origin_of(url)?,
        };

        let selectors = new.selectors.unwrap_or_else(SelectorRecipe::generic);
        check_selectors(&id, &selectors)?;

        Ok(Source {
            id,
            display_name: name.to_string(),
            listing_url: url.to_string(),
            origin,
            selectors,
            paging: new.paging.unwrap_or_default(),
            enabled: true,
        })
    }
}

/// `scheme://host[:port]` of an absolute http(s) URL.
fn origin_of(url: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(url).map_err(|_| ConfigError::InvalidUrl(url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(url.to_string()));
    }
    Ok(parsed.origin().ascii_serialization())
}

fn check_selectors(source_id: &str, recipe: &SelectorRecipe) -> Result<(), ConfigError> {
    let fields: [(&'static str, &ElementSelector); 5] = [
        ("container", &recipe.container),
        ("title", &recipe.title),
        ("link", &recipe.link),
        ("time", &recipe.time),
        ("summary", &recipe.summary),
    ];
    for (field, selector) in fields {
        let css = selector.to_css();
        if css.is_empty() || Selector::parse(&css).is_err() {
            return Err(ConfigError::InvalidSelector {
                source_id: source_id.to_string(),
                field,
                selector: css,
            });
        }
    }
    Ok(())
}

fn recipe(
    container: (&str, &str),
    title: (&str, Option<&str>),
    time: (&str, Option<&str>),
    summary: (&str, &str),
    title_from_attr: bool,
) -> SelectorRecipe {
    SelectorRecipe {
        container: ElementSelector::new(container.0, Some(container.1)),
        title: ElementSelector::new(title.0, title.1),
        link: ElementSelector::new("a", None),
        time: ElementSelector::new(time.0, time.1),
        summary: ElementSelector::new(summary.0, Some(summary.1)),
        title_from_attr,
    }
}

fn builtin_sources() -> Vec<Source> {
    vec![
        Source {
            id: "cafef".to_string(),
            display_name: "CafeF".to_string(),
            listing_url: "https://cafef.vn/timeline/3/trang-{page}.chn".to_string(),
            origin: "https://cafef.vn".to_string(),
            selectors: recipe(
                ("div", "tlitem"),
                ("h3", Some("title")),
                ("span", Some("time")),
                ("p", "sapo"),
                false,
            ),
            paging: Paging::Paged { pages: 5 },
            enabled: true,
        },
        Source {
            id: "vietstock".to_string(),
            display_name: "VietStock".to_string(),
            listing_url: "https://vietstock.vn/chung-khoan.htm".to_string(),
            origin: "https://vietstock.vn".to_string(),
            selectors: recipe(
                ("div", "news-item"),
                ("h3", None),
                ("span", Some("date")),
                ("p", "desc"),
                false,
            ),
            paging: Paging::default(),
            enabled: true,
        },
        Source {
            id: "nguoiquansat".to_string(),
            display_name: "Người Quan Sát".to_string(),
            listing_url: "https://nguoiquansat.vn/chung-khoan".to_string(),
            origin: "https://nguoiquansat.vn".to_string(),
            selectors: recipe(
                ("article", "item-news"),
                ("h3", Some("title-news")),
                ("span", Some("time-ago")),
                ("div", "sapo"),
                false,
            ),
            paging: Paging::default(),
            enabled: true,
        },
        Source {
            id: "baomoi".to_string(),
            display_name: "Báo Mới".to_string(),
            listing_url: "https://baomoi.com/chung-khoan.epi".to_string(),
            origin: "https://baomoi.com".to_string(),
            selectors: recipe(
                ("div", "story"),
                ("h4", Some("story__heading")),
                ("time", None),
                ("div", "story__summary"),
                true,
            ),
            paging: Paging::default(),
            enabled: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sources() {
        let registry = SourceRegistry::builtin();
        let ids: Vec<&str> = registry.sources().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["cafef", "vietstock", "nguoiquansat", "baomoi"]);
        assert_eq!(registry.active().count(), 4);
        for source in registry.sources() {
            check_selectors(&source.id, &source.selectors).unwrap();
        }
        assert!(registry.get("baomoi").unwrap().selectors.title_from_attr);
        assert_eq!(
            registry.get("cafef").unwrap().paging,
            Paging::Paged { pages: 5 }
        );
    }

    #[test]
    fn test_derive_source_id() {
        assert_eq!(derive_source_id("Tin Nhanh"), "tin_nhanh");
        assert_eq!(derive_source_id("  Đầu Tư Online "), "đầu_tư_online");
        assert_eq!(derive_source_id("vneconomy"), "vneconomy");
    }

    #[test]
    fn test_add_custom_source() {
        let mut registry = SourceRegistry::builtin();
        let added = registry
            .add(NewSource {
                name: "Đầu Tư".to_string(),
                url: "https://www.dautu.vn/chung-khoan".to_string(),
                ..NewSource::default()
            })
            .unwrap();
        assert_eq!(added.id, "đầu_tư");
        assert_eq!(added.origin, "https://www.dautu.vn");
        assert_eq!(added.selectors, SelectorRecipe::generic());
        assert!(added.enabled);
        assert_eq!(registry.sources().len(), 5);
        assert_eq!(registry.sources()[4].id, "đầu_tư");
    }

    #[test]
    fn test_add_rejects_empty_fields_without_mutation() {
        let mut registry = SourceRegistry::builtin();
        let err = registry
            .add(NewSource {
                name: "  ".to_string(),
                url: "https://example.vn".to_string(),
                ..NewSource::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyName));

        let err = registry
            .add(NewSource {
                name: "Example".to_string(),
                url: String::new(),
                ..NewSource::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyUrl));
        assert_eq!(registry.sources().len(), 4);
    }

    #[test]
    fn test_add_rejects_duplicate_and_bad_url() {
        let mut registry = SourceRegistry::builtin();
        let err = registry
            .add(NewSource {
                name: "CafeF".to_string(),
                url: "https://cafef.vn/other".to_string(),
                ..NewSource::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateId(id) if id == "cafef"));

        let err = registry
            .add(NewSource {
                name: "Broken".to_string(),
                url: "cafef.vn/chung-khoan".to_string(),
                ..NewSource::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
        assert_eq!(registry.sources().len(), 4);
    }

    #[test]
    fn test_add_rejects_bad_selector() {
        let mut registry = SourceRegistry::builtin();
        let mut selectors = SelectorRecipe::generic();
        selectors.title = ElementSelector::new("h3", Some("[broken"));
        let err = registry
            .add(NewSource {
                name: "Bad".to_string(),
                url: "https://bad.vn".to_string(),
                selectors: Some(selectors),
                ..NewSource::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSelector { field: "title", .. }));
    }

    #[test]
    fn test_from_spec() {
        let new = NewSource::from_spec("Tin Nhanh = https://tinnhanh.vn/ck").unwrap();
        assert_eq!(new.name, "Tin Nhanh");
        assert_eq!(new.url, "https://tinnhanh.vn/ck");
        assert!(NewSource::from_spec("no-separator").is_err());
    }

    #[test]
    fn test_set_enabled() {
        let mut registry = SourceRegistry::builtin();
        registry.set_enabled("vietstock", false).unwrap();
        let active: Vec<&str> = registry.active().map(|s| s.id.as_str()).collect();
        assert_eq!(active, vec!["cafef", "nguoiquansat", "baomoi"]);
        assert!(matches!(
            registry.set_enabled("nope", true),
            Err(ConfigError::UnknownSource(_))
        ));
    }
}
