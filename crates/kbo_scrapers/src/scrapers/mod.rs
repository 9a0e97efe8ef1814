use async_trait::async_trait;
use kbo_core::{Error, Result, Site, Team};
use url::Url;

pub mod dcinside;
pub mod fmkorea;
pub mod mlbpark;

pub use dcinside::DcInsideScraper;
pub use fmkorea::FmKoreaScraper;
pub use mlbpark::MlbParkScraper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMetadata {
    pub site: Site,
    /// Base that relative post links are resolved against
    pub base_url: &'static str,
}

/// One post row as it appears on a listing page, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub title: String,
    pub href: String,
    pub posted: String,
}

#[async_trait]
pub trait Scraper: Send + Sync {
    fn source_metadata(&self) -> SourceMetadata;

    /// Listing page holding the team's posts
    fn listing_url(&self, team: &Team) -> Result<Url>;

    /// Extracts post rows in page order, skipping notices
    fn parse_listing(&self, html: &str) -> Result<Vec<ListingRow>>;

    /// Downloads the listing page. Non-success statuses become [`Error::Status`].
    async fn fetch_listing(&self, client: &reqwest::Client, team: &Team) -> Result<String> {
        let url = self.listing_url(team)?;
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Returns a list of CLI shorthand names for this scraper
    fn cli_names(&self) -> Vec<&str> {
        vec![]
    }
}

pub type ScraperFactory = Box<dyn Fn() -> Box<dyn Scraper> + Send + Sync>;

pub fn get_scraper_factories() -> Vec<ScraperFactory> {
    vec![
        Box::new(|| Box::new(DcInsideScraper::new())),
        Box::new(|| Box::new(MlbParkScraper::new())),
        Box::new(|| Box::new(FmKoreaScraper::new())),
    ]
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use super::*;
    use scraper::{ElementRef, Selector};

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
    }

    pub fn parse_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector)
            .map_err(|e| Error::Scraping(format!("Invalid selector {}: {:?}", selector, e)))
    }

    /// Text content with runs of whitespace collapsed.
    pub fn element_text(element: &ElementRef) -> String {
        element
            .text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn has_class(element: &ElementRef, class: &str) -> bool {
        element.value().classes().any(|c| c == class)
    }

    /// Resolves `href` against the site base; absolute hrefs pass through.
    pub fn absolute_link(base: &str, href: &str) -> Result<String> {
        let joined = parse_url(base)?.join(href.trim())?;
        Ok(joined.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::utils;
    use super::*;
    use scraper::Html;

    #[test]
    fn test_parse_url() {
        assert!(utils::parse_url("https://gall.dcinside.com").is_ok());
        assert!(utils::parse_url("invalid-url").is_err());
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let html = r#"<div class="title">
            오늘   경기
            후기 </div>"#;
        let document = Html::parse_fragment(html);
        let selector = utils::parse_selector(".title").unwrap();
        let element = document.select(&selector).next().unwrap();
        assert_eq!(utils::element_text(&element), "오늘 경기 후기");
        assert!(utils::has_class(&element, "title"));
        assert!(!utils::has_class(&element, "notice"));
    }

    #[test]
    fn test_absolute_link() {
        assert_eq!(
            utils::absolute_link("https://gall.dcinside.com", "/board/view/?id=ktwiz&no=7").unwrap(),
            "https://gall.dcinside.com/board/view/?id=ktwiz&no=7"
        );
        assert_eq!(
            utils::absolute_link("https://www.fmkorea.com", "https://www.fmkorea.com/123").unwrap(),
            "https://www.fmkorea.com/123"
        );
        assert_eq!(
            utils::absolute_link("https://www.fmkorea.com", "//www.fmkorea.com/456").unwrap(),
            "https://www.fmkorea.com/456"
        );
    }

    #[test]
    fn test_factories_cover_every_site() {
        let sites: Vec<Site> = get_scraper_factories()
            .iter()
            .map(|f| f().source_metadata().site)
            .collect();
        assert_eq!(sites, Site::ALL.to_vec());
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        assert!(matches!(utils::parse_selector("tr..x"), Err(Error::Scraping(_))));
    }
}
