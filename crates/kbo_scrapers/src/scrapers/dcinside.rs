use async_trait::async_trait;
use kbo_core::{Result, Site, Team};
use scraper::Html;
use url::Url;

use super::utils;
use crate::scrapers::{ListingRow, Scraper, SourceMetadata};

/// Recommended ("개념글") tab of a team's DCInside gallery.
#[derive(Debug, Clone, Default)]
pub struct DcInsideScraper;

impl DcInsideScraper {
    pub fn new() -> Self {
        Self
    }

    const BASE_URL: &'static str = "https://gall.dcinside.com";
}

#[async_trait]
impl Scraper for DcInsideScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            site: Site::DcInside,
            base_url: Self::BASE_URL,
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["dcinside", "dc"]
    }

    fn listing_url(&self, team: &Team) -> Result<Url> {
        let base = format!("{}/board/lists/", Self::BASE_URL);
        Url::parse_with_params(&base, &[("id", team.dc_id), ("exception_mode", "recommend")])
            .map_err(Into::into)
    }

    fn parse_listing(&self, html: &str) -> Result<Vec<ListingRow>> {
        let document = Html::parse_document(html);
        let row_selector = utils::parse_selector("tr.ub-content.us-post")?;
        let title_selector = utils::parse_selector(".gall_tit a")?;
        let date_selector = utils::parse_selector(".gall_date")?;

        let mut rows = Vec::new();
        for row in document.select(&row_selector) {
            if utils::has_class(&row, "ub-notice") {
                continue;
            }

            let (Some(title), Some(date)) = (
                row.select(&title_selector).next(),
                row.select(&date_selector).next(),
            ) else {
                continue;
            };
            let Some(href) = title.value().attr("href") else {
                continue;
            };

            // The cell shows "02.18" or "14:22"; the title attribute has the full datetime.
            let posted = date
                .value()
                .attr("title")
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| utils::element_text(&date));

            rows.push(ListingRow {
                title: utils::element_text(&title),
                href: href.to_string(),
                posted,
            });
        }

        Ok(rows)
    }
}
