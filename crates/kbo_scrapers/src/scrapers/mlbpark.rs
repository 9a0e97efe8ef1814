use async_trait::async_trait;
use kbo_core::{Result, Site, Team};
use scraper::Html;
use url::Url;

use super::utils;
use crate::scrapers::{ListingRow, Scraper, SourceMetadata};

/// Title search on the MLBPARK "kbotown" board.
#[derive(Debug, Clone, Default)]
pub struct MlbParkScraper;

impl MlbParkScraper {
    pub fn new() -> Self {
        Self
    }

    const BASE_URL: &'static str = "https://mlbpark.donga.com";
}

#[async_trait]
impl Scraper for MlbParkScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            site: Site::MlbPark,
            base_url: Self::BASE_URL,
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["mlbpark", "mlb"]
    }

    fn listing_url(&self, team: &Team) -> Result<Url> {
        let base = format!("{}/mp/b.php", Self::BASE_URL);
        Url::parse_with_params(
            &base,
            &[
                ("b", "kbotown"),
                ("search_select", "subject"),
                ("search_input", team.keyword),
            ],
        )
        .map_err(Into::into)
    }

    fn parse_listing(&self, html: &str) -> Result<Vec<ListingRow>> {
        let document = Html::parse_document(html);
        let row_selector = utils::parse_selector(".tbl_type01 tbody tr")?;
        let title_selector = utils::parse_selector(".tit a")?;
        let date_selector = utils::parse_selector(".date")?;

        let rows = document
            .select(&row_selector)
            .filter(|row| !utils::has_class(row, "notice"))
            .filter_map(|row| {
                let title = row.select(&title_selector).next()?;
                let date = row.select(&date_selector).next()?;
                let href = title.value().attr("href")?;
                Some(ListingRow {
                    title: utils::element_text(&title),
                    href: href.to_string(),
                    posted: utils::element_text(&date),
                })
            })
            .collect();

        Ok(rows)
    }
}
