use async_trait::async_trait;
use kbo_core::{Result, Site, Team};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::utils;
use crate::scrapers::{ListingRow, Scraper, SourceMetadata};

/// FMKorea baseball board search.
#[derive(Debug, Clone, Default)]
pub struct FmKoreaScraper;

impl FmKoreaScraper {
    pub fn new() -> Self {
        Self
    }

    const BASE_URL: &'static str = "https://www.fmkorea.com";

    // The search page renders in one of two layouts.
    const POPULAR_ITEMS: &'static str = ".li.li_best2_pop0";
    const PLAIN_ITEMS: &'static str = ".searchResult > li";
}

fn first_match<'a>(item: &ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|s| item.select(s).next())
}

#[async_trait]
impl Scraper for FmKoreaScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            site: Site::FmKorea,
            base_url: Self::BASE_URL,
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["fmkorea", "fmk"]
    }

    fn listing_url(&self, team: &Team) -> Result<Url> {
        let base = format!("{}/search.php", Self::BASE_URL);
        Url::parse_with_params(
            &base,
            &[
                ("mid", "baseball"),
                ("search_keyword", team.keyword),
                ("search_target", "title_content"),
            ],
        )
        .map_err(Into::into)
    }

    fn parse_listing(&self, html: &str) -> Result<Vec<ListingRow>> {
        let document = Html::parse_document(html);
        let popular = utils::parse_selector(Self::POPULAR_ITEMS)?;
        let plain = utils::parse_selector(Self::PLAIN_ITEMS)?;
        let time_selectors = [utils::parse_selector(".time")?, utils::parse_selector(".regdate")?];
        let title_selector = utils::parse_selector("dl > dt > a")?;

        let mut items: Vec<ElementRef> = document.select(&popular).collect();
        if items.is_empty() {
            items = document.select(&plain).collect();
        }

        let rows = items
            .iter()
            .filter_map(|item| {
                let time = first_match(item, &time_selectors)?;
                let title = item.select(&title_selector).next()?;
                let href = title.value().attr("href")?;
                Some(ListingRow {
                    title: utils::element_text(&title),
                    href: href.to_string(),
                    posted: utils::element_text(&time),
                })
            })
            .collect();

        Ok(rows)
    }
}
