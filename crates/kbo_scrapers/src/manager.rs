use chrono::{Local, NaiveDateTime};
use futures::future::join_all;
use kbo_core::{classify, Error, FetchStatus, FreshnessPolicy, Post, Result, SiteIssues, Team};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheKey, ListingCache};
use crate::logging::Logger;
use crate::scrapers::{get_scraper_factories, utils, ListingRow, Scraper, SourceMetadata};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub policy: FreshnessPolicy,
    /// Posts kept per site
    pub limit: usize,
    /// Budget for one site's fetch
    pub timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            policy: FreshnessPolicy::default(),
            limit: 3,
            timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

pub struct ScraperManager {
    client: reqwest::Client,
    scrapers: Vec<Arc<dyn Scraper>>,
    config: ScrapeConfig,
    cache: ListingCache,
}

impl ScraperManager {
    pub fn new(config: ScrapeConfig) -> Result<Self> {
        let scrapers: Vec<Arc<dyn Scraper>> = get_scraper_factories()
            .iter()
            .map(|factory| Arc::from(factory()))
            .collect();
        Self::with_scrapers(config, scrapers)
    }

    pub fn with_scrapers(config: ScrapeConfig, scrapers: Vec<Arc<dyn Scraper>>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            scrapers,
            cache: ListingCache::new(config.cache_ttl),
            config,
        })
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    pub fn scrapers(&self) -> &[Arc<dyn Scraper>] {
        &self.scrapers
    }

    pub fn get_scraper(&self, name: &str) -> Result<Arc<dyn Scraper>> {
        self.scrapers
            .iter()
            .find(|s| s.cli_names().iter().any(|n| n.eq_ignore_ascii_case(name)))
            .cloned()
            .ok_or_else(|| Error::Scraping(format!("No scraper found for {}", name)))
    }

    /// Drops every cached listing so the next pass hits the network.
    pub async fn invalidate(&self) {
        self.cache.clear().await;
    }

    pub async fn issues_for_team(&self, team: &Team) -> Vec<SiteIssues> {
        self.issues_for_team_at(team, Local::now().naive_local()).await
    }

    /// Runs every site concurrently; results come back in scraper order.
    pub async fn issues_for_team_at(&self, team: &Team, now: NaiveDateTime) -> Vec<SiteIssues> {
        let passes = self
            .scrapers
            .iter()
            .map(|scraper| self.site_issues(scraper.as_ref(), team, now));
        join_all(passes).await
    }

    /// One listing pass: fetch, parse, filter by freshness, keep the top N.
    /// Failures end up in the returned status, never as an error.
    pub async fn site_issues(&self, scraper: &dyn Scraper, team: &Team, now: NaiveDateTime) -> SiteIssues {
        let meta = scraper.source_metadata();
        let logger = Logger::new()
            .with_prefix(format!("[{}]", meta.site.slug()))
            .with_prefix(format!("[{}]", team.slug));

        let key = match scraper.listing_url(team) {
            Ok(url) => CacheKey::new(meta.site, team, url.as_str()),
            Err(e) => {
                logger.error(&format!("cannot build listing URL: {}", e));
                return SiteIssues::failed(meta.site, team, FetchStatus::Failed(e.to_string()), now);
            }
        };

        let rows = match self.cache.get(&key).await {
            Some(rows) => {
                logger.debug(&format!("served {} rows from cache", rows.len()));
                rows
            }
            None => match self.fetch_rows(scraper, team, &logger).await {
                Ok(rows) => {
                    self.cache.insert(key, rows.clone()).await;
                    rows
                }
                Err(status) => return SiteIssues::failed(meta.site, team, status, now),
            },
        };

        let posts = self.select_fresh(&meta, rows, now, &logger);
        logger.info(&format!("{} fresh posts", posts.len()));
        SiteIssues::new(meta.site, team, posts, now)
    }

    /// Fetches and parses one listing page. Errors come back as the status to report.
    async fn fetch_rows(&self, scraper: &dyn Scraper, team: &Team, logger: &Logger) -> std::result::Result<Vec<ListingRow>, FetchStatus> {
        let fetched = tokio::time::timeout(self.config.timeout, scraper.fetch_listing(&self.client, team)).await;
        let html = match fetched {
            Err(_) => {
                logger.warn(&format!("timed out after {:?}", self.config.timeout));
                return Err(FetchStatus::TimedOut);
            }
            Ok(Err(Error::Status(code))) => {
                logger.warn(&format!("listing returned HTTP {}", code));
                return Err(FetchStatus::Blocked(code));
            }
            Ok(Err(e)) => {
                logger.error(&format!("fetch failed: {}", e));
                return Err(FetchStatus::Failed(e.to_string()));
            }
            Ok(Ok(html)) => html,
        };

        match scraper.parse_listing(&html) {
            Ok(rows) => {
                logger.debug(&format!("parsed {} rows", rows.len()));
                Ok(rows)
            }
            Err(e) => {
                logger.error(&format!("parse failed: {}", e));
                Err(FetchStatus::Failed(e.to_string()))
            }
        }
    }

    fn select_fresh(&self, meta: &SourceMetadata, rows: Vec<ListingRow>, now: NaiveDateTime, logger: &Logger) -> Vec<Post> {
        rows.into_iter()
            .filter_map(|row| {
                let shape = classify(&row.posted, now);
                if !self.config.policy.verdict(&shape, now) {
                    logger.debug(&format!("skipping {:?} ({:?}): {}", row.posted, shape, row.title));
                    return None;
                }
                match utils::absolute_link(meta.base_url, &row.href) {
                    Ok(link) => Some(Post {
                        site: meta.site,
                        title: row.title,
                        link,
                        posted: row.posted,
                    }),
                    Err(e) => {
                        logger.warn(&format!("bad link {:?}: {}", row.href, e));
                        None
                    }
                }
            })
            .take(self.config.limit)
            .collect()
    }
}
