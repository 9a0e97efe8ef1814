#[macro_use]
pub mod logging;
pub mod cache;
pub mod cli;
pub mod manager;
pub mod scrapers;

pub use cache::{CacheKey, ListingCache};
pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use manager::{ScrapeConfig, ScraperManager};
pub use scrapers::Scraper;
