use kbo_scrapers::ScraperManager;
use std::sync::Arc;

pub struct AppState {
    pub manager: Arc<ScraperManager>,
}

impl AppState {
    pub fn new(manager: Arc<ScraperManager>) -> Self {
        Self { manager }
    }
}
