use kbo_core::{Site, Team};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::scrapers::ListingRow;

/// Identifies one listing pass: which site, which team, which query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub site: Site,
    pub team: &'static str,
    pub query: String,
}

impl CacheKey {
    pub fn new(site: Site, team: &Team, query: impl Into<String>) -> Self {
        Self {
            site,
            team: team.slug,
            query: query.into(),
        }
    }
}

#[derive(Clone)]
struct CacheEntry<T> {
    inserted_at: Instant,
    value: T,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() < ttl
    }
}

/// Time-boxed memo of parsed listing pages, so repeated refreshes do not
/// hammer the boards. Rows are stored unfiltered; freshness is judged on
/// every read.
pub struct ListingCache {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, CacheEntry<Vec<ListingRow>>>>,
}

impl ListingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Vec<ListingRow>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: CacheKey, rows: Vec<ListingRow>) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_fresh(self.ttl));
        entries.insert(
            key,
            CacheEntry {
                inserted_at: Instant::now(),
                value: rows,
            },
        );
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
