pub mod error;
pub mod freshness;
pub mod teams;
pub mod types;

pub use error::{Error, Result};
pub use freshness::{classify, is_fresh, FreshnessPolicy, TimestampShape};
pub use teams::{find_team, TEAMS};
pub use types::{FetchStatus, Post, Site, SiteIssues, Team};
