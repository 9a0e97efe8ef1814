use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Community sites the monitor reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    DcInside,
    MlbPark,
    FmKorea,
}

impl Site {
    pub const ALL: [Site; 3] = [Site::DcInside, Site::MlbPark, Site::FmKorea];

    pub fn name(&self) -> &'static str {
        match self {
            Site::DcInside => "DC",
            Site::MlbPark => "MLBPARK",
            Site::FmKorea => "FMKOREA",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Site::DcInside => "dcinside",
            Site::MlbPark => "mlbpark",
            Site::FmKorea => "fmkorea",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Site::DcInside => "👿",
            Site::MlbPark => "🏟️",
            Site::FmKorea => "⚽",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Team {
    /// Display name, e.g. "한화 이글스"
    pub name: &'static str,
    /// ASCII handle used on the command line and in URLs
    pub slug: &'static str,
    /// DCInside gallery id
    pub dc_id: &'static str,
    /// Search keyword for the sites without per-team boards
    pub keyword: &'static str,
}

/// A post that passed the freshness filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub site: Site,
    pub title: String,
    /// Absolute URL of the post
    pub link: String,
    /// Timestamp exactly as the site printed it
    pub posted: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchStatus {
    Ok,
    /// The listing loaded but nothing inside the window was found
    Empty,
    /// Non-success HTTP status, usually bot protection
    Blocked(u16),
    Failed(String),
    TimedOut,
}

impl FetchStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, FetchStatus::Blocked(_) | FetchStatus::Failed(_) | FetchStatus::TimedOut)
    }

    pub fn message(&self) -> Option<String> {
        match self {
            FetchStatus::Ok => None,
            FetchStatus::Empty => Some("기간 내 인기글 없음".to_string()),
            FetchStatus::Blocked(code) => Some(format!("접속 실패 (Code: {})", code)),
            FetchStatus::Failed(reason) => Some(format!("에러: {}", reason)),
            FetchStatus::TimedOut => Some("시간 초과".to_string()),
        }
    }
}

/// Result of one listing pass over one site for one team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteIssues {
    pub site: Site,
    pub team: String,
    pub posts: Vec<Post>,
    pub status: FetchStatus,
    pub fetched_at: NaiveDateTime,
}

impl SiteIssues {
    pub fn new(site: Site, team: &Team, posts: Vec<Post>, fetched_at: NaiveDateTime) -> Self {
        let status = if posts.is_empty() { FetchStatus::Empty } else { FetchStatus::Ok };
        Self {
            site,
            team: team.name.to_string(),
            posts,
            status,
            fetched_at,
        }
    }

    pub fn failed(site: Site, team: &Team, status: FetchStatus, fetched_at: NaiveDateTime) -> Self {
        Self {
            site,
            team: team.name.to_string(),
            posts: Vec::new(),
            status,
            fetched_at,
        }
    }
}
