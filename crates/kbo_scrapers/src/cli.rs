use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Args, Subcommand};
use kbo_core::{classify, find_team, Result, SiteIssues};
use std::fmt::Write as _;

use crate::manager::ScraperManager;

#[derive(Args, Debug, Clone)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ScraperCommands {
    /// Show fresh posts about a team on every site
    Issues {
        /// Team slug, name or keyword (e.g. hanwha, 한화)
        team: String,
        /// Only this site (dc, mlbpark, fmkorea)
        #[arg(long)]
        site: Option<String>,
        /// Print JSON instead of the text dashboard
        #[arg(long)]
        json: bool,
    },
    /// List available scrapers
    List,
    /// Show how a raw timestamp is classified
    Classify {
        raw: String,
        /// Reference time, "YYYY-MM-DD HH:MM" or "YYYY-MM-DD"; defaults to now
        #[arg(long)]
        now: Option<String>,
    },
}

pub async fn handle_command(args: ScraperArgs, manager: &ScraperManager) -> Result<()> {
    match args.command {
        ScraperCommands::Issues { team, site, json } => {
            let team = find_team(&team)?;
            let issues = match site {
                Some(name) => {
                    let scraper = manager.get_scraper(&name)?;
                    let now = Local::now().naive_local();
                    vec![manager.site_issues(scraper.as_ref(), team, now).await]
                }
                None => manager.issues_for_team(team).await,
            };
            info!("🦗 Collected {} site listings for {}", issues.len(), team.name);
            for failed in issues.iter().filter(|i| i.status.is_error()) {
                warn!("{} unavailable: {:?}", failed.site, failed.status);
            }
            if !issues.is_empty() && issues.iter().all(|i| i.status.is_error()) {
                error!("❌ Every site failed for {}", team.name);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&issues)?);
            } else {
                print!("{}", render_issues(team.name, &issues));
            }
        }
        ScraperCommands::List => {
            println!("Available scrapers:");
            for scraper in manager.scrapers() {
                let meta = scraper.source_metadata();
                println!(
                    "  {} {} ({}) [{}]",
                    meta.site.emoji(),
                    meta.site.name(),
                    meta.base_url,
                    scraper.cli_names().join(", ")
                );
            }
        }
        ScraperCommands::Classify { raw, now } => {
            let now = match now {
                Some(s) => parse_reference_time(&s)?,
                None => Local::now().naive_local(),
            };
            let policy = &manager.config().policy;
            let shape = classify(&raw, now);
            let verdict = policy.verdict(&shape, now);
            debug!("classified {:?} against {} with {:?}", raw, now, policy);
            println!("{:?} -> {:?} -> {}", raw, shape, if verdict { "fresh" } else { "stale" });
        }
    }
    Ok(())
}

/// Accepts "YYYY-MM-DD HH:MM[:SS]" or a bare date (midnight).
pub fn parse_reference_time(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(t);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow::anyhow!("Invalid reference time: {}", s).into())
}

/// Text dashboard: one block per site, errors in place of posts.
pub fn render_issues(team_name: &str, issues: &[SiteIssues]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "⚾ {} hot issues", team_name);
    for site in issues {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} {}", site.site.emoji(), site.site.name());
        let _ = writeln!(out, "{}", "-".repeat(40));
        if let Some(message) = site.status.message() {
            let marker = if site.status.is_error() { "❌" } else { "·" };
            let _ = writeln!(out, "  {} {}", marker, message);
            continue;
        }
        for post in &site.posts {
            let _ = writeln!(out, "  • {} [{}]", post.title, post.posted);
            let _ = writeln!(out, "    {}", post.link);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbo_core::{FetchStatus, Post, Site};

    fn at() -> NaiveDateTime {
        parse_reference_time("2024-02-19 13:30").unwrap()
    }

    #[test]
    fn test_parse_reference_time() {
        assert_eq!(at().format("%Y-%m-%d %H:%M").to_string(), "2024-02-19 13:30");
        assert_eq!(
            parse_reference_time("2024-02-19").unwrap().format("%H:%M").to_string(),
            "00:00"
        );
        assert!(parse_reference_time("19/02/2024").is_err());
    }

    #[test]
    fn test_render_issues() {
        let team = find_team("hanwha").unwrap();
        let ok = SiteIssues::new(
            Site::DcInside,
            team,
            vec![Post {
                site: Site::DcInside,
                title: "오늘 선발".to_string(),
                link: "https://gall.dcinside.com/board/view/?id=hanwhaeagles_new&no=1".to_string(),
                posted: "14:22".to_string(),
            }],
            at(),
        );
        let blocked = SiteIssues::failed(Site::FmKorea, team, FetchStatus::Blocked(403), at());
        let empty = SiteIssues::new(Site::MlbPark, team, vec![], at());

        let text = render_issues(team.name, &[ok, empty, blocked]);
        assert!(text.starts_with("⚾ 한화 이글스 hot issues"));
        assert!(text.contains("  • 오늘 선발 [14:22]"));
        assert!(text.contains("· 기간 내 인기글 없음"));
        assert!(text.contains("❌ 접속 실패 (Code: 403)"));
    }

    #[tokio::test]
    async fn test_unknown_team_is_an_error() {
        let manager = ScraperManager::new(Default::default()).unwrap();
        let args = ScraperArgs {
            command: ScraperCommands::Issues {
                team: "yankees".to_string(),
                site: None,
                json: false,
            },
        };
        assert!(handle_command(args, &manager).await.is_err());
    }

    #[tokio::test]
    async fn test_classify_command_runs_offline() {
        let manager = ScraperManager::new(Default::default()).unwrap();
        let args = ScraperArgs {
            command: ScraperCommands::Classify {
                raw: "02.18".to_string(),
                now: Some("2024-02-19 13:30".to_string()),
            },
        };
        assert!(handle_command(args, &manager).await.is_ok());
    }
}
