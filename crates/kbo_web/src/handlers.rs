use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use kbo_core::{find_team, SiteIssues, Team, TEAMS};
use serde::Deserialize;
use serde_json::json;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct IssuesQuery {
    /// Bypass the cache, like the dashboard's refresh button
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub team: Option<String>,
    #[serde(default)]
    pub refresh: bool,
}

pub async fn list_teams() -> impl IntoResponse {
    Json(TEAMS.to_vec())
}

pub async fn get_issues(
    State(state): State<Arc<AppState>>,
    Path(team): Path<String>,
    Query(query): Query<IssuesQuery>,
) -> Response {
    let team = match find_team(&team) {
        Ok(team) => team,
        Err(e) => {
            return (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() }))).into_response()
        }
    };
    if query.refresh {
        state.manager.invalidate().await;
    }
    Json(state.manager.issues_for_team(team).await).into_response()
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let team = match query.team.as_deref().map(find_team) {
        None => &TEAMS[0],
        Some(Ok(team)) => team,
        Some(Err(e)) => {
            let body = render_page(&TEAMS[0], None, Some(&e.to_string()));
            return (StatusCode::NOT_FOUND, Html(body)).into_response();
        }
    };
    if query.refresh {
        state.manager.invalidate().await;
    }
    let issues = state.manager.issues_for_team(team).await;
    Html(render_page(team, Some(&issues), None)).into_response()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub(crate) fn render_page(selected: &Team, issues: Option<&[SiteIssues]>, error: Option<&str>) -> String {
    let mut page = String::new();
    let _ = write!(
        page,
        "<!doctype html><html lang=\"ko\"><head><meta charset=\"utf-8\">\
         <title>KBO Hot Issue Monitor</title>\
         <style>body{{font-family:sans-serif;margin:2rem}}.cols{{display:flex;gap:2rem}}\
         .col{{flex:1}}.error{{color:#b00}}</style></head><body>\
         <h1>⚾ KBO Hot Issue</h1><form method=\"get\"><select name=\"team\">"
    );
    for team in TEAMS.iter() {
        let selected_attr = if team.slug == selected.slug { " selected" } else { "" };
        let _ = write!(
            page,
            "<option value=\"{}\"{}>{}</option>",
            team.slug,
            selected_attr,
            escape_html(team.name)
        );
    }
    let _ = write!(
        page,
        "</select> <button name=\"refresh\" value=\"true\">새로고침</button></form>"
    );

    if let Some(error) = error {
        let _ = write!(page, "<p class=\"error\">{}</p>", escape_html(error));
    }

    if let Some(issues) = issues {
        let _ = write!(page, "<div class=\"cols\">");
        for site in issues {
            let _ = write!(
                page,
                "<section class=\"col\"><h2>{} {}</h2><hr>",
                site.site.emoji(),
                site.site.name()
            );
            match site.status.message() {
                Some(message) => {
                    let class = if site.status.is_error() { "error" } else { "empty" };
                    let _ = write!(page, "<p class=\"{}\">{}</p>", class, escape_html(&message));
                }
                None => {
                    let _ = write!(page, "<ul>");
                    for post in &site.posts {
                        let _ = write!(
                            page,
                            "<li><a href=\"{}\"><strong>{}</strong></a> <small>{}</small></li>",
                            escape_html(&post.link),
                            escape_html(&post.title),
                            escape_html(&post.posted)
                        );
                    }
                    let _ = write!(page, "</ul>");
                }
            }
            let _ = write!(page, "</section>");
        }
        let _ = write!(page, "</div>");
    }

    page.push_str("</body></html>");
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbo_core::{FetchStatus, Post, Site};

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_render_page_lists_posts_and_errors() {
        let team = find_team("kiwoom").unwrap();
        let at = "2024-02-19T13:30:00".parse().unwrap();
        let issues = vec![
            SiteIssues::new(
                Site::DcInside,
                team,
                vec![Post {
                    site: Site::DcInside,
                    title: "<script>".to_string(),
                    link: "https://gall.dcinside.com/board/view/?id=heros_new&no=1".to_string(),
                    posted: "14:22".to_string(),
                }],
                at,
            ),
            SiteIssues::failed(Site::FmKorea, team, FetchStatus::Blocked(430), at),
        ];

        let page = render_page(team, Some(&issues), None);
        assert!(page.contains("<option value=\"kiwoom\" selected>"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<strong><script>"));
        assert!(page.contains("접속 실패 (Code: 430)"));
    }
}
