use crate::types::Team;
use crate::{Error, Result};

pub static TEAMS: [Team; 10] = [
    Team { name: "한화 이글스", slug: "hanwha", dc_id: "hanwhaeagles_new", keyword: "한화" },
    Team { name: "KIA 타이거즈", slug: "kia", dc_id: "tigers_new", keyword: "기아" },
    Team { name: "롯데 자이언츠", slug: "lotte", dc_id: "giants_new2", keyword: "롯데" },
    Team { name: "LG 트윈스", slug: "lg", dc_id: "lgtwins_new", keyword: "LG" },
    Team { name: "두산 베어스", slug: "doosan", dc_id: "doosanbears_new1", keyword: "두산" },
    Team { name: "삼성 라이온즈", slug: "samsung", dc_id: "samsunglions_new", keyword: "삼성" },
    Team { name: "SSG 랜더스", slug: "ssg", dc_id: "wyverns_new", keyword: "SSG" },
    Team { name: "키움 히어로즈", slug: "kiwoom", dc_id: "heros_new", keyword: "키움" },
    Team { name: "NC 다이노스", slug: "nc", dc_id: "ncdinos", keyword: "NC" },
    Team { name: "KT 위즈", slug: "kt", dc_id: "ktwiz", keyword: "KT" },
];

/// Looks a team up by slug, display name or search keyword.
pub fn find_team(query: &str) -> Result<&'static Team> {
    let query = query.trim();
    TEAMS
        .iter()
        .find(|t| {
            t.slug.eq_ignore_ascii_case(query)
                || t.name == query
                || t.keyword.eq_ignore_ascii_case(query)
        })
        .ok_or_else(|| Error::UnknownTeam(query.to_string()))
}
