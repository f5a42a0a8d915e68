use std::str::FromStr;

use axum::extract::{Query, State};
use common::storage::types::app::App;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::{
    html_state::HtmlState,
    middlewares::response_middleware::{HtmlError, TemplateResponse},
    utils::pagination::{resolve_window, NavDirection, OffsetWindow},
};

/// Serde deserialization decorator mapping empty or unparsable values to None,
/// so a mangled link still lands on a sensible page.
fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let opt = Option::<String>::deserialize(de)?;
    Ok(opt.as_deref().map(str::trim).and_then(|s| s.parse().ok()))
}

#[derive(Deserialize, Default, Debug)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub offset: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub s: Option<NavDirection>,
}

#[derive(Serialize, Debug)]
pub struct SearchPageData {
    pub title: String,
    pub q: String,
    pub data: Vec<App>,
    pub page: u64,
    #[serde(rename = "prevOffset")]
    pub prev_offset: u64,
    #[serde(rename = "nextOffset")]
    pub next_offset: u64,
    pub prevbtn: u64,
    #[serde(rename = "hasPrevious")]
    pub has_previous: bool,
    #[serde(rename = "hasNext")]
    pub has_next: bool,
}

impl SearchPageData {
    pub fn new(title: &str, q: String, data: Vec<App>, window: &OffsetWindow) -> Self {
        Self {
            title: title.to_string(),
            q,
            page: window.page,
            prev_offset: window.prev_offset,
            next_offset: window.next_offset,
            prevbtn: window.offset,
            has_previous: window.has_previous(),
            has_next: window.has_next(data.len()),
            data,
        }
    }
}

pub async fn search_result_handler(
    State(state): State<HtmlState>,
    Query(params): Query<SearchParams>,
) -> Result<TemplateResponse, HtmlError> {
    let window = resolve_window(params.offset, params.page, params.s);
    let q = params.q.unwrap_or_default();
    debug!(q = %q, offset = window.offset, page = window.page, "Searching catalog");

    let data = state
        .catalog
        .find(&q, window.limit, window.offset)
        .await?;

    Ok(TemplateResponse::new_template(
        "search.html",
        SearchPageData::new(&state.config.search_title, q, data, &window),
    ))
}
