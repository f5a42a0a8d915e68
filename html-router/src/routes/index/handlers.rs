use axum::extract::State;
use serde::Serialize;

use crate::{html_state::HtmlState, middlewares::response_middleware::TemplateResponse};

#[derive(Serialize)]
pub struct IndexPageData {
    title: String,
}

pub async fn index_handler(State(state): State<HtmlState>) -> TemplateResponse {
    TemplateResponse::new_template(
        "index.html",
        IndexPageData {
            title: state.config.index_title.clone(),
        },
    )
}
