use axum::response::Redirect;

/// Sends unknown paths and unsupported methods back to the landing page.
pub async fn redirect_to_index() -> Redirect {
    Redirect::to("/")
}
