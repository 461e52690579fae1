use axum::response::Html;

/// GET /
/// Serves the single-page frontend. The page is embedded at compile time
/// so the binary is self-contained.
pub async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}
