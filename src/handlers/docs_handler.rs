use super::found;
use axum::response::Response;

pub async fn docs_handler() -> Response {
    found("/swagger-ui.html")
}
