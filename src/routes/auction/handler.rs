use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::AppState;
use crate::utils::{error_codes, error_to_api_response, success_to_api_response};

use super::model::CatalogError;

#[derive(Debug, Deserialize)]
pub struct AuctionSearchQuery {
    pub item_name: Option<String>,
    pub keyword: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub cursor: String,
}

#[derive(Debug, Deserialize)]
pub struct AuctionHistoryQuery {
    pub item_name: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub cursor: String,
}

fn catalog_error_response(e: CatalogError) -> Response {
    let status = match e {
        CatalogError::MissingKey => StatusCode::SERVICE_UNAVAILABLE,
        CatalogError::Status(_) | CatalogError::Transport(_) => StatusCode::BAD_GATEWAY,
    };
    tracing::warn!(error = %e, "catalog request failed");
    (
        status,
        error_to_api_response::<()>(error_codes::UPSTREAM_ERROR, e.to_string()),
    )
        .into_response()
}

#[axum::debug_handler]
pub async fn search_items(
    State(state): State<AppState>,
    Query(query): Query<AuctionSearchQuery>,
) -> Response {
    if query.item_name.is_none() && query.keyword.is_none() {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response::<()>(
                error_codes::VALIDATION_ERROR,
                "provide item_name or keyword".to_string(),
            ),
        )
            .into_response();
    }

    match state
        .catalog
        .search_items(
            query.item_name.as_deref(),
            query.keyword.as_deref(),
            query.category.as_deref(),
            &query.cursor,
        )
        .await
    {
        Ok(page) => (StatusCode::OK, success_to_api_response(page)).into_response(),
        Err(e) => catalog_error_response(e),
    }
}

#[axum::debug_handler]
pub async fn search_history(
    State(state): State<AppState>,
    Query(query): Query<AuctionHistoryQuery>,
) -> Response {
    match state
        .catalog
        .search_history(
            query.item_name.as_deref(),
            query.category.as_deref(),
            &query.cursor,
        )
        .await
    {
        Ok(page) => (StatusCode::OK, success_to_api_response(page)).into_response(),
        Err(e) => catalog_error_response(e),
    }
}
