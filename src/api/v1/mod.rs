//! v1 API

pub mod knowledge_bases;

use axum::routing::{get, post};
use axum::Router;

use super::state::AppState;

/// Create the v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/knowledge-bases",
            get(knowledge_bases::list_knowledge_bases)
                .post(knowledge_bases::create_knowledge_base),
        )
        .route(
            "/knowledge-bases/{id}",
            get(knowledge_bases::get_knowledge_base)
                .delete(knowledge_bases::delete_knowledge_base),
        )
        .route(
            "/knowledge-bases/{id}/upload",
            post(knowledge_bases::upload_file),
        )
        .route(
            "/knowledge-bases/{id}/query",
            post(knowledge_bases::query_knowledge_base),
        )
}
