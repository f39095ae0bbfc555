// ============================================================================
// HTTP Handlers
// ============================================================================

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use vitrine_error::{AppError, AppResult};

use crate::content::{Article, ArticleChanges, ArticleStore};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub articles: Arc<dyn ArticleStore>,
}

#[derive(Serialize)]
pub struct ArticleResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub version: i32,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            tenant_id: article.tenant_id,
            slug: article.slug,
            title: article.title,
            body: article.body,
            version: article.version,
        }
    }
}

/// GET /api/v1/admin/tenants/{tenant_id}/articles/{id}
pub async fn get_article(
    State(state): State<AppState>,
    Path((tenant_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ArticleResponse>> {
    let article = state.articles.fetch(tenant_id, id).await?;
    Ok(Json(article.into()))
}

/// Update request: the version the client read, plus the field changes
#[derive(Deserialize)]
pub struct UpdateArticleRequest {
    pub version: i32,
    #[serde(flatten)]
    pub changes: ArticleChanges,
}

/// PUT /api/v1/admin/tenants/{tenant_id}/articles/{id}
///
/// Rejected with 409 (both version numbers in the body) when the presented
/// version is stale; the client re-fetches and decides how to proceed.
pub async fn update_article(
    State(state): State<AppState>,
    Path((tenant_id, id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateArticleRequest>,
) -> AppResult<Json<ArticleResponse>> {
    let article = state
        .articles
        .update_guarded(tenant_id, id, request.version, request.changes)
        .await?;
    Ok(Json(article.into()))
}

/// Lead submitted through the public site
#[derive(Deserialize)]
pub struct InquiryRequest {
    pub name: String,
    pub contact: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize)]
pub struct InquiryResponse {
    pub id: Uuid,
}

/// POST /api/v1/public/inquiries
///
/// Lead capture endpoint; the tight inquiry quota in front of it is the
/// spam protection. Delivery to the CRM/notification pipeline happens
/// downstream and is out of scope here.
pub async fn submit_inquiry(
    Json(request): Json<InquiryRequest>,
) -> AppResult<(StatusCode, Json<InquiryResponse>)> {
    if request.name.trim().is_empty() || request.contact.trim().is_empty() {
        return Err(AppError::Validation(
            "name and contact are required".to_string(),
        ));
    }

    let id = Uuid::new_v4();
    tracing::info!(inquiry_id = %id, name = %request.name, "inquiry accepted");

    Ok((StatusCode::ACCEPTED, Json(InquiryResponse { id })))
}

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
