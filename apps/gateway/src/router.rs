//! # Request Router — HTTP サーフェス
//!
//! ルーティングとハンドラ、ドメインエラーから HTTP ステータスへの写像を担う。
//! エラー本文は `{"detail": ...}` 形式。全ルートで permissive CORS を許可する
//! （この層にアクセス制御はない）。

use crate::augment;
use atelier_core::contracts::{GenerateImageRequest, GenerateRequest, PostToXRequest};
use atelier_core::traits::{
    ArtifactStore, ManimSynthesizer, MediaSynthesizer, MediaVault, SocialPublisher,
    VideoHandleProvider,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Manim のコード生成リトライ上限（ループはクライアント側が持つ）
const MANIM_MAX_RETRIES: u32 = 5;

/// 全ハンドラで共有する状態。起動時に一度だけ結線する。
pub struct AppState {
    pub synth: Arc<dyn MediaSynthesizer>,
    pub manim: Arc<dyn ManimSynthesizer>,
    pub vault: Arc<dyn MediaVault>,
    pub depot: Arc<dyn ArtifactStore>,
    pub herald: Arc<dyn SocialPublisher>,
    pub wan: Arc<dyn VideoHandleProvider>,
    pub http: reqwest::Client,
    pub wan_generated_dir: PathBuf,
    pub fallback_user_id: i64,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/generate", post(generate_handler))
        .route("/manim", post(manim_handler))
        .route("/media", get(list_media_handler))
        .route("/media/:media_id", delete(delete_media_handler))
        .route("/article/:article_id", delete(delete_article_handler))
        .route("/x_post", post(x_post_handler))
        .route("/generate_image", post(generate_image_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn detail(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "detail": message.into() }))).into_response()
}

// --- Handlers ---

async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Response {
    let user_id = req.user_id.unwrap_or(state.fallback_user_id);

    let result = match state
        .synth
        .process_article(req.link.as_deref(), user_id, &req.style, req.persona_id)
        .await
    {
        Ok(r) => r,
        Err(e) => return detail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let Some(outcome) = result else {
        return Json(json!({ "success": false, "error": "Failed to generate media" }))
            .into_response();
    };

    // 画像が揃った後の動画補強はベストエフォート（本体の成功は覆さない）
    let wan_result = augment::generate_wan_video_from_images(&state, outcome.article_id).await;

    let mut response = json!({
        "success": true,
        "article_id": outcome.article_id,
        "media_count": outcome.media_count,
        "media_entries": outcome.media_entries,
    });
    if let Some(wan) = wan_result {
        response["wan_video"] = json!({
            "media_id": wan.media_id,
            "video_url": wan.video_url,
            "num_reference_images": wan.num_reference_images,
        });
    }

    Json(response).into_response()
}

async fn manim_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Response {
    let user_id = req.user_id.unwrap_or(state.fallback_user_id);

    match state
        .manim
        .render_from_article(req.link.as_deref(), user_id, MANIM_MAX_RETRIES)
        .await
    {
        Ok(Some(outcome)) => Json(json!({
            "success": true,
            "article_id": outcome.article_id,
            "media_id": outcome.media_id,
            "video_path": outcome.video_path,
            "concept": outcome.concept,
        }))
        .into_response(),
        Ok(None) => Json(json!({ "success": false, "error": "Failed to generate Manim video" }))
            .into_response(),
        Err(e) => detail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct MediaQuery {
    limit: Option<i64>,
    search: Option<String>,
}

async fn list_media_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MediaQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(50);

    let result = match query.search.as_deref() {
        Some(term) if !term.is_empty() => state.vault.search_media(term, limit).await,
        _ => state.vault.list_with_articles(limit).await,
    };

    match result {
        Ok(media) => Json(json!({ "success": true, "media": media })).into_response(),
        Err(e) => detail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn delete_media_handler(
    State(state): State<Arc<AppState>>,
    Path(media_id): Path<i64>,
) -> Response {
    match state.vault.delete_media(media_id).await {
        Ok(true) => Json(json!({ "success": true, "deleted_id": media_id })).into_response(),
        Ok(false) => detail(StatusCode::NOT_FOUND, "Media not found"),
        Err(e) => detail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn delete_article_handler(
    State(state): State<Arc<AppState>>,
    Path(article_id): Path<i64>,
) -> Response {
    match state.vault.delete_article(article_id).await {
        Ok(true) => Json(json!({ "success": true, "deleted_id": article_id })).into_response(),
        Ok(false) => detail(StatusCode::NOT_FOUND, "Article not found"),
        Err(e) => detail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn x_post_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PostToXRequest>,
) -> Response {
    let media = match state.vault.media_by_id(req.media_id).await {
        Ok(m) => m,
        Err(e) => return detail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    // 404 の場合は投稿 API を一切呼ばない
    let Some(media) = media else {
        return detail(StatusCode::NOT_FOUND, "Media not found");
    };

    match state.herald.publish(&media.media_url, &req.text).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => detail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn generate_image_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateImageRequest>,
) -> Response {
    let result = match state.synth.generate_image(&req.prompt).await {
        Ok(v) => v,
        Err(e) => return detail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let Some(first) = result
        .get("images")
        .and_then(|i| i.as_array())
        .and_then(|a| a.first())
    else {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate image");
    };

    let image_url = first.get("url").and_then(|u| u.as_str()).unwrap_or_default();

    Json(json!({
        "success": true,
        "image_url": image_url,
        "metadata": first,
    }))
    .into_response()
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Response {
    Json(json!({ "status": "ok", "wan_video": state.wan.is_available() })).into_response()
}
