//! # ManimForge — 解説動画生成クライアント
//!
//! 記事から Manim によるプログラム描画動画を起こす。コード生成は不安定なため、
//! リトライ予算の範囲でクライアント内部で再試行する（ルーターは予算を渡すだけ）。

use async_trait::async_trait;
use atelier_core::contracts::{ManimOutcome, MediaKind};
use atelier_core::error::AtelierError;
use atelier_core::traits::{ManimSynthesizer, MediaVault};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Manim レンダーサービスの応答
#[derive(Debug, Deserialize)]
struct ManimRender {
    video_path: String,
    concept: String,
}

pub struct ManimForgeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    vault: Arc<dyn MediaVault>,
}

impl ManimForgeClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        vault: Arc<dyn MediaVault>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            vault,
        }
    }

    async fn render_once(
        &self,
        link: Option<&str>,
        attempt: u32,
    ) -> Result<ManimRender, AtelierError> {
        let url = format!("{}/v1/manim/render", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "article_url": link, "attempt": attempt }))
            .send()
            .await
            .map_err(|e| AtelierError::Synthesis {
                reason: format!("Failed to reach Manim renderer: {}", e),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AtelierError::Synthesis {
                reason: format!("Manim renderer failed with status {}: {}", status, body),
            });
        }

        resp.json().await.map_err(|e| AtelierError::Synthesis {
            reason: format!("Failed to parse Manim response: {}", e),
        })
    }
}

#[async_trait]
impl ManimSynthesizer for ManimForgeClient {
    async fn render_from_article(
        &self,
        link: Option<&str>,
        user_id: i64,
        max_retries: u32,
    ) -> Result<Option<ManimOutcome>, AtelierError> {
        info!("📐 ManimForge: Rendering explainer (max {} attempts)...", max_retries);

        let mut rendered = None;
        for attempt in 1..=max_retries {
            match self.render_once(link, attempt).await {
                Ok(r) => {
                    rendered = Some(r);
                    break;
                }
                Err(e) => warn!("⚠️ ManimForge: attempt {}/{} failed: {}", attempt, max_retries, e),
            }
        }

        let Some(render) = rendered else {
            warn!("ManimForge: リトライ予算を使い切ったため断念");
            return Ok(None);
        };

        let article_id = self.vault.ensure_article(link, user_id).await?;
        let record = self
            .vault
            .insert_media(
                article_id,
                &render.concept,
                "manim",
                MediaKind::Video,
                &render.video_path,
            )
            .await?;

        info!("✅ ManimForge: video stored (media {})", record.id);
        Ok(Some(ManimOutcome {
            article_id,
            media_id: record.id,
            video_path: render.video_path,
            concept: render.concept,
        }))
    }
}
