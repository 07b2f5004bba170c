//! # MediaSynth — 記事→メディア生成クライアント
//!
//! 外部の生成 API に記事 URL とスタイルを転送してビジュアルコンセプトを起こし、
//! コンセプトごとに text-to-image を呼ぶ。生成できたエントリはその場で
//! MediaVault に永続化し、作成済みのものだけを結果に載せる。

use async_trait::async_trait;
use atelier_core::contracts::{GenerationOutcome, MediaEntry, MediaKind};
use atelier_core::error::AtelierError;
use atelier_core::traits::{MediaSynthesizer, MediaVault};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// 生成サービスが返すコンセプト1件分
#[derive(Debug, Deserialize)]
struct ConceptItem {
    concept: String,
    image_prompt: String,
}

#[derive(Debug, Deserialize)]
struct ConceptBatch {
    #[serde(default)]
    concepts: Vec<ConceptItem>,
}

/// 生成 API クライアント
pub struct MediaSynthClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    vault: Arc<dyn MediaVault>,
}

impl MediaSynthClient {
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

    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, AtelierError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AtelierError::Synthesis {
                reason: format!("Failed to reach synthesis API: {}", e),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AtelierError::Synthesis {
                reason: format!("Synthesis API failed with status {}: {}", status, body),
            });
        }

        resp.json().await.map_err(|e| AtelierError::Synthesis {
            reason: format!("Failed to parse synthesis response: {}", e),
        })
    }
}

#[async_trait]
impl MediaSynthesizer for MediaSynthClient {
    async fn process_article(
        &self,
        link: Option<&str>,
        user_id: i64,
        style: &str,
        persona_id: Option<i64>,
    ) -> Result<Option<GenerationOutcome>, AtelierError> {
        info!("🎨 MediaSynth: Processing article (style: {})...", style);

        let payload = serde_json::json!({
            "article_url": link,
            "style": style,
            "persona_id": persona_id,
        });
        let raw = self.post_json("/v1/article/concepts", payload).await?;
        let batch: ConceptBatch =
            serde_json::from_value(raw).map_err(|e| AtelierError::Synthesis {
                reason: format!("Unexpected concepts payload: {}", e),
            })?;

        if batch.concepts.is_empty() {
            info!("MediaSynth: 生成サービスがコンセプトを返さなかったためスキップ");
            return Ok(None);
        }

        let article_id = self.vault.ensure_article(link, user_id).await?;

        // 1コンセプト = 1画像。失敗したコンセプトは飛ばして続行する
        let mut entries = Vec::new();
        for item in &batch.concepts {
            let image = match self.generate_image(&item.image_prompt).await {
                Ok(v) => v,
                Err(e) => {
                    warn!("⚠️ MediaSynth: image generation failed for '{}': {}", item.concept, e);
                    continue;
                }
            };

            let Some(url) = image
                .get("images")
                .and_then(|i| i.as_array())
                .and_then(|a| a.first())
                .and_then(|img| img.get("url"))
                .and_then(|u| u.as_str())
            else {
                warn!("⚠️ MediaSynth: no image url in response for '{}'", item.concept);
                continue;
            };

            let record = self
                .vault
                .insert_media(article_id, &item.image_prompt, style, MediaKind::Image, url)
                .await?;
            entries.push(MediaEntry {
                media_id: record.id,
                media_url: record.media_url,
                concept: item.concept.clone(),
            });
        }

        if entries.is_empty() {
            return Ok(None);
        }

        info!(
            "✅ MediaSynth: {} 件のメディアを生成・保存 (article {})",
            entries.len(),
            article_id
        );
        Ok(Some(GenerationOutcome {
            article_id,
            media_count: entries.len(),
            media_entries: entries,
        }))
    }

    async fn generate_image(&self, prompt: &str) -> Result<serde_json::Value, AtelierError> {
        self.post_json("/v1/images/generate", serde_json::json!({ "prompt": prompt }))
            .await
    }
}
