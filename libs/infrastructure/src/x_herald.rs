//! # XHerald — X (Twitter) 投稿ゲートウェイ
//!
//! メディア URL とキャプションから投稿本文を組み立てて X API に送信し、
//! プラットフォーム定義の応答をそのまま返す。

use async_trait::async_trait;
use atelier_core::error::AtelierError;
use atelier_core::traits::SocialPublisher;
use tracing::info;

/// X の投稿本文の上限（文字数）
const MAX_POST_CHARS: usize = 280;

pub struct XHerald {
    client: reqwest::Client,
    api_url: String,
    bearer_token: String,
}

impl XHerald {
    pub fn new(api_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            bearer_token: bearer_token.into(),
        }
    }
}

/// キャプションとメディア URL から投稿本文を組み立てる。
/// 上限超過は文字境界で切り詰める。
fn compose_post_text(media_url: &str, text: &str) -> String {
    let full = if text.trim().is_empty() {
        media_url.to_string()
    } else {
        format!("{} {}", text.trim(), media_url)
    };
    full.chars().take(MAX_POST_CHARS).collect()
}

#[async_trait]
impl SocialPublisher for XHerald {
    async fn publish(
        &self,
        media_url: &str,
        text: &str,
    ) -> Result<serde_json::Value, AtelierError> {
        info!("🐦 XHerald: Publishing media to X...");

        let url = format!("{}/2/tweets", self.api_url);
        let body = serde_json::json!({ "text": compose_post_text(media_url, text) });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.bearer_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AtelierError::Publish {
                reason: format!("X API unreachable: {}", e),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AtelierError::Publish {
                reason: format!("X API failed with status {}: {}", status, body),
            });
        }

        resp.json().await.map_err(|e| AtelierError::Publish {
            reason: format!("Failed to parse X response: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_with_empty_caption() {
        assert_eq!(compose_post_text("https://x/y.mp4", ""), "https://x/y.mp4");
        assert_eq!(compose_post_text("https://x/y.mp4", "   "), "https://x/y.mp4");
    }

    #[test]
    fn test_compose_joins_caption_and_url() {
        assert_eq!(
            compose_post_text("https://x/y.mp4", "新作です"),
            "新作です https://x/y.mp4"
        );
    }

    #[test]
    fn test_compose_truncates_at_char_boundary() {
        let caption = "あ".repeat(300);
        let composed = compose_post_text("https://x/y.mp4", &caption);
        assert_eq!(composed.chars().count(), MAX_POST_CHARS);
        assert!(composed.chars().all(|c| c == 'あ'));
    }
}
