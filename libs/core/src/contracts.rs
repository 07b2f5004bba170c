//! # The Contract — HTTP / コンポーネント間のデータ契約
//!
//! リクエスト・レスポンスと永続化行の型安全な定義。

use serde::{Deserialize, Serialize};

/// メディア種別。DB には文字列として格納する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

// --- Request クラスター ---

/// `/generate` `/manim` 共通のリクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub user_id: Option<i64>,
    pub link: Option<String>,
    pub style: String,
    pub persona_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostToXRequest {
    pub user_id: i64,
    pub media_id: i64,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateImageRequest {
    pub prompt: String,
}

// --- Generation クラスター ---

/// 生成されたメディア1件分（応答用の最小形）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaEntry {
    pub media_id: i64,
    pub media_url: String,
    /// 生成サービスが付与する短いコンセプトラベル
    pub concept: String,
}

/// 記事→メディア生成の結果一式
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub article_id: i64,
    pub media_count: usize,
    pub media_entries: Vec<MediaEntry>,
}

/// Manim 解説動画の生成結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManimOutcome {
    pub article_id: i64,
    pub media_id: i64,
    pub video_path: String,
    pub concept: String,
}

/// Wan 動画補強フローの成果サマリー
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoAugmentation {
    pub media_id: i64,
    pub video_url: String,
    pub prompt: String,
    pub num_reference_images: usize,
}

// --- Persistence クラスター ---

/// media テーブルの1行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: i64,
    pub article_id: i64,
    pub prompt: String,
    pub style: String,
    pub media_type: String,
    pub media_url: String,
    pub created_at: String,
}

/// 記事情報を結合した一覧用の行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaWithArticle {
    pub id: i64,
    pub article_id: i64,
    pub source_url: Option<String>,
    pub prompt: String,
    pub style: String,
    pub media_type: String,
    pub media_url: String,
    pub created_at: String,
}

// --- Wan クラスター ---

/// Wan 推論のサンプリング条件。既定値は運用で固定している組。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingParams {
    pub size: String,
    pub frame_num: u32,
    pub sample_steps: u32,
    pub sample_shift: f64,
    pub sample_solver: String,
    pub guide_scale: f64,
    /// -1 で推論側にシード選択を委ねる
    pub base_seed: i64,
    pub offload_model: bool,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            size: "832*480".to_string(),
            frame_num: 41,
            sample_steps: 25,
            sample_shift: 16.0,
            sample_solver: "unipc".to_string(),
            guide_scale: 5.0,
            base_seed: -1,
            offload_model: true,
        }
    }
}
