//! # ドメインエラー型
//!
//! `thiserror` を使い、すべてのドメインエラーに明確な型を付与する。
//! HTTP ステータスへの変換は gateway 側の責務。

use thiserror::Error;

/// Media Atelier のドメインエラー
#[derive(Debug, Error)]
pub enum AtelierError {
    // === 照会 ===
    #[error("メディアが見つからない (id: {id})")]
    MediaNotFound { id: i64 },

    #[error("記事が見つからない (id: {id})")]
    ArticleNotFound { id: i64 },

    // === 生成 ===
    #[error("生成 API エラー: {reason}")]
    Synthesis { reason: String },

    #[error("Wan ランタイム利用不可: {reason}")]
    VideoRuntime { reason: String },

    // === 周辺 I/O ===
    #[error("参照画像の取得に失敗 (url: {url}): {reason}")]
    Download { url: String, reason: String },

    #[error("ワークスペース操作に失敗: {reason}")]
    Workspace { reason: String },

    #[error("ストレージアップロード失敗: {source}")]
    Storage {
        #[source]
        source: anyhow::Error,
    },

    #[error("データベースエラー: {reason}")]
    Database { reason: String },

    // === SNS ===
    #[error("SNS 投稿エラー: {reason}")]
    Publish { reason: String },
}
