//! # ドメイントレイト定義
//!
//! Media Atelier の各ゲートウェイのインターフェースを定義する。
//! 具体実装は `libs/infrastructure` に配置する（依存性逆転の原則）。
//! 起動時に一度だけ注入し、ハンドラ内での遅延結線はしない。

use crate::contracts::{
    GenerationOutcome, ManimOutcome, MediaKind, MediaRecord, MediaWithArticle, SamplingParams,
};
use crate::error::AtelierError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 記事→メディア生成クライアント (MediaSynth)
///
/// 外部の生成 API にパラメータを転送し、永続化まで済ませた結果を返す。
#[async_trait]
pub trait MediaSynthesizer: Send + Sync {
    /// 記事 URL からメディア一式を生成する。
    /// 生成サービスが何も返さなかった場合は `None`（エラーではなくソフト失敗）。
    async fn process_article(
        &self,
        link: Option<&str>,
        user_id: i64,
        style: &str,
        persona_id: Option<i64>,
    ) -> Result<Option<GenerationOutcome>, AtelierError>;

    /// テキストプロンプトから画像を生成する。応答は生成サービス定義の JSON。
    async fn generate_image(&self, prompt: &str) -> Result<serde_json::Value, AtelierError>;
}

/// Manim 解説動画クライアント
#[async_trait]
pub trait ManimSynthesizer: Send + Sync {
    /// コード生成の不安定さを吸収するため、クライアント内部で `max_retries` 回まで試行する。
    /// 全滅した場合は `None`。
    async fn render_from_article(
        &self,
        link: Option<&str>,
        user_id: i64,
        max_retries: u32,
    ) -> Result<Option<ManimOutcome>, AtelierError>;
}

/// 永続化ゲートウェイ (MediaVault)
#[async_trait]
pub trait MediaVault: Send + Sync {
    /// 記事行を作成し id を返す（生成パスが暗黙に作成する）
    async fn ensure_article(
        &self,
        source_url: Option<&str>,
        user_id: i64,
    ) -> Result<i64, AtelierError>;

    /// メディア行を挿入する。prompt は 500 文字に切り詰めて格納する。
    async fn insert_media(
        &self,
        article_id: i64,
        prompt: &str,
        style: &str,
        kind: MediaKind,
        media_url: &str,
    ) -> Result<MediaRecord, AtelierError>;

    async fn media_by_id(&self, media_id: i64) -> Result<Option<MediaRecord>, AtelierError>;

    /// 記事に紐づくメディア URL を種別で絞って返す
    async fn media_urls_by_article(
        &self,
        article_id: i64,
        kind: MediaKind,
    ) -> Result<Vec<String>, AtelierError>;

    /// 記事情報付きの一覧（新しい順、limit 件まで）
    async fn list_with_articles(&self, limit: i64) -> Result<Vec<MediaWithArticle>, AtelierError>;

    /// フリーテキスト検索（prompt / style / 記事 URL への部分一致）
    async fn search_media(
        &self,
        term: &str,
        limit: i64,
    ) -> Result<Vec<MediaWithArticle>, AtelierError>;

    /// メディアを1件削除する。行が存在したかどうかを返す
    async fn delete_media(&self, media_id: i64) -> Result<bool, AtelierError>;

    /// 記事を削除し、紐づくメディアもカスケード削除する。行が存在したかどうかを返す
    async fn delete_article(&self, article_id: i64) -> Result<bool, AtelierError>;
}

/// オブジェクトストレージへのアップロード
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// ローカルファイルをアップロードし、公開 URL を返す。
    /// 失敗時のフォールバック方針は呼び出し側が決める。
    async fn upload(&self, local_path: &Path, folder: &str) -> Result<String, AtelierError>;
}

/// SNS 投稿ゲートウェイ
#[async_trait]
pub trait SocialPublisher: Send + Sync {
    /// メディア URL とキャプションを投稿し、プラットフォーム定義の応答をそのまま返す
    async fn publish(&self, media_url: &str, text: &str)
        -> Result<serde_json::Value, AtelierError>;
}

/// 動画生成ハンドル
///
/// 初期化コストが大きいため、プロセス生存期間中は単一インスタンスを使い回す。
/// 生成物は `save_file` に書き出される。
#[async_trait]
pub trait VideoSynthesizer: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        ref_image: &Path,
        save_file: &Path,
        params: &SamplingParams,
    ) -> Result<PathBuf, AtelierError>;
}

/// 動画生成ハンドルの提供者
///
/// 利用可否は起動時に確定済み。`acquire` は初回呼び出しでのみ初期化を行い、
/// 以後は同一ハンドルを返す（同時の初回アクセスでも初期化は一度だけ）。
#[async_trait]
pub trait VideoHandleProvider: Send + Sync {
    fn is_available(&self) -> bool;

    async fn acquire(&self) -> Result<Arc<dyn VideoSynthesizer>, AtelierError>;
}
