//! # MediaVault — 永続化ゲートウェイ
//!
//! 記事とメディアの行を SQLite に格納する。WAL モードで多重アクセスを許容し、
//! busy_timeout でロック競合を吸収する。各操作は独立した文またはトランザクションで、
//! 呼び出しをまたぐロールバックは行わない。

use async_trait::async_trait;
use atelier_core::contracts::{MediaKind, MediaRecord, MediaWithArticle};
use atelier_core::error::AtelierError;
use atelier_core::traits::MediaVault;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::time::Duration;

/// prompt 格納長の上限（文字数）
const MAX_PROMPT_CHARS: usize = 500;

/// SQLite を使う永続化ゲートウェイ
#[derive(Clone)]
pub struct SqliteMediaVault {
    pool: SqlitePool,
}

impl SqliteMediaVault {
    /// SQLite に接続し、WAL モードとスキーマを初期化する。
    /// `sqlite://` スキームの有無はどちらでも受け付ける。
    pub async fn new(db_url: &str) -> Result<Self, AtelierError> {
        let options = SqliteConnectOptions::new()
            .filename(db_url.trim_start_matches("sqlite://"))
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_millis(5000));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AtelierError::Database {
                reason: format!("Failed to connect to SQLite: {}", e),
            })?;

        let vault = Self { pool };
        vault.init_db().await?;
        Ok(vault)
    }

    async fn init_db(&self) -> Result<(), AtelierError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                source_url TEXT,
                created_at TEXT NOT NULL
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AtelierError::Database {
            reason: format!("Failed to create articles table: {}", e),
        })?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS media (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                article_id INTEGER NOT NULL,
                prompt TEXT NOT NULL,
                style TEXT NOT NULL,
                media_type TEXT NOT NULL,
                media_url TEXT NOT NULL,
                created_at TEXT NOT NULL
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AtelierError::Database {
            reason: format!("Failed to create media table: {}", e),
        })?;

        Ok(())
    }
}

#[async_trait]
impl MediaVault for SqliteMediaVault {
    async fn ensure_article(
        &self,
        source_url: Option<&str>,
        user_id: i64,
    ) -> Result<i64, AtelierError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO articles (user_id, source_url, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(source_url)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AtelierError::Database {
            reason: format!("Failed to insert article: {}", e),
        })?;

        Ok(result.last_insert_rowid())
    }

    async fn insert_media(
        &self,
        article_id: i64,
        prompt: &str,
        style: &str,
        kind: MediaKind,
        media_url: &str,
    ) -> Result<MediaRecord, AtelierError> {
        // media_url 非空は永続化の不変条件
        if media_url.is_empty() {
            return Err(AtelierError::Database {
                reason: "media_url が空のまま永続化はできない".to_string(),
            });
        }

        let clipped: String = prompt.chars().take(MAX_PROMPT_CHARS).collect();
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO media (article_id, prompt, style, media_type, media_url, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(article_id)
        .bind(&clipped)
        .bind(style)
        .bind(kind.as_str())
        .bind(media_url)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AtelierError::Database {
            reason: format!("Failed to insert media: {}", e),
        })?;

        Ok(MediaRecord {
            id: result.last_insert_rowid(),
            article_id,
            prompt: clipped,
            style: style.to_string(),
            media_type: kind.as_str().to_string(),
            media_url: media_url.to_string(),
            created_at: now,
        })
    }

    async fn media_by_id(&self, media_id: i64) -> Result<Option<MediaRecord>, AtelierError> {
        let row = sqlx::query(
            "SELECT id, article_id, prompt, style, media_type, media_url, created_at FROM media WHERE id = ?",
        )
        .bind(media_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AtelierError::Database {
            reason: format!("Failed to fetch media {}: {}", media_id, e),
        })?;

        Ok(row.map(|r| MediaRecord {
            id: r.get("id"),
            article_id: r.get("article_id"),
            prompt: r.get("prompt"),
            style: r.get("style"),
            media_type: r.get("media_type"),
            media_url: r.get("media_url"),
            created_at: r.get("created_at"),
        }))
    }

    async fn media_urls_by_article(
        &self,
        article_id: i64,
        kind: MediaKind,
    ) -> Result<Vec<String>, AtelierError> {
        let rows = sqlx::query(
            "SELECT media_url FROM media WHERE article_id = ? AND media_type = ? ORDER BY id ASC",
        )
        .bind(article_id)
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AtelierError::Database {
            reason: format!("Failed to fetch media urls for article {}: {}", article_id, e),
        })?;

        Ok(rows.iter().map(|r| r.get("media_url")).collect())
    }

    async fn list_with_articles(&self, limit: i64) -> Result<Vec<MediaWithArticle>, AtelierError> {
        let rows = sqlx::query(
            "SELECT m.id, m.article_id, a.source_url, m.prompt, m.style, m.media_type, m.media_url, m.created_at
             FROM media m JOIN articles a ON a.id = m.article_id
             ORDER BY m.id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AtelierError::Database {
            reason: format!("Failed to list media: {}", e),
        })?;

        Ok(rows.iter().map(row_to_media_with_article).collect())
    }

    async fn search_media(
        &self,
        term: &str,
        limit: i64,
    ) -> Result<Vec<MediaWithArticle>, AtelierError> {
        let pattern = format!("%{}%", term);
        let rows = sqlx::query(
            "SELECT m.id, m.article_id, a.source_url, m.prompt, m.style, m.media_type, m.media_url, m.created_at
             FROM media m JOIN articles a ON a.id = m.article_id
             WHERE m.prompt LIKE ? OR m.style LIKE ? OR a.source_url LIKE ?
             ORDER BY m.id DESC LIMIT ?",
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AtelierError::Database {
            reason: format!("Failed to search media: {}", e),
        })?;

        Ok(rows.iter().map(row_to_media_with_article).collect())
    }

    async fn delete_media(&self, media_id: i64) -> Result<bool, AtelierError> {
        let result = sqlx::query("DELETE FROM media WHERE id = ?")
            .bind(media_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AtelierError::Database {
                reason: format!("Failed to delete media {}: {}", media_id, e),
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_article(&self, article_id: i64) -> Result<bool, AtelierError> {
        // カスケードは単一トランザクションで行う
        let mut tx = self.pool.begin().await.map_err(|e| AtelierError::Database {
            reason: format!("Failed to start transaction: {}", e),
        })?;

        sqlx::query("DELETE FROM media WHERE article_id = ?")
            .bind(article_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AtelierError::Database {
                reason: format!("Failed to cascade media for article {}: {}", article_id, e),
            })?;

        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(article_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AtelierError::Database {
                reason: format!("Failed to delete article {}: {}", article_id, e),
            })?;

        tx.commit().await.map_err(|e| AtelierError::Database {
            reason: format!("Failed to commit transaction: {}", e),
        })?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_media_with_article(r: &SqliteRow) -> MediaWithArticle {
    MediaWithArticle {
        id: r.get("id"),
        article_id: r.get("article_id"),
        // source_url は NULL を許容する
        source_url: r.try_get("source_url").ok(),
        prompt: r.get("prompt"),
        style: r.get("style"),
        media_type: r.get("media_type"),
        media_url: r.get("media_url"),
        created_at: r.get("created_at"),
    }
}
