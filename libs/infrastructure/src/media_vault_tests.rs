//! # Media Vault Tests
//!
//! ファイルベース一時 SQLite を使った `SqliteMediaVault` のテストスイート。
//! カスケード削除・検索・種別フィルタの不変性を機械的に保証する。

#[cfg(test)]
mod tests {
    use crate::media_vault::SqliteMediaVault;
    use atelier_core::contracts::MediaKind;
    use atelier_core::traits::MediaVault;

    /// テスト用のユニーク一時ファイル Vault を作成
    /// 各テストが独自のDBファイルを持ち、ロック競合を回避する
    async fn create_test_vault() -> (SqliteMediaVault, tempfile::TempDir) {
        let tmp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let db_path = tmp_dir.path().join("test.db");
        let db_path_str = db_path.to_str().expect("Invalid path");
        let vault = SqliteMediaVault::new(db_path_str)
            .await
            .expect("Failed to create test vault");
        (vault, tmp_dir) // tmp_dir must be kept alive for the DB file to exist
    }

    // ===== 1. Basic CRUD =====

    #[tokio::test]
    async fn test_insert_and_fetch_media() {
        let (vault, _tmp) = create_test_vault().await;

        let article_id = vault
            .ensure_article(Some("http://example.com/a1"), 1)
            .await
            .unwrap();
        let record = vault
            .insert_media(
                article_id,
                "a red fox",
                "classic",
                MediaKind::Image,
                "https://cdn.example/fox.png",
            )
            .await
            .unwrap();

        let fetched = vault.media_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(fetched.article_id, article_id);
        assert_eq!(fetched.prompt, "a red fox");
        assert_eq!(fetched.style, "classic");
        assert_eq!(fetched.media_type, "image");
        assert_eq!(fetched.media_url, "https://cdn.example/fox.png");
    }

    #[tokio::test]
    async fn test_media_by_id_missing() {
        let (vault, _tmp) = create_test_vault().await;
        assert!(vault.media_by_id(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_prompt_truncated_to_500_chars() {
        let (vault, _tmp) = create_test_vault().await;

        let article_id = vault.ensure_article(None, 1).await.unwrap();
        let long_prompt = "あ".repeat(600);
        let record = vault
            .insert_media(
                article_id,
                &long_prompt,
                "wan_video",
                MediaKind::Video,
                "https://cdn.example/v.mp4",
            )
            .await
            .unwrap();

        assert_eq!(record.prompt.chars().count(), 500);
        let fetched = vault.media_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(fetched.prompt.chars().count(), 500);
    }

    #[tokio::test]
    async fn test_empty_media_url_rejected() {
        let (vault, _tmp) = create_test_vault().await;

        let article_id = vault.ensure_article(None, 1).await.unwrap();
        let result = vault
            .insert_media(article_id, "p", "classic", MediaKind::Image, "")
            .await;
        assert!(result.is_err(), "empty media_url must not be persisted");
    }

    // ===== 2. Delete semantics =====

    #[tokio::test]
    async fn test_delete_media_reports_existence() {
        let (vault, _tmp) = create_test_vault().await;

        assert!(!vault.delete_media(123).await.unwrap());

        let article_id = vault.ensure_article(None, 1).await.unwrap();
        let record = vault
            .insert_media(article_id, "p", "classic", MediaKind::Image, "https://x/y.png")
            .await
            .unwrap();

        assert!(vault.delete_media(record.id).await.unwrap());
        assert!(vault.media_by_id(record.id).await.unwrap().is_none());

        let listing = vault.list_with_articles(50).await.unwrap();
        assert!(listing.iter().all(|m| m.id != record.id));
    }

    #[tokio::test]
    async fn test_article_cascade_delete() {
        let (vault, _tmp) = create_test_vault().await;

        let article_id = vault
            .ensure_article(Some("http://example.com/a2"), 1)
            .await
            .unwrap();
        let m1 = vault
            .insert_media(article_id, "first", "classic", MediaKind::Image, "https://x/1.png")
            .await
            .unwrap();
        let m2 = vault
            .insert_media(article_id, "second", "wan_video", MediaKind::Video, "https://x/2.mp4")
            .await
            .unwrap();

        assert!(vault.delete_article(article_id).await.unwrap());

        assert!(vault.media_by_id(m1.id).await.unwrap().is_none());
        assert!(vault.media_by_id(m2.id).await.unwrap().is_none());
        assert!(vault.list_with_articles(50).await.unwrap().is_empty());
        assert!(vault.search_media("first", 50).await.unwrap().is_empty());

        // 既に消えた記事の再削除は false
        assert!(!vault.delete_article(article_id).await.unwrap());
    }

    // ===== 3. Listing / filtering =====

    #[tokio::test]
    async fn test_media_urls_filtered_by_kind() {
        let (vault, _tmp) = create_test_vault().await;

        let article_id = vault.ensure_article(None, 1).await.unwrap();
        vault
            .insert_media(article_id, "i1", "classic", MediaKind::Image, "https://x/i1.png")
            .await
            .unwrap();
        vault
            .insert_media(article_id, "i2", "classic", MediaKind::Image, "https://x/i2.png")
            .await
            .unwrap();
        vault
            .insert_media(article_id, "v1", "wan_video", MediaKind::Video, "https://x/v1.mp4")
            .await
            .unwrap();

        let urls = vault
            .media_urls_by_article(article_id, MediaKind::Image)
            .await
            .unwrap();
        assert_eq!(urls, vec!["https://x/i1.png", "https://x/i2.png"]);

        let other_article = vault.ensure_article(None, 1).await.unwrap();
        assert!(vault
            .media_urls_by_article(other_article, MediaKind::Image)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_with_articles_limit_and_order() {
        let (vault, _tmp) = create_test_vault().await;

        let article_id = vault
            .ensure_article(Some("http://example.com/a3"), 1)
            .await
            .unwrap();
        for i in 0..5 {
            vault
                .insert_media(
                    article_id,
                    &format!("prompt {}", i),
                    "classic",
                    MediaKind::Image,
                    &format!("https://x/{}.png", i),
                )
                .await
                .unwrap();
        }

        let listing = vault.list_with_articles(3).await.unwrap();
        assert_eq!(listing.len(), 3);
        // 新しい順
        assert!(listing[0].id > listing[1].id && listing[1].id > listing[2].id);
        assert_eq!(listing[0].source_url.as_deref(), Some("http://example.com/a3"));
    }

    // ===== 4. Search =====

    #[tokio::test]
    async fn test_search_media_by_prompt_and_limit() {
        let (vault, _tmp) = create_test_vault().await;

        let article_id = vault.ensure_article(None, 1).await.unwrap();
        for i in 0..12 {
            vault
                .insert_media(
                    article_id,
                    &format!("a red fox {}", i),
                    "classic",
                    MediaKind::Image,
                    &format!("https://x/fox{}.png", i),
                )
                .await
                .unwrap();
        }
        vault
            .insert_media(article_id, "a blue whale", "classic", MediaKind::Image, "https://x/whale.png")
            .await
            .unwrap();

        let hits = vault.search_media("fox", 10).await.unwrap();
        assert_eq!(hits.len(), 10);
        assert!(hits.iter().all(|m| m.prompt.contains("fox")));
    }

    #[tokio::test]
    async fn test_search_media_matches_style_and_article_url() {
        let (vault, _tmp) = create_test_vault().await;

        let article_id = vault
            .ensure_article(Some("http://news.example.com/quantum"), 7)
            .await
            .unwrap();
        vault
            .insert_media(article_id, "animation", "wan_video", MediaKind::Video, "https://x/v.mp4")
            .await
            .unwrap();

        let by_style = vault.search_media("wan_", 50).await.unwrap();
        assert_eq!(by_style.len(), 1);

        let by_url = vault.search_media("quantum", 50).await.unwrap();
        assert_eq!(by_url.len(), 1);
        assert_eq!(by_url[0].article_id, article_id);

        assert!(vault.search_media("nomatch", 50).await.unwrap().is_empty());
    }
}
