//! # Wan 動画補強フロー
//!
//! 一次生成の成功後にのみ走るベストエフォートの副次ステップ。
//! 失敗は親リクエストに波及させない契約のため、内側のパイプラインの
//! エラーは境界で一度だけログに落とし、`None` に畳む。

use crate::router::AppState;
use atelier_core::contracts::{MediaKind, SamplingParams, VideoAugmentation};
use atelier_core::error::AtelierError;
// Trait imports needed for method resolution on the dyn gateways
use atelier_core::traits::{ArtifactStore, MediaVault, VideoHandleProvider, VideoSynthesizer};
use infrastructure::run_yard;
use tracing::{error, info, warn};

/// 補強動画に使う固定プロンプト
const WAN_PROMPT: &str = "create a coherent video animation using the reference images with smooth transitions and engaging movement";

/// 記事の参照画像から Wan 動画を生成する。
/// 何も生成しなかった場合（スキップ・失敗とも）は `None`。
pub async fn generate_wan_video_from_images(
    state: &AppState,
    article_id: i64,
) -> Option<VideoAugmentation> {
    match run_augmentation(state, article_id).await {
        Ok(result) => result,
        Err(e) => {
            error!("❌ Wan video generation failed (non-fatal): {:?}", e);
            None
        }
    }
}

async fn run_augmentation(
    state: &AppState,
    article_id: i64,
) -> Result<Option<VideoAugmentation>, AtelierError> {
    if !state.wan.is_available() {
        info!("Wan generator not available, skipping");
        return Ok(None);
    }

    info!("=== Fetching images for article {} ===", article_id);
    let image_urls = state
        .vault
        .media_urls_by_article(article_id, MediaKind::Image)
        .await?;

    if image_urls.is_empty() {
        info!("No images found, skipping Wan video generation");
        return Ok(None);
    }
    info!("Found {} images for Wan video generation", image_urls.len());

    let run_dir = run_yard::create_run_dir(&state.wan_generated_dir).await?;

    // 参照画像を順番にダウンロード（並列化はしない）
    let mut local_paths = Vec::new();
    for (i, url) in image_urls.iter().enumerate() {
        let output_path = run_dir.join(format!("ref_image_{}.png", i));
        run_yard::download_image(&state.http, url, &output_path).await?;
        local_paths.push(output_path);
    }

    // 参照セットは先頭の1枚
    let ref_image = &local_paths[0];

    let studio = state.wan.acquire().await?;

    let stamp = run_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("run")
        .trim_start_matches("run_")
        .to_string();
    let output_path = run_dir.join(format!("wan_video_{}.mp4", stamp));

    studio
        .generate(WAN_PROMPT, ref_image, &output_path, &SamplingParams::default())
        .await?;

    if !output_path.exists() {
        warn!("Video not found at expected path: {}", output_path.display());
        return Ok(None);
    }
    info!("=== Video generated at: {} ===", output_path.display());

    let media_url = match state.depot.upload(&output_path, "wan_videos").await {
        Ok(url) => {
            info!("Video uploaded to S3: {}", url);
            url
        }
        Err(e) => {
            warn!("⚠️ Failed to upload to S3, falling back to local path: {}", e);
            output_path.display().to_string()
        }
    };

    let record = state
        .vault
        .insert_media(article_id, WAN_PROMPT, "wan_video", MediaKind::Video, &media_url)
        .await?;

    info!(
        "✅ Wan video stored in database with ID {} (run dir: {})",
        record.id,
        run_dir.display()
    );

    Ok(Some(VideoAugmentation {
        media_id: record.id,
        video_url: media_url,
        prompt: WAN_PROMPT.to_string(),
        num_reference_images: image_urls.len(),
    }))
}
