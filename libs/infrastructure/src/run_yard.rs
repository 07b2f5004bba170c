//! # RunYard — ランディレクトリ管理
//!
//! 動画補強の実行ごとにタイムスタンプ名のスクラッチディレクトリを掘り、
//! 参照画像をそこへダウンロードする。中身は監査証跡としてそのまま残す
//! （自動清掃はしない）。

use atelier_core::error::AtelierError;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// タイムスタンプ名のランディレクトリを作成して返す。
/// 同一秒内の衝突は連番サフィックスで回避する。
pub async fn create_run_dir(base: &Path) -> Result<PathBuf, AtelierError> {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let mut run_dir = base.join(format!("run_{}", stamp));
    let mut seq = 1u32;
    while run_dir.exists() {
        run_dir = base.join(format!("run_{}_{:03}", stamp, seq));
        seq += 1;
    }

    fs::create_dir_all(&run_dir)
        .await
        .map_err(|e| AtelierError::Workspace {
            reason: format!("Failed to create run dir {}: {}", run_dir.display(), e),
        })?;

    info!("📂 RunYard: Created run directory: {}", run_dir.display());
    Ok(run_dir)
}

/// 画像 URL の中身をローカルファイルに保存する
pub async fn download_image(
    client: &reqwest::Client,
    url: &str,
    output_path: &Path,
) -> Result<PathBuf, AtelierError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| AtelierError::Download {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    if !resp.status().is_success() {
        return Err(AtelierError::Download {
            url: url.to_string(),
            reason: format!("status {}", resp.status()),
        });
    }

    let bytes = resp.bytes().await.map_err(|e| AtelierError::Download {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    fs::write(output_path, &bytes)
        .await
        .map_err(|e| AtelierError::Workspace {
            reason: format!("Failed to write {}: {}", output_path.display(), e),
        })?;

    Ok(output_path.to_path_buf())
}
