//! # WanStudio — Wan 動画生成ランタイム
//!
//! チェックポイントの検証（高コストな初回セットアップ）と推論プロセスの起動を担う。
//! ハンドルはプロセス生存期間中ただ一つで、`WanRuntime` が初回要求時に一度だけ
//! 構築する。teardown は定義しない。

use async_trait::async_trait;
use atelier_core::contracts::SamplingParams;
use atelier_core::error::AtelierError;
use atelier_core::traits::{VideoHandleProvider, VideoSynthesizer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Wan 推論ハンドル
pub struct WanStudio {
    ckpt_dir: PathBuf,
    device_id: u32,
}

impl WanStudio {
    /// チェックポイントを検証してハンドルを構築する。
    /// プロセス中で一度だけ呼ばれる前提（`WanRuntime` 経由で取得すること）。
    pub async fn load(ckpt_dir: &Path, device_id: u32) -> Result<Self, AtelierError> {
        if !ckpt_dir.is_dir() {
            return Err(AtelierError::VideoRuntime {
                reason: format!("checkpoint dir not found: {}", ckpt_dir.display()),
            });
        }

        // 中身のないディレクトリは壊れたチェックポイントとみなす
        let mut entries =
            tokio::fs::read_dir(ckpt_dir)
                .await
                .map_err(|e| AtelierError::VideoRuntime {
                    reason: format!("cannot read checkpoint dir: {}", e),
                })?;
        if entries
            .next_entry()
            .await
            .map_err(|e| AtelierError::VideoRuntime {
                reason: format!("cannot read checkpoint dir: {}", e),
            })?
            .is_none()
        {
            return Err(AtelierError::VideoRuntime {
                reason: format!("checkpoint dir is empty: {}", ckpt_dir.display()),
            });
        }

        info!(
            "✓ WanStudio: models ready (ckpt: {}, device: {})",
            ckpt_dir.display(),
            device_id
        );
        Ok(Self {
            ckpt_dir: ckpt_dir.to_path_buf(),
            device_id,
        })
    }
}

#[async_trait]
impl VideoSynthesizer for WanStudio {
    async fn generate(
        &self,
        prompt: &str,
        ref_image: &Path,
        save_file: &Path,
        params: &SamplingParams,
    ) -> Result<PathBuf, AtelierError> {
        info!("🎥 WanStudio: Generating video -> {}", save_file.display());

        let status = Command::new("python3")
            .arg("-m")
            .arg("wan.generate")
            .arg("--task")
            .arg("vace-1.3B")
            .arg("--ckpt_dir")
            .arg(&self.ckpt_dir)
            .arg("--device_id")
            .arg(self.device_id.to_string())
            .arg("--prompt")
            .arg(prompt)
            .arg("--src_ref_images")
            .arg(ref_image)
            .arg("--save_file")
            .arg(save_file)
            .arg("--size")
            .arg(&params.size)
            .arg("--frame_num")
            .arg(params.frame_num.to_string())
            .arg("--sample_steps")
            .arg(params.sample_steps.to_string())
            .arg("--sample_shift")
            .arg(params.sample_shift.to_string())
            .arg("--sample_solver")
            .arg(&params.sample_solver)
            .arg("--guide_scale")
            .arg(params.guide_scale.to_string())
            .arg("--base_seed")
            .arg(params.base_seed.to_string())
            .arg("--offload_model")
            .arg(params.offload_model.to_string())
            .status()
            .await
            .map_err(|e| AtelierError::VideoRuntime {
                reason: format!("Failed to spawn wan generator: {}", e),
            })?;

        if status.success() {
            Ok(save_file.to_path_buf())
        } else {
            Err(AtelierError::VideoRuntime {
                reason: format!("wan generator exited with {}", status),
            })
        }
    }
}

/// プロセス全体で共有する Wan ハンドルの管理者。
///
/// 利用可否（設定フラグ AND チェックポイントの存在）は起動時に確定させる。
/// ハンドル構築は `OnceCell` で直列化され、同時の初回アクセスでも一度しか走らない。
pub struct WanRuntime {
    available: bool,
    ckpt_dir: PathBuf,
    device_id: u32,
    cell: OnceCell<Arc<WanStudio>>,
}

impl WanRuntime {
    /// 起動時に一度だけ呼び、利用可否を解決してログに残す
    pub fn resolve(enabled: bool, ckpt_dir: impl Into<PathBuf>, device_id: u32) -> Self {
        let ckpt_dir = ckpt_dir.into();
        let available = enabled && ckpt_dir.is_dir();

        if available {
            info!("🎞️ Wan video augmentation: available (ckpt: {})", ckpt_dir.display());
        } else if !enabled {
            info!("🎞️ Wan video augmentation: disabled by config");
        } else {
            warn!(
                "⚠️ Wan video augmentation: checkpoint dir missing ({}), flow will be skipped",
                ckpt_dir.display()
            );
        }

        Self {
            available,
            ckpt_dir,
            device_id,
            cell: OnceCell::new(),
        }
    }
}

#[async_trait]
impl VideoHandleProvider for WanRuntime {
    fn is_available(&self) -> bool {
        self.available
    }

    /// ハンドルを取得する。初回呼び出しでモデルをロードし、以後は同一インスタンスを返す
    async fn acquire(&self) -> Result<Arc<dyn VideoSynthesizer>, AtelierError> {
        if !self.available {
            return Err(AtelierError::VideoRuntime {
                reason: "Wan generator not available".to_string(),
            });
        }

        let studio = self
            .cell
            .get_or_try_init(|| async {
                info!("🔄 Loading Wan models (first run - this will take a while)...");
                let studio = WanStudio::load(&self.ckpt_dir, self.device_id).await?;
                info!("✓ Models loaded and cached in memory");
                Ok::<_, AtelierError>(Arc::new(studio))
            })
            .await?;

        Ok(studio.clone() as Arc<dyn VideoSynthesizer>)
    }
}
