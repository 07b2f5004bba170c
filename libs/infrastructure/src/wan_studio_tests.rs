//! # Wan Studio Tests
//!
//! `wan_studio.rs` の単体テスト。
//! - 利用可否の起動時解決
//! - シングルトンハンドルの一度きり初期化

#[cfg(test)]
mod tests {
    use crate::wan_studio::{WanRuntime, WanStudio};
    use atelier_core::traits::VideoHandleProvider;
    use std::sync::Arc;

    /// 重みファイルを1つ置いたダミーのチェックポイントディレクトリ
    fn fake_ckpt() -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("diffusion_pytorch_model.safetensors"), b"w").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_runtime_unavailable_without_ckpt() {
        let runtime = WanRuntime::resolve(true, "/nonexistent/ckpt", 0);
        assert!(!runtime.is_available());
        assert!(runtime.acquire().await.is_err());
    }

    #[tokio::test]
    async fn test_runtime_disabled_by_config() {
        let ckpt = fake_ckpt();
        let runtime = WanRuntime::resolve(false, ckpt.path(), 0);
        assert!(!runtime.is_available());
        assert!(runtime.acquire().await.is_err());
    }

    #[tokio::test]
    async fn test_singleton_handle_reused_across_calls() {
        let ckpt = fake_ckpt();
        let runtime = WanRuntime::resolve(true, ckpt.path(), 0);
        assert!(runtime.is_available());

        let first = runtime.acquire().await.unwrap();
        let second = runtime.acquire().await.unwrap();

        // 2回目以降は初期化済みの同一インスタンス
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_load_rejects_empty_ckpt_dir() {
        let empty = tempfile::TempDir::new().unwrap();
        let result = WanStudio::load(empty.path(), 0).await;
        assert!(result.is_err(), "empty checkpoint dir must be rejected");
    }
}
