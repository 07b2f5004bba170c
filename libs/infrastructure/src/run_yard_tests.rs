//! # Run Yard Tests
//!
//! `run_yard.rs` の単体テスト。
//! - タイムスタンプ命名
//! - 同一秒内の衝突回避

#[cfg(test)]
mod tests {
    use crate::run_yard;

    #[tokio::test]
    async fn test_run_dir_created_with_timestamp_name() {
        let tmp_dir = tempfile::TempDir::new().unwrap();

        let run_dir = run_yard::create_run_dir(tmp_dir.path()).await.unwrap();

        assert!(run_dir.is_dir());
        let name = run_dir.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("run_"), "got: {}", name);
        // run_YYYYMMDD_HHMMSS
        assert!(name.len() >= "run_20240101_000000".len());
    }

    #[tokio::test]
    async fn test_run_dirs_unique_within_same_second() {
        let tmp_dir = tempfile::TempDir::new().unwrap();

        let first = run_yard::create_run_dir(tmp_dir.path()).await.unwrap();
        let second = run_yard::create_run_dir(tmp_dir.path()).await.unwrap();
        let third = run_yard::create_run_dir(tmp_dir.path()).await.unwrap();

        assert_ne!(first, second);
        assert_ne!(second, third);
        assert!(first.is_dir() && second.is_dir() && third.is_dir());
    }

    #[tokio::test]
    async fn test_nested_base_is_bootstrapped() {
        let tmp_dir = tempfile::TempDir::new().unwrap();
        let base = tmp_dir.path().join("deep").join("wan_generated");

        let run_dir = run_yard::create_run_dir(&base).await.unwrap();
        assert!(run_dir.starts_with(&base));
        assert!(run_dir.is_dir());
    }
}
