//! # S3Depot — 成果物ストレージ
//!
//! ローカルの生成物を S3 にアップロードし、公開 URL を返す。
//! 失敗時のフォールバック（ローカルパスで代用するか等）は呼び出し側の方針に委ねる。

use async_trait::async_trait;
use atelier_core::error::AtelierError;
use atelier_core::traits::ArtifactStore;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;
use tracing::info;

pub struct S3Depot {
    client: aws_sdk_s3::Client,
    bucket: String,
    region: String,
}

impl S3Depot {
    pub async fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        let region = region.into();
        let conf = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .load()
            .await;

        Self {
            client: aws_sdk_s3::Client::new(&conf),
            bucket: bucket.into(),
            region,
        }
    }

    fn content_type_for(path: &Path) -> &'static str {
        match path.extension().and_then(|e| e.to_str()) {
            Some("mp4") => "video/mp4",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            _ => "application/octet-stream",
        }
    }
}

#[async_trait]
impl ArtifactStore for S3Depot {
    async fn upload(&self, local_path: &Path, folder: &str) -> Result<String, AtelierError> {
        let file_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AtelierError::Storage {
                source: anyhow::anyhow!("invalid file name: {}", local_path.display()),
            })?;
        let key = format!("{}/{}", folder, file_name);

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| AtelierError::Storage {
                source: anyhow::anyhow!("failed to read {}: {}", local_path.display(), e),
            })?;

        info!("📦 S3Depot: Uploading {} -> s3://{}/{}", local_path.display(), self.bucket, key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(Self::content_type_for(local_path))
            .body(body)
            .send()
            .await
            .map_err(|e| AtelierError::Storage {
                source: anyhow::anyhow!("PutObject failed: {}", e),
            })?;

        Ok(format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket, self.region, key
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_guessed_from_extension() {
        assert_eq!(S3Depot::content_type_for(Path::new("a/wan_video.mp4")), "video/mp4");
        assert_eq!(S3Depot::content_type_for(Path::new("ref_image_0.png")), "image/png");
        assert_eq!(S3Depot::content_type_for(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(
            S3Depot::content_type_for(Path::new("noext")),
            "application/octet-stream"
        );
    }
}
