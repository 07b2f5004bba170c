use serde::{Deserialize, Serialize};

/// Media Atelier 全体の設定
#[derive(Clone, Serialize, Deserialize)]
pub struct AtelierConfig {
    /// HTTP サーバーの待受ポート
    pub bind_port: u16,
    /// SQLite の接続 URL
    pub database_url: String,
    /// 記事→メディア生成サービスの API エンドポイント
    pub synth_api_url: String,
    /// 生成サービスの API キー
    pub synth_api_key: String,
    /// アップロード先の S3 バケット名
    pub s3_bucket: String,
    /// S3 リージョン
    pub s3_region: String,
    /// X (Twitter) API のベース URL
    pub x_api_url: String,
    /// X API の Bearer トークン
    pub x_bearer_token: String,
    /// Wan 動画補強フローを有効にするか（デプロイプロファイル切替）
    pub wan_enabled: bool,
    /// Wan モデルのチェックポイントディレクトリ
    pub wan_ckpt_dir: String,
    /// 推論に使うデバイス ID
    pub wan_device_id: u32,
    /// 実行ごとのランディレクトリを掘る親ディレクトリ
    pub wan_generated_dir: String,
    /// user_id 未指定時に使うフォールバック ID
    pub fallback_user_id: i64,
}

impl std::fmt::Debug for AtelierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtelierConfig")
            .field("bind_port", &self.bind_port)
            .field("database_url", &self.database_url)
            .field("synth_api_url", &self.synth_api_url)
            .field("synth_api_key", if self.synth_api_key.is_empty() { &"" } else { &"***" })
            .field("s3_bucket", &self.s3_bucket)
            .field("s3_region", &self.s3_region)
            .field("x_api_url", &self.x_api_url)
            .field("x_bearer_token", if self.x_bearer_token.is_empty() { &"" } else { &"***" })
            .field("wan_enabled", &self.wan_enabled)
            .field("wan_ckpt_dir", &self.wan_ckpt_dir)
            .field("wan_device_id", &self.wan_device_id)
            .field("wan_generated_dir", &self.wan_generated_dir)
            .field("fallback_user_id", &self.fallback_user_id)
            .finish()
    }
}

impl AtelierConfig {
    /// 設定をファイルまたは環境変数から読み込む
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            // デフォルト値の設定
            .set_default("bind_port", 8000)?
            .set_default("database_url", std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://workspace/db/atelier.db".to_string()))?
            .set_default("synth_api_url", std::env::var("SYNTH_API_URL").unwrap_or_else(|_| "http://localhost:9400".to_string()))?
            .set_default("synth_api_key", std::env::var("SYNTH_API_KEY").unwrap_or_else(|_| "".to_string()))?
            .set_default("s3_bucket", std::env::var("S3_BUCKET").unwrap_or_else(|_| "".to_string()))?
            .set_default("s3_region", std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()))?
            .set_default("x_api_url", "https://api.x.com")?
            .set_default("x_bearer_token", std::env::var("X_BEARER_TOKEN").unwrap_or_else(|_| "".to_string()))?
            .set_default("wan_enabled", std::env::var("WAN_ENABLED").map(|v| v.to_lowercase() != "false").unwrap_or(true))?
            .set_default("wan_ckpt_dir", std::env::var("WAN_CKPT_DIR").unwrap_or_else(|_| "models/Wan2.1-VACE-1.3B".to_string()))?
            .set_default("wan_device_id", 0)?
            .set_default("wan_generated_dir", "workspace/wan_generated")?
            .set_default("fallback_user_id", 1)?
            // config.toml があれば読み込む
            .add_source(config::File::with_name("config").required(false))
            // 環境変数 (MEDIA_ATELIER_*) があれば上書き
            .add_source(config::Environment::with_prefix("MEDIA_ATELIER"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_load_defaults() {
        let config = AtelierConfig::load().unwrap();
        assert_eq!(config.bind_port, 8000);
        assert_eq!(config.x_api_url, "https://api.x.com");
        assert_eq!(config.fallback_user_id, 1);
    }

    #[test]
    fn test_config_load_from_file() {
        // 一時的な config.toml を作成 (toml 拡張子を付加してフォーマットを認識させる)
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "bind_port = 9000").unwrap();
        writeln!(file, "database_url = \"sqlite://custom.db\"").unwrap();
        writeln!(file, "synth_api_url = \"http://custom:9400\"").unwrap();
        writeln!(file, "synth_api_key = \"\"").unwrap();
        writeln!(file, "s3_bucket = \"atelier-media\"").unwrap();
        writeln!(file, "s3_region = \"ap-northeast-1\"").unwrap();
        writeln!(file, "x_api_url = \"https://api.x.com\"").unwrap();
        writeln!(file, "x_bearer_token = \"\"").unwrap();
        writeln!(file, "wan_enabled = false").unwrap();
        writeln!(file, "wan_ckpt_dir = \"custom_ckpt\"").unwrap();
        writeln!(file, "wan_device_id = 1").unwrap();
        writeln!(file, "wan_generated_dir = \"/tmp/wan_runs\"").unwrap();
        writeln!(file, "fallback_user_id = 42").unwrap();

        let settings = config::Config::builder()
            .add_source(config::File::from(file.path()))
            .build()
            .unwrap();

        let config: AtelierConfig = settings.try_deserialize().unwrap();
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.s3_region, "ap-northeast-1");
        assert!(!config.wan_enabled);
        assert_eq!(config.fallback_user_id, 42);
    }
}
