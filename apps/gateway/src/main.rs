use infrastructure::manim_forge::ManimForgeClient;
use infrastructure::media_synth::MediaSynthClient;
use infrastructure::media_vault::SqliteMediaVault;
use infrastructure::s3_depot::S3Depot;
use infrastructure::wan_studio::WanRuntime;
use infrastructure::x_herald::XHerald;
use shared::config::AtelierConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

mod augment;
mod router;

use atelier_core::traits::{
    ArtifactStore, ManimSynthesizer, MediaSynthesizer, MediaVault, SocialPublisher,
    VideoHandleProvider,
};
use clap::Parser;
use router::{create_router, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 待受ポート（設定より優先）
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    // 1. 設定を読み込む
    let config = AtelierConfig::load()?;
    tracing::info!("⚙️  Config loaded:");
    tracing::info!("   Synth API: {}", config.synth_api_url);
    tracing::info!("   Database:  {}", config.database_url);
    tracing::info!(
        "   S3 bucket: {}",
        if config.s3_bucket.is_empty() { "(unset)" } else { &config.s3_bucket }
    );

    // 2. 永続化ゲートウェイ（DB の親ディレクトリは先に掘っておく）
    let db_path = config.database_url.trim_start_matches("sqlite://").to_string();
    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let vault = Arc::new(SqliteMediaVault::new(&config.database_url).await?);

    // 3. インフラクライアントの準備（起動時に一度だけ結線する）
    let synth: Arc<dyn MediaSynthesizer> = Arc::new(MediaSynthClient::new(
        &config.synth_api_url,
        &config.synth_api_key,
        vault.clone(),
    ));
    let manim: Arc<dyn ManimSynthesizer> = Arc::new(ManimForgeClient::new(
        &config.synth_api_url,
        &config.synth_api_key,
        vault.clone(),
    ));
    let depot: Arc<dyn ArtifactStore> =
        Arc::new(S3Depot::new(&config.s3_bucket, &config.s3_region).await);
    let herald: Arc<dyn SocialPublisher> =
        Arc::new(XHerald::new(&config.x_api_url, &config.x_bearer_token));

    // 4. Wan ランタイムの利用可否を起動時に確定させる
    let wan: Arc<dyn VideoHandleProvider> = Arc::new(WanRuntime::resolve(
        config.wan_enabled,
        config.wan_ckpt_dir.clone(),
        config.wan_device_id,
    ));

    let state = Arc::new(AppState {
        synth,
        manim,
        vault: vault as Arc<dyn MediaVault>,
        depot,
        herald,
        wan,
        http: reqwest::Client::new(),
        wan_generated_dir: PathBuf::from(&config.wan_generated_dir),
        fallback_user_id: config.fallback_user_id,
    });

    let app = create_router(state);
    let port = args.port.unwrap_or(config.bind_port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("📡 Media Atelier gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
