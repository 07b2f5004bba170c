//! # Infrastructure — I/O実装層
//!
//! `core` で定義されたトレイトの具体実装を提供する。
//! 生成 API, SQLite, S3, X API, Wan 推論プロセスとの通信を担当。

pub mod manim_forge;
pub mod media_synth;
pub mod media_vault;
pub mod run_yard;
pub mod s3_depot;
pub mod wan_studio;
pub mod x_herald;

#[cfg(test)]
mod media_vault_tests;
#[cfg(test)]
mod run_yard_tests;
#[cfg(test)]
mod wan_studio_tests;
