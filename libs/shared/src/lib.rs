//! # Shared — 横断ユーティリティ層
//!
//! 設定の読み込みなど、全クレートから参照される共通部品を置く。

pub mod config;
