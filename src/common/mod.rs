//! 共通型定義

/// エラー型定義
pub mod error;

/// 認証関連のデータモデル
pub mod auth;

/// ドメインモデル（AIプロファイル、判定、監査ログ、同意、訂正）
pub mod types;
