//! clearbank server
//!
//! AI透明性バンキングポータルのバックエンド。
//! 顧客ポータル（AIプロファイル、同意設定、判定履歴）と
//! 管理コンソール（監査ログ、訂正キュー）向けのREST APIを提供する。

#![warn(missing_docs)]

/// 共通型定義（エラー、認証モデル、ドメインモデル）
pub mod common;

/// REST APIハンドラー
pub mod api;

/// 認証・認可機能
pub mod auth;

/// ルールベースAI生成エンジン
pub mod engine;

/// 判定監査ログの記録
pub mod audit;

/// データベースアクセス
pub mod db;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// axumサーバー起動・シャットダウンハンドリング
pub mod server;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// データベース接続プール
    pub db_pool: sqlx::SqlitePool,
    /// JWT秘密鍵
    pub jwt_secret: String,
    /// 環境名（/health で返す）
    pub environment: String,
}
