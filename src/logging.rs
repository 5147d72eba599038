//! ロギング初期化
//!
//! tracing-subscriberをプロセス全体で一度だけ初期化する。
//! フィルタは`CLEARBANK_LOG`環境変数から読み、未設定なら`info`。

use tracing_subscriber::EnvFilter;

/// ロギングを初期化する
///
/// 二重初期化はエラー文字列を返す（テストから複数回呼ばれても致命傷にしない）。
pub fn init() -> Result<(), String> {
    let filter = EnvFilter::try_from_env("CLEARBANK_LOG").unwrap_or_else(|_| "info".into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| format!("failed to initialize tracing subscriber: {}", e))
}
