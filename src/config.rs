//! 環境変数によるコンフィグレーション管理
//!
//! すべての設定は `CLEARBANK_` プレフィックスの環境変数から読む。

use crate::common::error::BankError;

/// 環境変数を取得（未設定ならNone）
pub fn get_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// 環境変数を取得し、未設定ならデフォルト値を返す
pub fn get_env_or(name: &str, default: &str) -> String {
    get_env(name).unwrap_or_else(|| default.to_string())
}

/// 環境変数を指定型にパースして取得
///
/// 未設定またはパース失敗時はデフォルト値を返す。
pub fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    get_env(name).and_then(|s| s.parse().ok()).unwrap_or(default)
}

/// サーバー設定
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// バインドアドレス
    pub host: String,
    /// リッスンポート
    pub port: u16,
    /// デプロイ環境名（ヘルスチェック応答に含める）
    pub environment: String,
    /// データベース接続URL
    pub database_url: String,
    /// JWT署名シークレット
    pub jwt_secret: String,
}

impl ServerConfig {
    /// 環境変数から設定を読み込む
    ///
    /// `CLEARBANK_JWT_SECRET` は必須。未設定の場合はエラーを返し、
    /// 呼び出し側（main）はプロセスを終了させる。デフォルトシークレットへの
    /// フォールバックは行わない。
    pub fn from_env() -> Result<Self, BankError> {
        let jwt_secret = get_env("CLEARBANK_JWT_SECRET").ok_or_else(|| {
            BankError::Internal(
                "CLEARBANK_JWT_SECRET is not set; refusing to start without a signing secret"
                    .to_string(),
            )
        })?;

        Ok(Self {
            host: get_env_or("CLEARBANK_HOST", "127.0.0.1"),
            port: get_env_parse("CLEARBANK_PORT", 8080u16),
            environment: get_env_or("CLEARBANK_ENV", "development"),
            database_url: get_env_or("CLEARBANK_DATABASE_URL", "sqlite:clearbank.db"),
            jwt_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_from_env_requires_jwt_secret() {
        std::env::remove_var("CLEARBANK_JWT_SECRET");
        let err = ServerConfig::from_env().unwrap_err();
        assert!(matches!(err, BankError::Internal(_)));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        std::env::set_var("CLEARBANK_JWT_SECRET", "test-secret");
        std::env::remove_var("CLEARBANK_HOST");
        std::env::remove_var("CLEARBANK_PORT");
        std::env::remove_var("CLEARBANK_ENV");
        std::env::remove_var("CLEARBANK_DATABASE_URL");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, "development");
        assert_eq!(config.database_url, "sqlite:clearbank.db");

        std::env::remove_var("CLEARBANK_JWT_SECRET");
    }

    #[test]
    #[serial]
    fn test_get_env_parse_invalid_value_falls_back() {
        std::env::set_var("CLEARBANK_PORT", "not-a-port");
        assert_eq!(get_env_parse("CLEARBANK_PORT", 8080u16), 8080);
        std::env::remove_var("CLEARBANK_PORT");
    }

    #[test]
    #[serial]
    fn test_get_env_treats_empty_as_unset() {
        std::env::set_var("CLEARBANK_ENV", "");
        assert!(get_env("CLEARBANK_ENV").is_none());
        std::env::remove_var("CLEARBANK_ENV");
    }
}
