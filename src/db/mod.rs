//! データベースアクセス層
//!
//! SQLiteベースのデータ永続化。接続プールはプロセス起動時に1つ作成し、
//! `AppState`経由で各コンポーネントへ明示的に注入する（プロセス全域の
//! 暗黙グローバルは持たない）。

use crate::common::error::{BankError, BankResult};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use std::str::FromStr;

/// ユーザー管理
pub mod users;

/// AIプロファイル
pub mod profiles;

/// AI判定
pub mod decisions;

/// 判定監査ログ（追記専用）
pub mod audit_log;

/// データ同意設定
pub mod consents;

/// 訂正リクエスト
pub mod corrections;

/// データベース接続プールを作成し、マイグレーションを実行する
///
/// # Arguments
/// * `database_url` - 接続URL（例: `sqlite:data/clearbank.db`）
///
/// # Returns
/// * `Ok(SqlitePool)` - 接続プール
/// * `Err(BankError)` - 接続またはマイグレーション失敗
pub async fn create_pool(database_url: &str) -> BankResult<SqlitePool> {
    // SQLiteファイルはディレクトリが存在しないと作成できないため、先に作成しておく
    if let Some(path) = database_url.strip_prefix("sqlite:") {
        if !path.starts_with(':') {
            let normalized = path.trim_start_matches("//");
            let path_without_params = normalized.split('?').next().unwrap_or(normalized);
            if let Some(parent) = std::path::Path::new(path_without_params).parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    BankError::Database(format!("Failed to create database directory: {}", e))
                })?;
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| BankError::Database(format!("Invalid database URL: {}", e)))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .map_err(|e| BankError::Database(format!("Failed to connect to database: {}", e)))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| BankError::Database(format!("Migration failed: {}", e)))?;

    Ok(pool)
}

/// 書き込みロックを即時取得するトランザクションを開始する
///
/// `Pool::begin`の遅延`BEGIN`では、並行する書き込みトランザクションが
/// 互いのコミットをスナップショットに取り込めずSQLITE_BUSY_SNAPSHOTで
/// 失敗する。`BEGIN IMMEDIATE`は後着側をロック取得時点で待たせ、
/// ロック獲得後の読み取りは先行コミット済みの状態を見る。
///
/// 返された接続は[`commit`]または[`rollback`]で必ず閉じること。
pub(crate) async fn begin_immediate(pool: &SqlitePool) -> BankResult<PoolConnection<Sqlite>> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| BankError::Database(format!("Failed to acquire connection: {}", e)))?;
    sqlx::query("BEGIN IMMEDIATE")
        .execute(&mut *conn)
        .await
        .map_err(|e| BankError::Database(format!("Failed to begin transaction: {}", e)))?;
    Ok(conn)
}

/// [`begin_immediate`]で開始したトランザクションをコミットする
pub(crate) async fn commit(conn: &mut SqliteConnection) -> BankResult<()> {
    sqlx::query("COMMIT")
        .execute(conn)
        .await
        .map_err(|e| BankError::Database(format!("Failed to commit transaction: {}", e)))?;
    Ok(())
}

/// [`begin_immediate`]で開始したトランザクションをロールバックする
///
/// エラーパスの後始末用。ロールバック自体の失敗はログに残すのみ。
pub(crate) async fn rollback(conn: &mut SqliteConnection) {
    if let Err(e) = sqlx::query("ROLLBACK").execute(conn).await {
        tracing::warn!("Failed to roll back transaction: {}", e);
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use sqlx::SqlitePool;

    /// テスト用のインメモリSQLiteプールを作成し、マイグレーションを実行する
    pub async fn test_db_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        pool
    }

    /// テスト用ユーザーを作成する（bcryptを避けるため固定ハッシュ）
    pub async fn test_user(pool: &SqlitePool, email: &str) -> crate::common::auth::User {
        crate::db::users::create(
            pool,
            email,
            "$2b$12$testhashtesthashtesthashte",
            None,
            None,
            crate::common::auth::UserRole::Customer,
        )
        .await
        .expect("Failed to create test user")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool_with_invalid_url() {
        let result = create_pool("invalid://url").await;
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), BankError::Database(_)));
    }

    #[tokio::test]
    async fn test_immediate_transaction_commit_is_visible() {
        let pool = test_utils::test_db_pool().await;

        let mut conn = begin_immediate(&pool).await.expect("begin");
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, created_at, updated_at)
             VALUES ('u1', 'tx@example.com', 'h', 'customer', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .execute(&mut *conn)
        .await
        .expect("insert");
        commit(&mut conn).await.expect("commit");
        drop(conn);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_immediate_transaction_rollback_discards_writes() {
        let pool = test_utils::test_db_pool().await;

        let mut conn = begin_immediate(&pool).await.expect("begin");
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, created_at, updated_at)
             VALUES ('u1', 'rb@example.com', 'h', 'customer', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .execute(&mut *conn)
        .await
        .expect("insert");
        rollback(&mut conn).await;
        drop(conn);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_create_pool_in_memory() {
        let pool = create_pool("sqlite::memory:").await.expect("pool");
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .expect("users table exists");
        assert_eq!(count, 0);
    }
}
