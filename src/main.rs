//! ClearBank Server Entry Point

use clap::{Args, Parser, Subcommand};
use clearbank::config::ServerConfig;
use clearbank::{auth, db, logging, server, AppState};
use tracing::info;

/// ClearBank デモバンキングAPIサーバー
#[derive(Parser, Debug)]
#[command(name = "clearbank", version, about)]
struct Cli {
    /// 実行するサブコマンド
    #[command(subcommand)]
    command: Option<Commands>,
}

/// 利用可能なサブコマンド
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the API server
    Serve(ServeArgs),
}

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone)]
struct ServeArgs {
    /// Listen port
    #[arg(short, long, default_value = "8080", env = "CLEARBANK_PORT")]
    port: u16,

    /// Bind address
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "CLEARBANK_HOST")]
    host: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init().expect("failed to initialize logging");

    let mut config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(Commands::Serve(args)) = cli.command {
        config.host = args.host;
        config.port = args.port;
    }

    info!("ClearBank v{}", env!("CARGO_PKG_VERSION"));

    let db_pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    auth::bootstrap::ensure_admin_exists(&db_pool)
        .await
        .expect("Failed to ensure admin exists");

    let state = AppState {
        db_pool,
        jwt_secret: config.jwt_secret.clone(),
        environment: config.environment.clone(),
    };

    let bind_addr = format!("{}:{}", config.host, config.port);
    server::run(state, &bind_addr).await;
}
