//! 최신 GTID 리포터 실행 파일
//!
//! 설정 파일을 읽고 HTTP 서버를 띄운다. 설정 에러 시 서버를 시작하지 않는다.

use clap::Parser;
use sacromonte::config::{AppConfig, DEFAULT_CONFIG_PATH};
use sacromonte::{BackwardScanner, MysqlbinlogExtractor};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Reports the latest GTID of a MariaDB/MySQL instance from its binlogs on disk
#[derive(Parser, Debug)]
#[command(name = "sacromonte", version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 로깅 초기화 (RUST_LOG 미설정 시 info)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let config = match AppConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load {}: {}", args.config.display(), e);
            return Err(e.into());
        }
    };

    info!("Http server starting...");
    info!("Binlog index: {}", config.index_path().display());

    let extractor = MysqlbinlogExtractor::from_config(&config)?;
    info!(
        "mysqlbinlog: {} (timeout {:?})",
        extractor.program(),
        config.mysqlbinlog_timeout
    );
    let scanner = Arc::new(BackwardScanner::new(&config, extractor));

    sacromonte::server::serve(config.socket_addr(), scanner).await?;

    Ok(())
}
