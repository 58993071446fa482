//! 오프라인 MariaDB/MySQL 인스턴스의 최신 GTID 리포터
//!
//! 서버에 접속하지 않고 디스크의 binlog 를 mysqlbinlog 로 읽어 최신 GTID 를 찾는다.
//! 주요 기능:
//! - Binlog 인덱스 파일 읽기
//! - mysqlbinlog 출력에서 GTID 추출
//! - (domain, server) 쌍별 최신 GTID 정리
//! - 최신 → 오래된 순 역방향 스캔
//! - HTTP 로 결과 제공

pub mod config;
pub mod error;
pub mod extractor;
pub mod gtid;
pub mod index;
pub mod parser;
pub mod report;
pub mod scanner;
pub mod server;

pub use crate::config::AppConfig;
pub use error::{Result, SacromonteError};
pub use extractor::{LogTextExtractor, MysqlbinlogExtractor};
pub use gtid::{LatestGtidMap, PairKey};
pub use index::BinlogIndex;
pub use parser::GtidParser;
pub use report::ScanResult;
pub use scanner::BackwardScanner;
