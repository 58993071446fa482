//! 스캔 결과 (응답 페이로드)
//!
//! ```json
//! {
//!   "metadata": {
//!     "latest_binlog_in_index": "/var/lib/mysql/mysql-bin.000003",
//!     "latest_binlog_scanned": "/var/lib/mysql/mysql-bin.000002",
//!     "files_scanned": 2,
//!     "scanned_at": "2026-10-18T09:00:00Z"
//!   },
//!   "gtids": { "0-1": "0-1-42" }
//! }
//! ```

use crate::gtid::LatestGtidMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// 인덱스가 비어 있을 때
pub const NOT_AVAILABLE: &str = "N/A";

/// 어떤 binlog 에서도 GTID 를 찾지 못했을 때
pub const NOT_FOUND: &str = "None";

/// 스캔 메타데이터
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMetadata {
    /// 인덱스상 가장 최신 binlog
    pub latest_binlog_in_index: String,
    /// GTID 가 실제로 발견된 binlog
    pub latest_binlog_scanned: String,
    /// mysqlbinlog 실행 횟수
    pub files_scanned: usize,
    pub scanned_at: DateTime<Utc>,
}

/// 스캔 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub metadata: ScanMetadata,
    pub gtids: LatestGtidMap,
}

impl ScanResult {
    /// 빈 인덱스
    pub fn empty_index() -> Self {
        ScanResult {
            metadata: ScanMetadata {
                latest_binlog_in_index: NOT_AVAILABLE.to_string(),
                latest_binlog_scanned: NOT_AVAILABLE.to_string(),
                files_scanned: 0,
                scanned_at: Utc::now(),
            },
            gtids: LatestGtidMap::new(),
        }
    }

    /// 모든 binlog 를 확인했지만 GTID 없음
    pub fn not_found(latest_in_index: &Path, files_scanned: usize) -> Self {
        ScanResult {
            metadata: ScanMetadata {
                latest_binlog_in_index: latest_in_index.display().to_string(),
                latest_binlog_scanned: NOT_FOUND.to_string(),
                files_scanned,
                scanned_at: Utc::now(),
            },
            gtids: LatestGtidMap::new(),
        }
    }

    pub fn found(
        latest_in_index: &Path,
        scanned: &Path,
        files_scanned: usize,
        gtids: LatestGtidMap,
    ) -> Self {
        ScanResult {
            metadata: ScanMetadata {
                latest_binlog_in_index: latest_in_index.display().to_string(),
                latest_binlog_scanned: scanned.display().to_string(),
                files_scanned,
                scanned_at: Utc::now(),
            },
            gtids,
        }
    }
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScanResult {{ in_index: {}, scanned: {}, files: {}, gtids: [{}] }}",
            self.metadata.latest_binlog_in_index,
            self.metadata.latest_binlog_scanned,
            self.metadata.files_scanned,
            self.gtids
        )
    }
}
