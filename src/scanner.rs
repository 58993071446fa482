//! 역방향 binlog 스캐너
//!
//! 인덱스의 최신 binlog 부터 오래된 순으로 mysqlbinlog 를 실행해
//! GTID 가 하나라도 나오는 첫 파일에서 멈추고, 그 파일의 GTID 를 쌍별로 정리한다.
//! 파일 단위 처리는 반드시 순차적이어야 한다 (첫 발견 시 즉시 중단).

use crate::config::AppConfig;
use crate::extractor::LogTextExtractor;
use crate::gtid::LatestGtidMap;
use crate::index::BinlogIndex;
use crate::parser::GtidParser;
use crate::report::ScanResult;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// 역방향 GTID 스캐너
pub struct BackwardScanner<E> {
    index_path: PathBuf,
    binlog_location: PathBuf,
    parser: GtidParser,
    extractor: E,
}

impl<E: LogTextExtractor> BackwardScanner<E> {
    pub fn new(config: &AppConfig, extractor: E) -> Self {
        BackwardScanner {
            index_path: config.index_path(),
            binlog_location: config.binlog_location.clone(),
            parser: GtidParser::new(config.event_headers_only),
            extractor,
        }
    }

    #[cfg(test)]
    pub(crate) fn extractor(&self) -> &E {
        &self.extractor
    }

    /// 인덱스를 디스크에서 새로 읽고 스캔
    ///
    /// 인덱스를 읽을 수 없으면 에러를 기록하고 빈 인덱스 결과를 반환한다.
    pub async fn scan(&self) -> ScanResult {
        match BinlogIndex::read(&self.index_path, &self.binlog_location).await {
            Ok(index) => self.scan_index(&index).await,
            Err(e) => {
                error!("Cannot read binlog index: {}", e);
                ScanResult::empty_index()
            }
        }
    }

    /// 주어진 인덱스를 최신 → 오래된 순으로 스캔
    pub async fn scan_index(&self, index: &BinlogIndex) -> ScanResult {
        let latest_in_index = match index.latest() {
            Some(latest) => latest,
            None => {
                info!("Binlog index {} is empty", self.index_path.display());
                return ScanResult::empty_index();
            }
        };

        let mut files_scanned = 0;
        for binlog in index.newest_first() {
            files_scanned += 1;
            let gtids = self.gtids_in(binlog).await;

            if !gtids.is_empty() {
                let latest = LatestGtidMap::from_gtids(&gtids);
                let result = ScanResult::found(latest_in_index, binlog, files_scanned, latest);
                info!("{}", result);
                return result;
            }

            debug!("No GTID in {}, checking the previous binlog", binlog.display());
        }

        warn!(
            "No GTID found in any of the {} binlogs listed in {}",
            index.len(),
            self.index_path.display()
        );
        ScanResult::not_found(latest_in_index, files_scanned)
    }

    /// binlog 하나의 GTID 목록. 추출 실패는 "GTID 없음" 으로 취급.
    async fn gtids_in(&self, binlog: &Path) -> Vec<String> {
        debug!("Scanning {}", binlog.display());

        let lines = match self.extractor.extract(binlog).await {
            Ok(lines) => lines,
            Err(e) => {
                if e.is_recoverable() {
                    warn!("Skipping {}: {}", binlog.display(), e);
                } else {
                    error!("Skipping {}: {}", binlog.display(), e);
                }
                return Vec::new();
            }
        };

        self.parser
            .parse(&lines)
            .map(str::to_string)
            .collect()
    }
}
