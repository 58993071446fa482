//! Binlog 인덱스 파일 (`{basename}.index`)
//!
//! 한 줄에 binlog 파일명 하나, 오래된 것부터 기록된다.
//! 예:
//!   ./mysql-bin.000001
//!   ./mysql-bin.000002

use crate::error::{Result, SacromonteError};
use std::path::{Path, PathBuf};

/// 인덱스 순서대로 정렬된 binlog 경로 목록 (오래된 것 → 최신)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinlogIndex {
    files: Vec<PathBuf>,
}

impl BinlogIndex {
    pub fn new(files: Vec<PathBuf>) -> Self {
        BinlogIndex { files }
    }

    /// 인덱스 파일 읽기 (매 스캔마다 디스크에서 새로 읽음)
    pub async fn read(index_path: &Path, binlog_location: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(index_path).await.map_err(|e| {
            SacromonteError::IndexError(format!(
                "Failed to read {}: {}",
                index_path.display(),
                e
            ))
        })?;

        Ok(Self::parse(&contents, binlog_location))
    }

    /// 인덱스 내용 파싱. 빈 줄은 무시하고, 절대 경로가 아니면 binlog_location 기준으로 붙인다.
    pub fn parse(contents: &str, binlog_location: &Path) -> Self {
        let files = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| binlog_location.join(line))
            .collect();

        BinlogIndex { files }
    }

    /// 가장 최신 binlog
    pub fn latest(&self) -> Option<&Path> {
        self.files.last().map(PathBuf::as_path)
    }

    /// 최신 → 오래된 순
    pub fn newest_first(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().rev().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
