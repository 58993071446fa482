//! GTID 리포터 관련 에러 타입

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SacromonteError {
    #[error("설정 에러: {0}")]
    ConfigError(String),

    #[error("Binlog 인덱스 에러: {0}")]
    IndexError(String),

    #[error("mysqlbinlog 실행 실패: {0}")]
    ExtractionFailure(String),

    #[error("Timeout 에러")]
    Timeout,

    #[error("GTID 처리 에러: {0}")]
    GtidError(String),
}

impl SacromonteError {
    /// 파일 단위로 흡수 가능한 에러인지 (스캔을 계속 진행)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SacromonteError::ExtractionFailure(_)
                | SacromonteError::Timeout
                | SacromonteError::GtidError(_)
        )
    }
}

impl From<config::ConfigError> for SacromonteError {
    fn from(err: config::ConfigError) -> Self {
        SacromonteError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SacromonteError>;
