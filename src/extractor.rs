//! mysqlbinlog 실행 및 텍스트 출력 수집
//!
//! `{mysqlbinlog_exec} {binlog}` 를 실행하고 stdout 중 `GTID` 가 포함된 라인만 모은다.
//! 실패(실행 불가, 0이 아닌 종료 코드, timeout)는 파일 단위로 흡수 가능한 에러다.

use crate::config::AppConfig;
use crate::error::{Result, SacromonteError};
use crate::parser::GTID_MARKER;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

/// binlog 파일 하나를 텍스트 라인으로 변환
#[async_trait]
pub trait LogTextExtractor: Send + Sync {
    async fn extract(&self, binlog: &Path) -> Result<Vec<String>>;
}

/// 외부 mysqlbinlog 프로세스 기반 추출기
#[derive(Debug, Clone)]
pub struct MysqlbinlogExtractor {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl MysqlbinlogExtractor {
    /// `exec` 는 공백으로 분리: 첫 토큰이 실행 파일, 나머지는 앞쪽 인자
    pub fn new(exec: &str, timeout: Duration) -> Result<Self> {
        let mut tokens = exec.split_whitespace().map(str::to_string);
        let program = tokens.next().ok_or_else(|| {
            SacromonteError::ConfigError("mysqlbinlog_exec is empty".to_string())
        })?;

        Ok(MysqlbinlogExtractor {
            program,
            args: tokens.collect(),
            timeout,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.mysqlbinlog_exec, config.mysqlbinlog_timeout)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, binlog: &Path) -> Result<Vec<String>> {
        debug!("Running {} {:?} {}", self.program, self.args, binlog.display());

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(binlog)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SacromonteError::ExtractionFailure(format!(
                    "Failed to spawn {}: {}",
                    self.program, e
                ))
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            SacromonteError::ExtractionFailure("stdout not captured".to_string())
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            SacromonteError::ExtractionFailure("stderr not captured".to_string())
        })?;

        // stderr 파이프가 가득 차지 않도록 동시에 읽는다
        let (lines, stderr_text) =
            tokio::try_join!(read_marked_lines(stdout), read_lossy(stderr)).map_err(|e| {
                SacromonteError::ExtractionFailure(format!(
                    "Failed to read output of {}: {}",
                    self.program, e
                ))
            })?;

        let status = child.wait().await.map_err(|e| {
            SacromonteError::ExtractionFailure(format!(
                "Failed to wait for {}: {}",
                self.program, e
            ))
        })?;
        if !status.success() {
            return Err(SacromonteError::ExtractionFailure(format!(
                "{} {} exited with {}: {}",
                self.program,
                binlog.display(),
                status,
                stderr_text.trim()
            )));
        }

        Ok(lines)
    }
}

#[async_trait]
impl LogTextExtractor for MysqlbinlogExtractor {
    async fn extract(&self, binlog: &Path) -> Result<Vec<String>> {
        match tokio::time::timeout(self.timeout, self.run(binlog)).await {
            Ok(result) => result,
            // future drop 시 kill_on_drop 으로 자식 프로세스 종료
            Err(_) => Err(SacromonteError::Timeout),
        }
    }
}

/// `GTID` 가 포함된 라인만 수집 (비 UTF-8 바이트는 대체 문자로)
async fn read_marked_lines<R: AsyncRead + Unpin>(reader: R) -> std::io::Result<Vec<String>> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut lines = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        if line.contains(GTID_MARKER) {
            lines.push(line.trim_end_matches(|c| c == '\n' || c == '\r').to_string());
        }
    }

    Ok(lines)
}

async fn read_lossy<R: AsyncRead + Unpin>(mut reader: R) -> std::io::Result<String> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DUMP: &str = "\
# at 4
#230514 10:12:01 server id 1  end_log_pos 256 CRC32 0x1f2e3d4c 	Start: binlog v 4
#230514 10:12:01 server id 1  end_log_pos 298 CRC32 0x4c1a2b3f 	GTID 0-1-41 trans
SET @@session.gtid_seq_no=41/*!*/;
#230514 10:12:02 server id 1  end_log_pos 385 CRC32 0x5d6e7f80 	GTID 0-1-42 trans
COMMIT/*!*/;
";

    #[test]
    fn test_exec_with_arguments() {
        let extractor = MysqlbinlogExtractor::new(
            "/usr/bin/mysqlbinlog --base64-output=never",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(extractor.program(), "/usr/bin/mysqlbinlog");
        assert_eq!(extractor.args, vec!["--base64-output=never".to_string()]);
    }

    #[test]
    fn test_empty_exec() {
        let err = MysqlbinlogExtractor::new("   ", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, SacromonteError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_extract_keeps_gtid_lines() {
        let dir = TempDir::new().unwrap();
        let binlog = dir.path().join("mysql-bin.000001");
        fs::write(&binlog, DUMP).unwrap();

        // cat 이 mysqlbinlog 역할
        let extractor = MysqlbinlogExtractor::new("cat", Duration::from_secs(5)).unwrap();
        let lines = extractor.extract(&binlog).await.unwrap();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("GTID 0-1-41 trans"));
        assert!(lines[1].ends_with("GTID 0-1-42 trans"));
    }

    #[tokio::test]
    async fn test_extract_decodes_lossily_and_strips_crlf() {
        let dir = TempDir::new().unwrap();
        let binlog = dir.path().join("mysql-bin.000002");
        fs::write(
            &binlog,
            b"\xff\xfe end_log_pos 1 GTID 0-1-9 trans\r\nbad \xc3 line\n".as_slice(),
        )
        .unwrap();

        let extractor = MysqlbinlogExtractor::new("cat", Duration::from_secs(5)).unwrap();
        let lines = extractor.extract(&binlog).await.unwrap();

        assert_eq!(
            lines,
            vec!["\u{fffd}\u{fffd} end_log_pos 1 GTID 0-1-9 trans".to_string()]
        );
    }

    #[tokio::test]
    async fn test_non_zero_exit() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("broken.sh");
        fs::write(&script, "echo 'GTID 0-1-1'\necho 'corrupted binlog' >&2\nexit 3\n").unwrap();

        let extractor = MysqlbinlogExtractor::new(
            &format!("/bin/sh {}", script.display()),
            Duration::from_secs(5),
        )
        .unwrap();
        let err = extractor.extract(Path::new("mysql-bin.000001")).await.unwrap_err();

        assert!(err.is_recoverable());
        assert!(matches!(
            err,
            SacromonteError::ExtractionFailure(ref msg) if msg.contains("corrupted binlog")
        ));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let extractor =
            MysqlbinlogExtractor::new("/nonexistent/mysqlbinlog", Duration::from_secs(5)).unwrap();
        let err = extractor.extract(Path::new("mysql-bin.000001")).await.unwrap_err();
        assert!(matches!(err, SacromonteError::ExtractionFailure(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("hang.sh");
        fs::write(&script, "sleep 5\n").unwrap();

        let extractor = MysqlbinlogExtractor::new(
            &format!("/bin/sh {}", script.display()),
            Duration::from_millis(200),
        )
        .unwrap();
        let err = extractor.extract(Path::new("mysql-bin.000001")).await.unwrap_err();
        assert!(matches!(err, SacromonteError::Timeout));
    }
}
