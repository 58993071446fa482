//! 설정 파일 로드
//!
//! INI 형식, `[main]` 섹션:
//! ```ini
//! [main]
//! binlog_location = /var/lib/mysql
//! binlog_basename = mysql-bin
//! mysqlbinlog_exec = /usr/bin/mysqlbinlog
//! ip = 0.0.0.0
//! port = 2934
//! ```

use crate::error::{Result, SacromonteError};
use config::{Config, File, FileFormat};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 기본 설정 파일 경로
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sacromonte.cnf";
pub const DEFAULT_PORT: u16 = 2934;
pub const DEFAULT_EXTRACT_TIMEOUT: Duration = Duration::from_secs(30);

const SECTION: &str = "main";

/// 애플리케이션 설정 (시작 시 한 번 로드, 이후 불변)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// binlog 파일들이 위치한 디렉터리
    pub binlog_location: PathBuf,
    /// binlog 파일명 접두사 (e.g., "mysql-bin")
    pub binlog_basename: String,
    /// mysqlbinlog 실행 명령 (추가 인자 포함 가능)
    pub mysqlbinlog_exec: String,
    pub ip: IpAddr,
    pub port: u16,
    /// mysqlbinlog 1회 실행 제한 시간
    pub mysqlbinlog_timeout: Duration,
    /// `end_log_pos` 가 포함된 이벤트 헤더 라인만 GTID 후보로 사용
    pub event_headers_only: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            binlog_location: PathBuf::from("/var/lib/mysql"),
            binlog_basename: "mysql-bin".to_string(),
            mysqlbinlog_exec: "mysqlbinlog".to_string(),
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            mysqlbinlog_timeout: DEFAULT_EXTRACT_TIMEOUT,
            event_headers_only: false,
        }
    }
}

impl AppConfig {
    pub fn new(
        binlog_location: impl Into<PathBuf>,
        binlog_basename: impl Into<String>,
        mysqlbinlog_exec: impl Into<String>,
    ) -> Self {
        AppConfig {
            binlog_location: binlog_location.into(),
            binlog_basename: binlog_basename.into(),
            mysqlbinlog_exec: mysqlbinlog_exec.into(),
            ..Default::default()
        }
    }

    /// 설정 파일을 읽고 검증한다. 인덱스 파일이 없으면 에러.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(SacromonteError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let settings = Config::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Ini))
            .build()?;

        let config = Self::from_settings(&settings)?;

        let index_path = config.index_path();
        if !index_path.is_file() {
            return Err(SacromonteError::ConfigError(format!(
                "Binlog index file not found: {}",
                index_path.display()
            )));
        }

        Ok(config)
    }

    fn from_settings(settings: &Config) -> Result<Self> {
        let defaults = AppConfig::default();

        let ip = match optional_string(settings, "ip")? {
            Some(ip) => ip.trim().parse::<IpAddr>().map_err(|_| {
                SacromonteError::ConfigError(format!("Invalid ip: {}", ip))
            })?,
            None => defaults.ip,
        };

        let port = match optional_string(settings, "port")? {
            Some(port) => port.trim().parse::<u16>().map_err(|_| {
                SacromonteError::ConfigError(format!("Invalid port: {}", port))
            })?,
            None => defaults.port,
        };

        let mysqlbinlog_timeout = match optional_string(settings, "mysqlbinlog_timeout")? {
            Some(secs) => secs
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| {
                    SacromonteError::ConfigError(format!("Invalid mysqlbinlog_timeout: {}", secs))
                })?,
            None => defaults.mysqlbinlog_timeout,
        };

        let event_headers_only = match settings.get_bool(&key("event_headers_only")) {
            Ok(value) => value,
            Err(config::ConfigError::NotFound(_)) => defaults.event_headers_only,
            Err(e) => {
                return Err(SacromonteError::ConfigError(format!(
                    "Invalid event_headers_only: {}",
                    e
                )))
            }
        };

        Ok(AppConfig {
            binlog_location: PathBuf::from(required_string(settings, "binlog_location")?),
            binlog_basename: required_string(settings, "binlog_basename")?,
            mysqlbinlog_exec: required_string(settings, "mysqlbinlog_exec")?,
            ip,
            port,
            mysqlbinlog_timeout,
            event_headers_only,
        })
    }

    /// `{binlog_location}/{binlog_basename}.index`
    pub fn index_path(&self) -> PathBuf {
        self.binlog_location
            .join(format!("{}.index", self.binlog_basename))
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

fn key(name: &str) -> String {
    format!("{}.{}", SECTION, name)
}

fn optional_string(settings: &Config, name: &str) -> Result<Option<String>> {
    match settings.get_string(&key(name)) {
        Ok(value) => Ok(Some(value)),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn required_string(settings: &Config, name: &str) -> Result<String> {
    let value = optional_string(settings, name)?.ok_or_else(|| {
        SacromonteError::ConfigError(format!("Missing required key [{}] {}", SECTION, name))
    })?;

    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(SacromonteError::ConfigError(format!(
            "Empty value for [{}] {}",
            SECTION, name
        )));
    }
    Ok(value)
}
