//! GTID (Global Transaction ID) 관리
//!
//! MariaDB GTID 형식: domain_id-server_id-sequence
//! (domain, server) 쌍마다 마지막으로 관측된 GTID를 추적: {"0-1": "0-1-42", "1-2": "1-2-7"}

use crate::error::{Result, SacromonteError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// 복제 원점 (domain_id, server_id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    pub domain_id: u32,
    pub server_id: u32,
}

impl PairKey {
    pub fn new(domain_id: u32, server_id: u32) -> Self {
        PairKey {
            domain_id,
            server_id,
        }
    }

    /// GTID 문자열에서 앞 두 요소를 파싱 (세 번째 이후 요소는 보지 않음)
    pub fn parse(gtid: &str) -> Result<Self> {
        let mut parts = gtid.split('-');

        let domain_id = parse_component(parts.next(), gtid, "domain_id")?;
        let server_id = parse_component(parts.next(), gtid, "server_id")?;

        Ok(PairKey::new(domain_id, server_id))
    }
}

fn parse_component(part: Option<&str>, gtid: &str, name: &str) -> Result<u32> {
    let part = part.ok_or_else(|| {
        SacromonteError::GtidError(format!("Missing {} in GTID: {}", name, gtid))
    })?;
    part.parse::<u32>()
        .map_err(|_| SacromonteError::GtidError(format!("Invalid {} in GTID: {}", name, gtid)))
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.domain_id, self.server_id)
    }
}

/// 쌍별 최신 GTID 맵
///
/// "최신"은 시퀀스 번호의 최댓값이 아니라 입력 순서상 마지막으로 나온 값이다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LatestGtidMap {
    pub gtids: BTreeMap<String, String>,
}

impl LatestGtidMap {
    pub fn new() -> Self {
        LatestGtidMap {
            gtids: BTreeMap::new(),
        }
    }

    /// GTID 목록을 순서대로 접어서 쌍별 마지막 값만 남긴다.
    /// 파싱 불가한 GTID는 경고 후 건너뛴다.
    pub fn from_gtids<I, S>(gtids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = LatestGtidMap::new();
        for gtid in gtids {
            if let Err(e) = map.observe(gtid.as_ref()) {
                warn!("Skipping malformed GTID: {}", e);
            }
        }
        map
    }

    /// GTID 하나 반영 (같은 쌍은 무조건 덮어씀)
    pub fn observe(&mut self, gtid: &str) -> Result<PairKey> {
        let key = PairKey::parse(gtid)?;
        self.gtids.insert(key.to_string(), gtid.to_string());
        Ok(key)
    }

    #[cfg(test)]
    pub(crate) fn get(&self, key: &PairKey) -> Option<&str> {
        self.gtids.get(&key.to_string()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.gtids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gtids.is_empty()
    }
}

impl fmt::Display for LatestGtidMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<&str> = self.gtids.values().map(String::as_str).collect();
        write!(f, "{}", values.join(","))
    }
}
