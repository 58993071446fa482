//! mysqlbinlog 텍스트 출력에서 GTID 토큰 추출
//!
//! 이벤트 헤더 예:
//! `#230514 10:12:01 server id 1  end_log_pos 385 CRC32 0x4c1a2b3f 	GTID 0-1-42 trans`

/// GTID 라인 표식
pub const GTID_MARKER: &str = "GTID";

/// 이벤트 헤더 라인 표식
pub const EVENT_HEADER_MARKER: &str = "end_log_pos";

/// 라인 하나에서 GTID 토큰 추출
///
/// 첫 번째 `GTID` 뒤의 나머지를 trim 하고 첫 토큰을 취한다.
/// `GTID` 가 없거나 뒤에 토큰이 없으면 `None`.
pub fn extract_gtid(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once(GTID_MARKER)?;
    rest.split_whitespace().next()
}

/// GTID 파서
#[derive(Debug, Clone, Copy, Default)]
pub struct GtidParser {
    event_headers_only: bool,
}

impl GtidParser {
    pub fn new(event_headers_only: bool) -> Self {
        GtidParser { event_headers_only }
    }

    /// 라인 하나 파싱
    pub fn parse_line<'a>(&self, line: &'a str) -> Option<&'a str> {
        if self.event_headers_only && !line.contains(EVENT_HEADER_MARKER) {
            return None;
        }
        extract_gtid(line)
    }

    /// 한 파일의 출력 라인들에서 GTID 목록을 지연 추출 (원본 순서 유지)
    ///
    /// 반환되는 토큰은 파서가 아니라 입력 라인을 빌린다.
    pub fn parse<'a, I, S>(&self, lines: I) -> impl Iterator<Item = &'a str> + 'a
    where
        I: IntoIterator<Item = &'a S>,
        I::IntoIter: 'a,
        S: AsRef<str> + ?Sized + 'a,
    {
        let parser = *self;
        lines
            .into_iter()
            .filter_map(move |line| parser.parse_line(line.as_ref()))
    }
}
