//! HTTP 서버
//!
//! GET 요청마다 (경로 무관) 새로 스캔하고 항상 200 + JSON 으로 응답한다.

use crate::extractor::LogTextExtractor;
use crate::report::ScanResult;
use crate::scanner::BackwardScanner;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// 라우터 생성. 모든 경로에서 GET 만 허용 (그 외 메서드는 405).
pub fn router<E: LogTextExtractor + 'static>(scanner: Arc<BackwardScanner<E>>) -> Router {
    Router::new()
        .route("/", get(latest_gtid_status::<E>))
        .route("/*path", get(latest_gtid_status::<E>))
        .layer(TraceLayer::new_for_http())
        .with_state(scanner)
}

/// 최신 GTID 상태 조회
async fn latest_gtid_status<E: LogTextExtractor + 'static>(
    State(scanner): State<Arc<BackwardScanner<E>>>,
) -> impl IntoResponse {
    let result: ScanResult = scanner.scan().await;
    (StatusCode::OK, Json(result))
}

/// 서버 시작
pub async fn serve<E: LogTextExtractor + 'static>(
    addr: SocketAddr,
    scanner: Arc<BackwardScanner<E>>,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(scanner)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::Result;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use std::path::Path;
    use tower::ServiceExt;

    /// 모든 파일에 같은 GTID 를 돌려주는 추출기
    struct FixedExtractor(&'static str);

    #[async_trait]
    impl LogTextExtractor for FixedExtractor {
        async fn extract(&self, _binlog: &Path) -> Result<Vec<String>> {
            Ok(vec![format!("end_log_pos 298 GTID {} trans", self.0)])
        }
    }

    fn test_router(dir: &Path) -> Router {
        let index = "mysql-bin.000001\nmysql-bin.000002\n";
        std::fs::write(dir.join("mysql-bin.index"), index).unwrap();
        let config = AppConfig::new(dir, "mysql-bin", "mysqlbinlog");
        router(Arc::new(BackwardScanner::new(&config, FixedExtractor("0-1-42"))))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_get_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let (status, json) = get_json(test_router(dir.path()), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["metadata"]["latest_binlog_in_index"],
            dir.path().join("mysql-bin.000002").display().to_string()
        );
        assert_eq!(
            json["metadata"]["latest_binlog_scanned"],
            dir.path().join("mysql-bin.000002").display().to_string()
        );
        assert_eq!(json["gtids"], serde_json::json!({"0-1": "0-1-42"}));
    }

    #[tokio::test]
    async fn test_any_path_is_served() {
        let dir = tempfile::TempDir::new().unwrap();
        let (status, json) = get_json(test_router(dir.path()), "/status/gtid").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["gtids"]["0-1"], "0-1-42");
    }

    #[tokio::test]
    async fn test_missing_index_still_200() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = test_router(dir.path());
        std::fs::remove_file(dir.path().join("mysql-bin.index")).unwrap();

        let (status, json) = get_json(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["metadata"]["latest_binlog_in_index"], "N/A");
        assert_eq!(json["gtids"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_post_not_allowed() {
        let dir = tempfile::TempDir::new().unwrap();
        let response = test_router(dir.path())
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
