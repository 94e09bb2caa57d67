use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use inboxmetrics::config::ApiConfig;
use inboxmetrics::dashboard::{
    Aggregator, DataSourceClient, HttpDataSourceClient, OutcomeStatus, SourceError, SourceId,
    SourcePayload,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const STATS_BODY: &str = r#"{
    "total_emails_24h": 8,
    "processed_emails": 5,
    "pending_emails": 3,
    "urgent_emails": 2,
    "sentiment_breakdown": {"positive": 4, "negative": 1, "neutral": 3},
    "priority_breakdown": {"urgent": 2, "not_urgent": 6},
    "hourly_stats": [
        {"hour": "2025-01-15 09:00", "count": 3},
        {"hour": "2025-01-15 10:00", "count": 5}
    ]
}"#;

const RECENT_BODY: &str = r#"[
    {"id": 1, "sender_email": "alice@example.com", "subject": "Refund request",
     "priority": "urgent", "sentiment": "negative", "processed": false,
     "received_at": "2025-01-15T10:12:31.482910", "category": "billing"},
    {"id": 2, "sender_email": "bob@example.com", "subject": "Thanks!",
     "priority": "not_urgent", "sentiment": "positive", "processed": true,
     "received_at": "2025-01-15T08:01:00", "category": null}
]"#;

const RESPONSE_BODY: &str = r#"{
    "total_emails": 8,
    "emails_with_responses": 6,
    "responses_sent": 5,
    "response_rate": 62.5,
    "avg_response_time_hours": 1.75
}"#;

#[derive(Clone)]
enum Route {
    Json(u16, &'static str),
    Hang,
}

/// Minimal HTTP/1.1 server answering canned routes, one request per connection
struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    async fn start(routes: Vec<(&'static str, Route)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Arc<HashMap<&'static str, Route>> = Arc::new(routes.into_iter().collect());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else { break };
                let routes = Arc::clone(&routes);
                let seen = Arc::clone(&seen);

                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }

                    let head = String::from_utf8_lossy(&buf).to_string();
                    let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    seen.lock().unwrap().push(target.clone());

                    let path = target.split('?').next().unwrap_or("/");
                    let (status, body) = match routes.get(path).cloned() {
                        Some(Route::Json(status, body)) => (status, body),
                        Some(Route::Hang) => {
                            tokio::time::sleep(Duration::from_secs(30)).await;
                            return;
                        }
                        None => (404, r#"{"detail": "Not Found"}"#),
                    };

                    let response = format!(
                        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        StubServer { addr, requests }
    }

    fn config(&self) -> ApiConfig {
        ApiConfig {
            base_url: format!("http://{}", self.addr),
            timeout_secs: 2,
            recent_limit: 5,
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn healthy_routes() -> Vec<(&'static str, Route)> {
    vec![
        ("/api/dashboard/stats", Route::Json(200, STATS_BODY)),
        ("/api/dashboard/recent-emails", Route::Json(200, RECENT_BODY)),
        ("/api/dashboard/response-stats", Route::Json(200, RESPONSE_BODY)),
    ]
}

#[tokio::test]
async fn test_fetch_each_source() {
    let server = StubServer::start(healthy_routes()).await;
    let client = HttpDataSourceClient::new(&server.config()).unwrap();

    let stats = client.fetch(SourceId::EmailStats).await;
    match stats.payload() {
        Some(SourcePayload::EmailStats(stats)) => {
            assert_eq!(stats.total_emails_24h, 8);
            assert_eq!(stats.hourly_stats.len(), 2);
        }
        other => panic!("unexpected payload: {:?}", other),
    }

    let recent = client.fetch(SourceId::RecentEmails).await;
    match recent.payload() {
        Some(SourcePayload::RecentEmails(emails)) => {
            assert_eq!(emails.len(), 2);
            assert_eq!(emails[0].sender_email, "alice@example.com");
            assert!(emails[1].processed);
        }
        other => panic!("unexpected payload: {:?}", other),
    }

    let response = client.fetch(SourceId::ResponseStats).await;
    match response.payload() {
        Some(SourcePayload::ResponseStats(stats)) => assert_eq!(stats.response_rate, 62.5),
        other => panic!("unexpected payload: {:?}", other),
    }

    assert!(server
        .requests()
        .contains(&"/api/dashboard/recent-emails?limit=5".to_string()));
}

#[tokio::test]
async fn test_server_error_keeps_status_code() {
    let mut routes = healthy_routes();
    routes[2] = (
        "/api/dashboard/response-stats",
        Route::Json(500, r#"{"detail": "database is locked"}"#),
    );
    let server = StubServer::start(routes).await;
    let client = HttpDataSourceClient::new(&server.config()).unwrap();

    let result = client.fetch(SourceId::ResponseStats).await;
    assert!(!result.is_success());
    assert_eq!(result.status_code(), Some(500));
    assert_eq!(
        result.error_message().as_deref(),
        Some("server error (HTTP 500): database is locked")
    );
}

#[tokio::test]
async fn test_missing_sentiment_breakdown_is_malformed() {
    let mut routes = healthy_routes();
    routes[0] = (
        "/api/dashboard/stats",
        Route::Json(
            200,
            r#"{"total_emails_24h": 1, "processed_emails": 0, "pending_emails": 1, "urgent_emails": 0,
                "priority_breakdown": {"urgent": 0, "not_urgent": 1}, "hourly_stats": []}"#,
        ),
    );
    let server = StubServer::start(routes).await;
    let aggregator = Aggregator::new(
        HttpDataSourceClient::new(&server.config()).unwrap(),
        Duration::from_secs(2),
    );

    let result = aggregator.aggregate().await;

    assert_eq!(result.overall_status(), OutcomeStatus::PartialFailure);
    let stats = result.result(SourceId::EmailStats);
    assert!(matches!(stats.error(), Some(SourceError::Malformed { .. })));
    assert_eq!(stats.status_code(), Some(200));
    assert_eq!(result.data().recent_emails.len(), 2);
}

#[tokio::test]
async fn test_unreachable_backend_is_total_failure() {
    // bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ApiConfig {
        base_url: format!("http://{}", addr),
        timeout_secs: 2,
        recent_limit: 5,
    };
    let aggregator = Aggregator::new(HttpDataSourceClient::new(&config).unwrap(), config.timeout());

    let result = aggregator.aggregate().await;

    assert_eq!(result.overall_status(), OutcomeStatus::TotalFailure);
    for source in SourceId::ALL {
        let source_result = result.result(source);
        assert!(matches!(source_result.error(), Some(SourceError::Network { .. })));
        assert_eq!(source_result.status_code(), None);
    }
}

#[tokio::test]
async fn test_slow_source_times_out() {
    let mut routes = healthy_routes();
    routes[1] = ("/api/dashboard/recent-emails", Route::Hang);
    let server = StubServer::start(routes).await;

    let mut config = server.config();
    config.timeout_secs = 1;
    let aggregator = Aggregator::new(HttpDataSourceClient::new(&config).unwrap(), config.timeout());

    let result = aggregator.aggregate().await;

    assert_eq!(result.overall_status(), OutcomeStatus::PartialFailure);
    let recent = result.result(SourceId::RecentEmails);
    assert!(matches!(recent.error(), Some(SourceError::Network { .. })));
    assert!(recent.error_message().unwrap().contains("timed out"));
    assert!(result.data().recent_emails.is_empty());
}

#[tokio::test]
async fn test_snapshot_serializes_to_json() {
    let server = StubServer::start(healthy_routes()).await;
    let aggregator = Aggregator::new(
        HttpDataSourceClient::new(&server.config()).unwrap(),
        Duration::from_secs(2),
    );

    let result = aggregator.aggregate().await;
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["overall_status"], "FullSuccess");
    assert_eq!(json["results"]["EmailStats"]["success"], true);
    assert_eq!(json["results"]["EmailStats"]["error_message"], serde_json::Value::Null);
    assert_eq!(json["data"]["email_stats"]["sentiment_breakdown"]["positive"], 4);
}
