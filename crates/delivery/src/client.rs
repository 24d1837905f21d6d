//! Inventory service client.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use coletor_protocol::SystemSnapshot;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const PREFER_MERGE: &str = "resolution=merge-duplicates";

/// How the agent authenticates against the inventory service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    /// `x-api-key` header against the application's collect endpoint.
    #[default]
    ApiKey,
    /// `apikey` plus bearer token against the PostgREST table endpoint.
    Supabase,
}

impl AuthScheme {
    /// Collection path under the service base URL.
    pub fn collect_path(&self) -> &'static str {
        match self {
            AuthScheme::ApiKey => "/api/collect",
            AuthScheme::Supabase => "/rest/v1/ativos",
        }
    }
}

/// Resolved service credentials, built once at startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Service base URL, without the collection path.
    pub endpoint: String,
    pub api_key: String,
    pub scheme: AuthScheme,
}

/// Delivery failures, split by where they happened.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("could not reach the inventory service: {0}")]
    Connect(reqwest::Error),

    #[error("inventory service did not answer in time")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    #[error("service rejected the snapshot ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid API key")]
    InvalidKey,
}

impl From<reqwest::Error> for DeliveryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DeliveryError::Timeout
        } else if e.is_connect() {
            DeliveryError::Connect(e)
        } else {
            DeliveryError::Transport(e)
        }
    }
}

/// What the service did with the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Row created (or merged server-side).
    Inserted,
    /// Duplicate serial resolved by update.
    Updated,
}

/// Inventory service client with the scheme's static auth headers.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    scheme: AuthScheme,
}

impl Client {
    pub fn new(credentials: &Credentials) -> Result<Self, DeliveryError> {
        Self::build(credentials, REQUEST_TIMEOUT)
    }

    fn build(credentials: &Credentials, timeout: Duration) -> Result<Self, DeliveryError> {
        let key = HeaderValue::from_str(&credentials.api_key)
            .map_err(|_| DeliveryError::InvalidKey)?;

        let mut headers = HeaderMap::new();
        match credentials.scheme {
            AuthScheme::ApiKey => {
                headers.insert("x-api-key", key);
            }
            AuthScheme::Supabase => {
                headers.insert("apikey", key);
                let bearer = HeaderValue::from_str(&format!("Bearer {}", credentials.api_key))
                    .map_err(|_| DeliveryError::InvalidKey)?;
                headers.insert(AUTHORIZATION, bearer);
            }
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: credentials.endpoint.trim_end_matches('/').to_string(),
            scheme: credentials.scheme,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_timeout(
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        Self::build(credentials, timeout)
    }

    /// Submits a snapshot: insert first, one PATCH keyed by serial on
    /// conflict. Never more than two requests.
    pub async fn send(&self, snapshot: &SystemSnapshot) -> Result<Outcome, DeliveryError> {
        let url = format!("{}{}", self.base_url, self.scheme.collect_path());

        let resp = self
            .http
            .post(&url)
            .header("Prefer", PREFER_MERGE)
            .json(snapshot)
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => {
                tracing::info!(serial = %snapshot.serial, "snapshot inserted");
                Ok(Outcome::Inserted)
            }
            StatusCode::CONFLICT => {
                tracing::debug!(serial = %snapshot.serial, "serial already registered, updating");
                self.update(&url, snapshot).await
            }
            status => Err(rejected(status, resp).await),
        }
    }

    /// Resolves a duplicate-serial conflict with a filtered PATCH. The
    /// `Prefer` upsert header is deliberately absent here.
    async fn update(&self, url: &str, snapshot: &SystemSnapshot) -> Result<Outcome, DeliveryError> {
        let resp = self
            .http
            .patch(url)
            .query(&[("serial", format!("eq.{}", snapshot.serial))])
            .json(snapshot)
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => {
                tracing::info!(serial = %snapshot.serial, "snapshot updated");
                Ok(Outcome::Updated)
            }
            status => Err(rejected(status, resp).await),
        }
    }
}

async fn rejected(status: StatusCode, resp: reqwest::Response) -> DeliveryError {
    let body = resp.text().await.unwrap_or_default();
    DeliveryError::Rejected {
        status: status.as_u16(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn snapshot() -> SystemSnapshot {
        SystemSnapshot {
            name: "LAB-PC-07".into(),
            asset_type: "Computador".into(),
            serial: "5CG1234XYZ".into(),
            status: "Em uso".into(),
            processor: "Intel(R) Core(TM) i5-10400 CPU @ 2.90GHz".into(),
            memory: "16.384 MB".into(),
            storage: "477 GB".into(),
            remote_access: None,
            operating_system: "Microsoft Windows 10 Pro 10.0.19045".into(),
            last_user: "maria.silva".into(),
            uptime: "3d 7h 42m".into(),
        }
    }

    fn credentials(url: &str, scheme: AuthScheme) -> Credentials {
        Credentials {
            endpoint: url.to_string(),
            api_key: "test-key".into(),
            scheme,
        }
    }

    /// Starts a mock HTTP server that answers each connection with the
    /// next scripted status/body and records the raw requests.
    async fn mock_server(
        script: Vec<(u16, &str)>,
    ) -> (String, Arc<Mutex<Vec<String>>>, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");
        let script: Vec<(u16, String)> =
            script.into_iter().map(|(s, b)| (s, b.to_string())).collect();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        let handle = tokio::spawn(async move {
            for (status, body) in script {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut stream).await;
                seen.lock().unwrap().push(request);

                let resp = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(resp.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (url, requests, handle)
    }

    /// Reads one full HTTP request (headers plus content-length body).
    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    data.extend_from_slice(&buf[..n]);
                    let text = String::from_utf8_lossy(&data);
                    if let Some(head_end) = text.find("\r\n\r\n") {
                        let expected = text
                            .lines()
                            .find_map(|l| {
                                let lower = l.to_ascii_lowercase();
                                let value = lower.strip_prefix("content-length:")?;
                                value.trim().parse::<usize>().ok()
                            })
                            .unwrap_or(0);
                        if data.len() >= head_end + 4 + expected {
                            break;
                        }
                    }
                }
            }
        }
        String::from_utf8_lossy(&data).to_string()
    }

    #[tokio::test]
    async fn send_created_is_single_insert() {
        let (url, requests, handle) = mock_server(vec![(201, "")]).await;

        let client = Client::new(&credentials(&url, AuthScheme::ApiKey)).unwrap();
        let outcome = client.send(&snapshot()).await.unwrap();

        assert_eq!(outcome, Outcome::Inserted);
        let reqs = requests.lock().unwrap();
        assert_eq!(reqs.len(), 1, "a clean insert is exactly one request");
        assert!(reqs[0].starts_with("POST /api/collect HTTP/1.1"), "{}", reqs[0]);
        assert!(reqs[0].contains("x-api-key: test-key"));
        assert!(reqs[0].contains("prefer: resolution=merge-duplicates"));
        assert!(reqs[0].contains("\"serial\":\"5CG1234XYZ\""));
        assert!(reqs[0].contains("\"acesso_remoto\":null"));

        handle.abort();
    }

    #[tokio::test]
    async fn send_ok_also_counts_as_inserted() {
        let (url, _requests, handle) = mock_server(vec![(200, "{}")]).await;

        let client = Client::new(&credentials(&url, AuthScheme::ApiKey)).unwrap();
        assert_eq!(client.send(&snapshot()).await.unwrap(), Outcome::Inserted);

        handle.abort();
    }

    #[tokio::test]
    async fn conflict_is_resolved_with_filtered_patch() {
        let (url, requests, handle) = mock_server(vec![(409, ""), (204, "")]).await;

        let client = Client::new(&credentials(&url, AuthScheme::ApiKey)).unwrap();
        let outcome = client.send(&snapshot()).await.unwrap();

        assert_eq!(outcome, Outcome::Updated);
        let reqs = requests.lock().unwrap();
        assert_eq!(reqs.len(), 2, "conflict resolution is exactly two requests");
        assert!(reqs[0].starts_with("POST /api/collect"));
        assert!(
            reqs[1].starts_with("PATCH /api/collect?serial=eq.5CG1234XYZ"),
            "{}",
            reqs[1]
        );
        assert!(reqs[1].contains("x-api-key: test-key"));
        assert!(
            !reqs[1].to_lowercase().contains("prefer:"),
            "update must not carry the upsert header"
        );

        handle.abort();
    }

    #[tokio::test]
    async fn rejected_insert_carries_status_and_body() {
        let (url, requests, handle) = mock_server(vec![(500, "boom")]).await;

        let client = Client::new(&credentials(&url, AuthScheme::ApiKey)).unwrap();
        let err = client.send(&snapshot()).await.unwrap_err();

        match err {
            DeliveryError::Rejected { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
        assert_eq!(requests.lock().unwrap().len(), 1);

        handle.abort();
    }

    #[tokio::test]
    async fn rejected_update_carries_status() {
        let (url, requests, handle) = mock_server(vec![(409, ""), (403, "denied")]).await;

        let client = Client::new(&credentials(&url, AuthScheme::ApiKey)).unwrap();
        let err = client.send(&snapshot()).await.unwrap_err();

        assert!(
            matches!(err, DeliveryError::Rejected { status: 403, .. }),
            "got {err:?}"
        );
        assert_eq!(requests.lock().unwrap().len(), 2);

        handle.abort();
    }

    #[tokio::test]
    async fn supabase_scheme_uses_table_endpoint_and_bearer() {
        let (url, requests, handle) = mock_server(vec![(201, "")]).await;

        let client = Client::new(&credentials(&url, AuthScheme::Supabase)).unwrap();
        client.send(&snapshot()).await.unwrap();

        let reqs = requests.lock().unwrap();
        assert!(reqs[0].starts_with("POST /rest/v1/ativos"), "{}", reqs[0]);
        assert!(reqs[0].contains("apikey: test-key"));
        assert!(reqs[0].contains("authorization: Bearer test-key"));

        handle.abort();
    }

    #[tokio::test]
    async fn unreachable_service_is_connect_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());
        drop(listener);

        let client = Client::new(&credentials(&url, AuthScheme::ApiKey)).unwrap();
        let err = client.send(&snapshot()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Connect(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn stalled_service_is_timeout_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());

        // Accept and read, then never answer.
        let handle = tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = vec![0u8; 16384];
                let _ = stream.read(&mut buf).await;
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
        });

        let client = Client::with_timeout(
            &credentials(&url, AuthScheme::ApiKey),
            Duration::from_millis(200),
        )
        .unwrap();
        let err = client.send(&snapshot()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Timeout), "got {err:?}");

        handle.abort();
    }

    #[tokio::test]
    async fn request_body_is_the_wire_snapshot() {
        let (url, requests, handle) = mock_server(vec![(201, "")]).await;

        let client = Client::new(&credentials(&url, AuthScheme::ApiKey)).unwrap();
        client.send(&snapshot()).await.unwrap();

        let reqs = requests.lock().unwrap();
        let body_start = reqs[0].find("\r\n\r\n").unwrap() + 4;
        let body: serde_json::Value = serde_json::from_str(&reqs[0][body_start..]).unwrap();
        assert_eq!(body["nome"], "LAB-PC-07");
        assert_eq!(body["memoria_ram"], "16.384 MB");
        assert!(body["acesso_remoto"].is_null());

        handle.abort();
    }

    #[test]
    fn collect_paths_per_scheme() {
        assert_eq!(AuthScheme::ApiKey.collect_path(), "/api/collect");
        assert_eq!(AuthScheme::Supabase.collect_path(), "/rest/v1/ativos");
    }

    #[test]
    fn trailing_slash_trimmed_from_endpoint() {
        let client = Client::new(&credentials("http://example.test/", AuthScheme::ApiKey)).unwrap();
        assert_eq!(client.base_url, "http://example.test");
    }
}
