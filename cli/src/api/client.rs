//! HTTP client for the Grizzly API.
//!
//! Requests are made one at a time with no retry: any non-2xx response is
//! returned as an error and ends the run.

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use super::types::{LoginForm, LoginResponse, SubmissionReceipt};
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::logs::{log_info, log_success};
use crate::models::{ConsolidatedRecord, CourseRow};

/// Grizzly API client.
///
/// Holds the bearer token after [`GrizzlyClient::login`].
#[derive(Debug, Clone)]
pub struct GrizzlyClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl GrizzlyClient {
    /// Build a client for `base_url`. With `verify_ssl` off, invalid
    /// certificates are accepted.
    pub fn new(base_url: impl Into<String>, verify_ssl: bool) -> ApiResult<Self> {
        let http = Client::builder()
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .map_err(ApiError::Client)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    /// Build a client from the run configuration.
    pub fn from_config(config: &Config, verify_ssl: bool) -> ApiResult<Self> {
        Self::new(config.api_url.clone(), verify_ssl)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token(&self) -> ApiResult<&str> {
        self.token.as_deref().ok_or(ApiError::NotAuthenticated)
    }

    /// Log in with form credentials and keep the returned token.
    pub async fn login(&mut self, username: &str, password: &str) -> ApiResult<()> {
        let url = self.url("/login");
        log_info(format!("Logging in to {} as {}", self.base_url, username));

        let response = self
            .http
            .post(&url)
            .form(&LoginForm { username, password })
            .send()
            .await
            .map_err(|e| ApiError::Http {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        let body = read_body(response, &url).await?;
        if !status.is_success() {
            return Err(ApiError::Authentication { status, body });
        }

        let login: LoginResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("login: {}", e)))?;
        self.token = Some(login.token);
        log_success("Logged in to API");
        Ok(())
    }

    /// `GET /d/users`.
    pub async fn users(&self) -> ApiResult<Value> {
        let url = self.url("/d/users");
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.token()?)
            .send()
            .await
            .map_err(|e| ApiError::Http {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        let body = read_body(response, &url).await?;
        if !status.is_success() {
            return Err(ApiError::Request { url, status, body });
        }
        serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(format!("users: {}", e)))
    }

    /// `POST /d/sections` with the consolidated rows as a JSON array.
    pub async fn submit_sections(
        &self,
        records: &[ConsolidatedRecord],
    ) -> ApiResult<SubmissionReceipt> {
        let url = self.url("/d/sections");
        let rows: Vec<&CourseRow> = records.iter().map(|r| &r.row).collect();
        log_info(format!("Submitting {} sections to {}", rows.len(), url));

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.token()?)
            .json(&rows)
            .send()
            .await
            .map_err(|e| ApiError::Http {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        let body = read_body(response, &url).await?;
        if !status.is_success() {
            return Err(ApiError::Submission { status, body });
        }

        log_success(format!("API accepted {} sections ({})", rows.len(), status_text(status)));
        Ok(SubmissionReceipt {
            submitted: rows.len(),
            response: parse_lenient(&body),
        })
    }
}

async fn read_body(response: Response, url: &str) -> ApiResult<String> {
    response.text().await.map_err(|e| ApiError::Http {
        url: url.to_string(),
        source: e,
    })
}

/// JSON if it parses, the raw text otherwise, `null` when empty.
fn parse_lenient(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Form,
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer abc")
    }

    async fn login(Form(form): Form<HashMap<String, String>>) -> (AxumStatus, Json<Value>) {
        match (form.get("username"), form.get("password")) {
            (Some(u), Some(p)) if u == "registrar" && p == "secret" => {
                (AxumStatus::OK, Json(json!({ "token": "abc" })))
            }
            _ => (
                AxumStatus::UNAUTHORIZED,
                Json(json!({ "detail": "bad credentials" })),
            ),
        }
    }

    async fn users(headers: HeaderMap) -> (AxumStatus, Json<Value>) {
        if authorized(&headers) {
            (AxumStatus::OK, Json(json!([{ "username": "registrar" }])))
        } else {
            (AxumStatus::UNAUTHORIZED, Json(json!({ "detail": "no token" })))
        }
    }

    async fn sections(headers: HeaderMap, Json(rows): Json<Vec<Value>>) -> (AxumStatus, Json<Value>) {
        if !authorized(&headers) {
            return (AxumStatus::UNAUTHORIZED, Json(json!({ "detail": "no token" })));
        }
        let ids: Vec<Value> = rows.iter().map(|r| r["cf_course_id"].clone()).collect();
        (AxumStatus::CREATED, Json(json!({ "created": ids })))
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn fake_api() -> String {
        serve(
            Router::new()
                .route("/login", post(login))
                .route("/d/users", get(users))
                .route("/d/sections", post(sections)),
        )
        .await
    }

    fn section(class_number: &str) -> ConsolidatedRecord {
        ConsolidatedRecord {
            line: 2,
            row: CourseRow {
                class_number: class_number.into(),
                instructor: "Smith/Jones".into(),
                ..CourseRow::default()
            },
        }
    }

    #[tokio::test]
    async fn test_login_and_list_users() {
        let base = fake_api().await;
        let mut client = GrizzlyClient::new(format!("{base}/"), true).unwrap();
        assert_eq!(client.base_url(), base);

        client.login("registrar", "secret").await.unwrap();
        assert!(client.is_authenticated());

        let users = client.users().await.unwrap();
        assert_eq!(users[0]["username"], "registrar");
    }

    #[tokio::test]
    async fn test_rejected_login() {
        let base = fake_api().await;
        let mut client = GrizzlyClient::new(base, true).unwrap();

        match client.login("registrar", "wrong").await {
            Err(ApiError::Authentication { status, body }) => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert!(body.contains("bad credentials"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_calls_require_login() {
        let base = fake_api().await;
        let client = GrizzlyClient::new(base, true).unwrap();

        assert!(matches!(client.users().await, Err(ApiError::NotAuthenticated)));
        assert!(matches!(
            client.submit_sections(&[section("100")]).await,
            Err(ApiError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_submit_sections() {
        let base = fake_api().await;
        let mut client = GrizzlyClient::new(base, true).unwrap();
        client.login("registrar", "secret").await.unwrap();

        let receipt = client
            .submit_sections(&[section("100"), section("200")])
            .await
            .unwrap();
        assert_eq!(receipt.submitted, 2);
        assert_eq!(receipt.response["created"], json!(["100", "200"]));
    }

    #[tokio::test]
    async fn test_rejected_submission() {
        async fn failing() -> (AxumStatus, &'static str) {
            (AxumStatus::INTERNAL_SERVER_ERROR, "ingestion failed")
        }
        let base = serve(
            Router::new()
                .route("/login", post(login))
                .route("/d/sections", post(failing)),
        )
        .await;
        let mut client = GrizzlyClient::new(base, true).unwrap();
        client.login("registrar", "secret").await.unwrap();

        match client.submit_sections(&[section("100")]).await {
            Err(ApiError::Submission { status, body }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "ingestion failed");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_api() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut client = GrizzlyClient::new(format!("http://{addr}"), true).unwrap();
        assert!(matches!(
            client.login("registrar", "secret").await,
            Err(ApiError::Http { .. })
        ));
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(parse_lenient(""), Value::Null);
        assert_eq!(parse_lenient("{\"ok\":true}"), json!({ "ok": true }));
        assert_eq!(parse_lenient("accepted"), json!("accepted"));
    }
}
