//! Grizzly API payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Form body of `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginForm<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Body of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// What the API said about a section submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    /// Number of sections sent.
    pub submitted: usize,
    /// Response body, `null` when the API sent none.
    pub response: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_aliases() {
        let plain: LoginResponse = serde_json::from_str(r#"{"token":"abc"}"#).unwrap();
        assert_eq!(plain.token, "abc");

        let oauth: LoginResponse =
            serde_json::from_str(r#"{"access_token":"xyz","token_type":"bearer"}"#).unwrap();
        assert_eq!(oauth.token, "xyz");
        assert_eq!(oauth.token_type.as_deref(), Some("bearer"));
    }

    #[test]
    fn test_login_response_requires_token() {
        assert!(serde_json::from_str::<LoginResponse>(r#"{"detail":"ok"}"#).is_err());
    }
}
