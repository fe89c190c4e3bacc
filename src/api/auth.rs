//! OAuth2 client-credentials token exchange.
//!
//! Amadeus bearer tokens are short-lived and this client does not track
//! expiry: every API call fetches a fresh token first.

use serde::Deserialize;

use super::{ApiClient, ApiError};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

impl ApiClient {
    /// Exchange the configured credentials for a bearer token.
    ///
    /// Fails with `ApiError::Auth` if the token endpoint responds non-2xx or
    /// the body has no `access_token` field.
    pub async fn get_access_token(&self) -> Result<String, ApiError> {
        let url = format!("{}/v1/security/oauth2/token", self.base_url());
        let (client_id, client_secret) = self.credentials();

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];

        let resp = self
            .http()
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| ApiError::Auth(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ApiError::Auth(format!(
                "token endpoint returned {}",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Auth(e.to_string()))?;
        parse_token_body(&body)
    }
}

/// Pull `access_token` out of a token endpoint response body
fn parse_token_body(body: &str) -> Result<String, ApiError> {
    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::Auth(format!("malformed token response: {}", e)))?;

    parsed
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Auth("token response missing access_token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_body() {
        let body = r#"{"type":"amadeusOAuth2Token","access_token":"abc123","expires_in":1799}"#;
        assert_eq!(parse_token_body(body).unwrap(), "abc123");
    }

    #[test]
    fn test_parse_token_body_missing_field() {
        let body = r#"{"error":"invalid_client"}"#;
        assert!(matches!(parse_token_body(body), Err(ApiError::Auth(_))));
    }

    #[test]
    fn test_parse_token_body_not_json() {
        assert!(matches!(
            parse_token_body("<html>gateway timeout</html>"),
            Err(ApiError::Auth(_))
        ));
    }

    #[test]
    fn test_parse_token_body_empty_token() {
        let body = r#"{"access_token":""}"#;
        assert!(matches!(parse_token_body(body), Err(ApiError::Auth(_))));
    }
}
