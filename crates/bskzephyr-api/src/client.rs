// Zephyr cloud HTTP client
//
// Wraps a caller-owned `reqwest::Client` with the cloud's base URL, the
// in-memory access token, and the per-client speed table. Endpoint
// methods live in `auth.rs` and `devices.rs` as inherent impls.

use std::sync::{PoisonError, RwLock};

use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::FanSpeed;
use crate::speed::SpeedTable;
use crate::transport::TransportConfig;

/// Production endpoint of the BSK Zephyr cloud.
pub const DEFAULT_BASE_URL: &str = "https://connect.bskhvac.com.tr";

/// Async client for the BSK Zephyr cloud API.
///
/// Holds no connection state of its own: requests go through the
/// `reqwest::Client` handed in at construction, which stays owned by the
/// caller. The access token is only ever kept in memory.
pub struct ZephyrClient {
    http: reqwest::Client,
    base_url: Url,
    username: Option<String>,
    password: Option<SecretString>,
    token: RwLock<Option<SecretString>>,
    speeds: RwLock<SpeedTable>,
}

impl std::fmt::Debug for ZephyrClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZephyrClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("has_token", &self.token().is_some())
            .field("speeds", &self.speeds())
            .finish_non_exhaustive()
    }
}

impl ZephyrClient {
    /// Create a client on top of a shared `reqwest::Client`.
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("invalid default base URL"),
            username: None,
            password: None,
            token: RwLock::new(None),
            speeds: RwLock::new(SpeedTable::default()),
        }
    }

    /// Create a client with its own `reqwest::Client` built from `transport`.
    pub fn from_transport(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::new(transport.build_client()?))
    }

    /// Sign-in credentials used by [`login`](Self::login).
    pub fn with_credentials(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.username = Some(username.into());
        self.password = Some(password);
        self
    }

    /// Start from a token obtained earlier instead of logging in.
    pub fn with_token(self, token: SecretString) -> Self {
        self.set_token(token);
        self
    }

    /// Use a firmware-specific speed table instead of the default.
    pub fn with_speeds(self, speeds: SpeedTable) -> Self {
        *self.speeds.write().unwrap_or_else(PoisonError::into_inner) = speeds;
        self
    }

    /// Point the client at another host (staging, a local mock).
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub(crate) fn password(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }

    /// The current access token, if logged in.
    pub fn token(&self) -> Option<SecretString> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_token(&self, token: SecretString) {
        debug!("storing access token");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// A copy of the current speed table.
    pub fn speeds(&self) -> SpeedTable {
        *self.speeds.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Override the raw code of one preset for this client only.
    pub fn set_speed(&self, preset: FanSpeed, code: u16) {
        self.speeds
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set(preset, code);
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/{path}`, keeping any path prefix on the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Attach the stored token as the raw `Authorization` header value.
    ///
    /// Fails without touching the network when no token is stored; the
    /// client never logs in on its own.
    pub(crate) fn authorize(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, Error> {
        let token = self
            .token()
            .ok_or_else(|| Error::invalid_auth("not logged in: no access token"))?;
        Ok(builder.header(AUTHORIZATION, token.expose_secret()))
    }

    /// Read a response body as JSON, keeping the raw text on failure.
    pub(crate) async fn read_json<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let body = resp.text().await.map_err(Error::Transport)?;
        parse_json(&body)
    }
}

pub(crate) fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}

pub(crate) fn from_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, Error> {
    let body = value.to_string();
    serde_json::from_value(value).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_production_host() {
        let client = ZephyrClient::new(reqwest::Client::new());
        assert_eq!(client.base_url().as_str(), "https://connect.bskhvac.com.tr/");
        assert_eq!(
            client.url("/device-user").expect("valid").as_str(),
            "https://connect.bskhvac.com.tr/device-user"
        );
        assert!(client.token().is_none());
    }

    #[test]
    fn base_url_path_prefix_is_kept() {
        for base in ["https://proxy.example/zephyr/", "https://proxy.example/zephyr"] {
            let client = ZephyrClient::new(reqwest::Client::new())
                .with_base_url(Url::parse(base).expect("valid"));
            assert_eq!(
                client.url("/device-user").expect("valid").as_str(),
                "https://proxy.example/zephyr/device-user"
            );
        }
    }

    #[test]
    fn token_can_be_set_and_cleared() {
        let client =
            ZephyrClient::new(reqwest::Client::new()).with_token(SecretString::from("t0k".to_owned()));
        assert_eq!(
            client.token().map(|t| t.expose_secret().to_owned()),
            Some("t0k".to_owned())
        );
        client.clear_token();
        assert!(client.token().is_none());
    }

    #[test]
    fn speed_overrides_stay_per_client() {
        let a = ZephyrClient::new(reqwest::Client::new());
        let b = ZephyrClient::new(reqwest::Client::new());
        a.set_speed(FanSpeed::Low, 35);
        assert_eq!(a.speeds().code(FanSpeed::Low), 35);
        assert_eq!(b.speeds().code(FanSpeed::Low), 30);
    }

    #[test]
    fn debug_output_hides_secrets() {
        let client = ZephyrClient::new(reqwest::Client::new())
            .with_credentials("me@example.com", SecretString::from("hunter2".to_owned()))
            .with_token(SecretString::from("secret-token".to_owned()));
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("has_token: true"));
    }

    #[test]
    fn parse_json_keeps_body() {
        let err = parse_json::<serde_json::Value>("<html>").expect_err("not json");
        match err {
            Error::Deserialization { body, .. } => assert_eq!(body, "<html>"),
            other => panic!("expected Deserialization, got: {other:?}"),
        }
    }
}
