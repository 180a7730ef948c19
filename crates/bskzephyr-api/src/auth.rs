// Zephyr cloud authentication
//
// Email/password sign-in that yields the access token used as the raw
// `Authorization` header value on every other call.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use crate::client::{ZephyrClient, parse_json};
use crate::error::Error;
use crate::models::{SignInRequest, SignInResponse};

impl ZephyrClient {
    /// Sign in with the configured credentials and store the access token.
    ///
    /// `POST /auth/sign-in` with `{"email", "password"}`.
    ///
    /// - 200: the `accessToken` is stored and returned.
    /// - 403 / 500: a JSON body's `message` becomes [`Error::InvalidAuth`];
    ///   a non-JSON body becomes [`Error::Api`].
    /// - anything else: [`Error::Api`].
    ///
    /// The stored token only changes on success.
    pub async fn login(&self) -> Result<SecretString, Error> {
        let (Some(username), Some(password)) = (self.username(), self.password()) else {
            return Err(Error::invalid_auth("no username or password configured"));
        };

        let url = self.url("/auth/sign-in")?;
        debug!(%url, username, "signing in");

        let body = SignInRequest {
            email: username,
            password: password.expose_secret(),
        };

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        match status {
            StatusCode::OK => {
                let parsed: SignInResponse = Self::read_json(resp).await?;
                let token = SecretString::from(parsed.access_token);
                self.set_token(token.clone());
                debug!("sign-in successful");
                Ok(token)
            }
            StatusCode::FORBIDDEN | StatusCode::INTERNAL_SERVER_ERROR => {
                let text = resp.text().await.map_err(Error::Transport)?;
                let Ok(body) = parse_json::<Value>(&text) else {
                    debug!(%status, "sign-in rejected with a non-JSON body");
                    return Err(Error::api_status(status));
                };
                let message = body
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                debug!(%status, ?message, "sign-in rejected");
                Err(Error::InvalidAuth {
                    message,
                    source: None,
                })
            }
            _ => {
                debug!(%status, "unexpected sign-in status");
                Err(Error::api_status(status))
            }
        }
    }
}
