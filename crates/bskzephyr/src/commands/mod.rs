//! Command dispatch: bridges CLI args -> API client calls -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod login;

use secrecy::SecretString;
use tracing::debug;

use bskzephyr_api::ZephyrClient;

use crate::cli::{Command, GlobalOpts};
use crate::config::{self, Session};
use crate::error::CliError;

/// Dispatch a cloud-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => login::handle(session, &args, global).await,
        Command::Devices(args) => devices::handle(session, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

/// Build a client that holds an access token.
///
/// Token sources, in order: `--token` / `ZEPHYR_TOKEN`, the keyring entry
/// saved by `zephyr login --save`, then a fresh sign-in.
pub async fn authenticated_client(
    session: &Session,
    global: &GlobalOpts,
) -> Result<ZephyrClient, CliError> {
    let client = session.client()?;

    if let Some(ref token) = global.token {
        debug!("using token from flag/env");
        return Ok(client.with_token(SecretString::from(token.clone())));
    }

    if let Some(token) = config::keyring_get(&session.profile, "token") {
        debug!(profile = %session.profile, "using token from keyring");
        return Ok(client.with_token(SecretString::from(token)));
    }

    if !session.has_credentials() {
        return Err(CliError::NoCredentials {
            profile: session.profile.clone(),
        });
    }

    client
        .login()
        .await
        .map_err(|e| CliError::from_api(e, &session.profile))?;
    Ok(client)
}
