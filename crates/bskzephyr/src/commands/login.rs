//! Login command handler.

use secrecy::ExposeSecret;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::{self, Session};
use crate::error::CliError;
use crate::output;

pub async fn handle(session: &Session, args: &LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if !session.has_credentials() {
        return Err(CliError::NoCredentials {
            profile: session.profile.clone(),
        });
    }

    let client = session.client()?;
    let token = client
        .login()
        .await
        .map_err(|e| CliError::from_api(e, &session.profile))?;

    if args.save {
        config::keyring_set(&session.profile, "token", token.expose_secret())?;
        if !global.quiet {
            eprintln!("✓ Token for profile '{}' stored in system keyring", session.profile);
        }
        return Ok(());
    }

    output::print_output(token.expose_secret(), global.quiet);
    Ok(())
}
