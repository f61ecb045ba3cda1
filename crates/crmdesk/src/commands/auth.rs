//! Login, logout, and whoami.

use dialoguer::Input;
use secrecy::SecretString;

use crmdesk_core::LoginRequest;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::Connection;
use crate::error::CliError;
use crate::output;

use super::{users, util};

pub async fn login(
    conn: &Connection,
    args: LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let email = match args.email.or_else(|| conn.profile.email.clone()) {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(util::prompt_err)?,
    };
    let password = match args.password {
        Some(password) => password,
        None => util::prompt_password("Password: ")?,
    };

    let credentials = LoginRequest::new(email, SecretString::from(password));
    let response = conn.api.login(&credentials).await?;

    output::print_status(
        &format!(
            "Logged in as {} ({}) on profile '{}'",
            response.user.name, response.user.role, conn.profile_name
        ),
        global,
    );
    Ok(())
}

pub fn logout(conn: &Connection, global: &GlobalOpts) -> Result<(), CliError> {
    conn.api.logout()?;
    output::print_status(
        &format!("Logged out of profile '{}'", conn.profile_name),
        global,
    );
    Ok(())
}

pub fn whoami(conn: &Connection, global: &GlobalOpts) -> Result<(), CliError> {
    conn.require_login()?;
    let Some(user) = conn.api.session().user() else {
        return Err(CliError::Session {
            message: "a token is stored but the account is unknown; log in again".into(),
        });
    };
    let out = output::render_single(global.output(), &user, users::detail, |u| u.email.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
