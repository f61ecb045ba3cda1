//! Command dispatch: bridges CLI args -> view controllers -> output formatting.

pub mod auth;
pub mod clients;
pub mod config_cmd;
pub mod dashboard;
pub mod payments;
pub mod users;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::config::Connection;
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    conn: &Connection,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(conn, args, global).await,
        Command::Logout => auth::logout(conn, global),
        Command::Whoami => auth::whoami(conn, global),
        Command::Dashboard => dashboard::handle(conn, global).await,
        Command::Users(args) => users::handle(conn, args, global).await,
        Command::Clients(args) => clients::handle(conn, args, global).await,
        Command::Payments(args) => payments::handle(conn, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
