//! Shared helpers for command handlers.

use std::io::IsTerminal;

use tokio::sync::broadcast;

use crmdesk_core::{Notification, Notifier, RecordId, ViewController, ViewResource};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// A fresh notifier plus a receiver subscribed before any view call.
pub fn notifier() -> (Notifier, broadcast::Receiver<Notification>) {
    let notifier = Notifier::new();
    let rx = notifier.subscribe();
    (notifier, rx)
}

/// Print every notification published so far.
pub fn flush_notifications(rx: &mut broadcast::Receiver<Notification>, global: &GlobalOpts) {
    while let Ok(note) = rx.try_recv() {
        output::print_notification(&note, global);
    }
}

/// Records matching `term`, or the whole list when no term was given.
pub async fn search<R: ViewResource>(
    view: &ViewController<R>,
    term: Option<&str>,
) -> Vec<R::Record> {
    match term {
        Some(term) => view.search(term).await,
        None => view.visible().await,
    }
}

/// Two-step delete: request the intent, confirm with the user, then
/// either send the delete or drop the intent.
pub async fn delete_record<R: ViewResource>(
    view: &ViewController<R>,
    id: RecordId,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    view.load().await?;
    let intent = view.request_delete(id).await?;

    if confirm(&format!("Delete {} {id}?", R::NAME), global.yes)? {
        view.confirm_delete(&intent).await?;
    } else {
        view.cancel_delete().await;
        output::print_status("Aborted; nothing was deleted.", global);
    }
    Ok(())
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.trim_end_matches('?').to_lowercase(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Read a password without echo, refusing an empty one.
pub fn prompt_password(prompt: &str) -> Result<String, CliError> {
    let password = rpassword::prompt_password(prompt).map_err(prompt_err)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(password)
}

/// `YYYY-MM-DD` part of a server timestamp, for table cells.
pub fn short_date(timestamp: &str) -> String {
    crmdesk_core::date_part(timestamp).to_owned()
}
