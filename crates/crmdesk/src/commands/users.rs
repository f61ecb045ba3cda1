//! User command handlers (administrators only).

use secrecy::SecretString;
use tabled::Tabled;

use crmdesk_core::{CoreError, User, UserView};

use crate::cli::{GlobalOpts, UsersArgs, UsersCommand};
use crate::config::Connection;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: u64,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            phone: u.phone,
            role: u.role.to_string(),
            created: util::short_date(&u.create_date),
        }
    }
}

pub(crate) fn detail(u: &User) -> String {
    [
        format!("ID:        {}", u.id),
        format!("Name:      {}", u.name),
        format!("Email:     {}", u.email),
        format!("Phone:     {}", u.phone),
        format!("Role:      {}", u.role),
        format!("Created:   {}", u.create_date),
    ]
    .join("\n")
}

fn print_user(user: &User, global: &GlobalOpts) {
    let out = output::render_single(global.output(), user, detail, |u| u.id.to_string());
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    conn: &Connection,
    args: UsersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    conn.require_login()?;
    let (notifier, mut rx) = util::notifier();
    let view = UserView::new(&conn.api, notifier);

    let result = run(&view, args.command, global).await;
    util::flush_notifications(&mut rx, global);
    result
}

async fn run(view: &UserView, command: UsersCommand, global: &GlobalOpts) -> Result<(), CliError> {
    match command {
        UsersCommand::List(list) => {
            view.load().await?;
            let users = util::search(view, list.search.as_deref()).await;
            let out = output::render_list(global.output(), &users, |u| UserRow::from(u), |u| {
                u.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Get { id } => {
            view.load().await?;
            let user = view
                .records()
                .await
                .into_iter()
                .find(|u| u.id == id)
                .ok_or_else(|| CoreError::NotFound {
                    resource: "user".into(),
                    id,
                })?;
            print_user(&user, global);
            Ok(())
        }

        UsersCommand::Create {
            name,
            email,
            phone,
            role,
            password,
        } => {
            view.load().await?;
            let mut fields = view.start_create().await?;
            fields.name = name;
            fields.email = email;
            fields.phone = phone;
            fields.role = role;
            let password = match password {
                Some(password) => password,
                None => util::prompt_password("Password for the new user: ")?,
            };
            fields.password = SecretString::from(password);

            let user = view.submit(&fields).await?;
            print_user(&user, global);
            Ok(())
        }

        UsersCommand::Update {
            id,
            name,
            email,
            phone,
            role,
            reset_password,
        } => {
            view.load().await?;
            let mut fields = view.start_edit(id).await?;
            if let Some(name) = name {
                fields.name = name;
            }
            if let Some(email) = email {
                fields.email = email;
            }
            if let Some(phone) = phone {
                fields.phone = phone;
            }
            if let Some(role) = role {
                fields.role = role;
            }
            if reset_password {
                fields.password = SecretString::from(util::prompt_password("New password: ")?);
            }

            let user = view.submit(&fields).await?;
            print_user(&user, global);
            Ok(())
        }

        UsersCommand::Delete { id } => util::delete_record(view, id, global).await,
    }
}
