//! Client command handlers.

use tabled::Tabled;

use crmdesk_core::{Client, ClientView};

use crate::cli::{ClientsArgs, ClientsCommand, GlobalOpts};
use crate::config::Connection;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Owner")]
    owner: i64,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Client> for ClientRow {
    fn from(c: &Client) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            phone: c.phone.clone(),
            owner: c.user_id,
            created: util::short_date(&c.create_date),
        }
    }
}

fn detail(c: &Client) -> String {
    let mut lines = vec![
        format!("ID:        {}", c.id),
        format!("Name:      {}", c.name),
        format!("Phone:     {}", c.phone),
        format!("Owner:     user {}", c.user_id),
        format!("Created:   {}", c.create_date),
    ];
    if let Some(ref payments) = c.payments {
        lines.push(format!("Payments:  {}", payments.len()));
    }
    lines.join("\n")
}

fn print_client(client: &Client, global: &GlobalOpts) {
    let out = output::render_single(global.output(), client, detail, |c| c.id.to_string());
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    conn: &Connection,
    args: ClientsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    conn.require_login()?;
    let (notifier, mut rx) = util::notifier();
    let view = ClientView::new(&conn.api, notifier);

    let result = run(conn, &view, args.command, global).await;
    util::flush_notifications(&mut rx, global);
    result
}

async fn run(
    conn: &Connection,
    view: &ClientView,
    command: ClientsCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match command {
        ClientsCommand::List(list) => {
            view.load().await?;
            let clients = util::search(view, list.search.as_deref()).await;
            let out = output::render_list(global.output(), &clients, |c| ClientRow::from(c), |c| {
                c.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Get { id } => {
            let client = conn.api.clients().get(id).await?;
            print_client(&client, global);
            Ok(())
        }

        ClientsCommand::Create { name, phone } => {
            view.load().await?;
            let mut fields = view.start_create().await?;
            fields.name = name;
            fields.phone = phone;

            let client = view.submit(&fields).await?;
            print_client(&client, global);
            Ok(())
        }

        ClientsCommand::Update { id, name, phone } => {
            view.load().await?;
            let mut fields = view.start_edit(id).await?;
            if let Some(name) = name {
                fields.name = name;
            }
            if let Some(phone) = phone {
                fields.phone = phone;
            }

            let client = view.submit(&fields).await?;
            print_client(&client, global);
            Ok(())
        }

        ClientsCommand::Delete { id } => util::delete_record(view, id, global).await,
    }
}
