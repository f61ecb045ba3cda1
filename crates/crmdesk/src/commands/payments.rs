//! Payment command handlers.

use std::collections::HashSet;

use tabled::Tabled;

use crmdesk_core::{ClientDirectory, Payment, PaymentView};

use crate::cli::{GlobalOpts, PaymentsArgs, PaymentsCommand};
use crate::config::Connection;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl PaymentRow {
    fn new(p: &Payment, directory: &ClientDirectory, color: bool) -> Self {
        Self {
            id: p.id,
            client: directory.resolve(p.client_id).to_owned(),
            value: format!("{:.2}", p.value),
            kind: p.kind.to_string(),
            due: util::short_date(&p.final_date),
            status: output::paint_status(p.status, color),
        }
    }
}

fn detail(p: &Payment, client_name: &str, color: bool) -> String {
    [
        format!("ID:        {}", p.id),
        format!("Client:    {client_name} ({})", p.client_id),
        format!("Value:     {:.2}", p.value),
        format!("Type:      {}", p.kind),
        format!("Due:       {}", util::short_date(&p.final_date)),
        format!("Status:    {}", output::paint_status(p.status, color)),
        format!("Created:   {}", p.create_date),
    ]
    .join("\n")
}

async fn print_payment(view: &PaymentView, payment: &Payment, global: &GlobalOpts) {
    let client_name = view.client_name(payment.client_id).await;
    let color = output::stdout_color(global);
    let out = output::render_single(
        global.output(),
        payment,
        |p| detail(p, &client_name, color),
        |p| p.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    conn: &Connection,
    args: PaymentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    conn.require_login()?;
    let (notifier, mut rx) = util::notifier();
    let view = PaymentView::new(&conn.api, notifier);

    let result = run(conn, &view, args.command, global).await;
    util::flush_notifications(&mut rx, global);
    result
}

#[allow(clippy::too_many_lines)]
async fn run(
    conn: &Connection,
    view: &PaymentView,
    command: PaymentsCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match command {
        PaymentsCommand::List { list, client } => {
            view.load().await?;
            let matching = util::search(view, list.search.as_deref()).await;
            let payments = match client {
                Some(client_id) => {
                    let ids: HashSet<i64> = matching.iter().map(|p| p.id).collect();
                    conn.api
                        .payments()
                        .list_by_client(client_id)
                        .await?
                        .into_iter()
                        .filter(|p| ids.contains(&p.id))
                        .collect()
                }
                None => matching,
            };

            let directory = view.directory().await;
            let color = output::stdout_color(global);
            let out = output::render_list(
                global.output(),
                &payments,
                |p| PaymentRow::new(p, &directory, color),
                |p| p.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PaymentsCommand::Get { id } => {
            view.load().await?;
            let payment = conn.api.payments().get(id).await?;
            print_payment(view, &payment, global).await;
            Ok(())
        }

        PaymentsCommand::Create {
            client,
            value,
            kind,
            due,
            status,
        } => {
            view.load().await?;
            let mut fields = view.start_create().await?;
            fields.client_id = Some(client);
            fields.value = value;
            fields.kind = kind;
            fields.final_date = due;
            fields.status = status;

            let payment = view.submit(&fields).await?;
            print_payment(view, &payment, global).await;
            Ok(())
        }

        PaymentsCommand::Update {
            id,
            client,
            value,
            kind,
            due,
            status,
        } => {
            view.load().await?;
            let mut fields = view.start_edit(id).await?;
            if client.is_some() {
                fields.client_id = client;
            }
            if let Some(value) = value {
                fields.value = value;
            }
            if let Some(kind) = kind {
                fields.kind = kind;
            }
            if let Some(due) = due {
                fields.final_date = due;
            }
            if let Some(status) = status {
                fields.status = status;
            }

            let payment = view.submit(&fields).await?;
            print_payment(view, &payment, global).await;
            Ok(())
        }

        PaymentsCommand::Delete { id } => util::delete_record(view, id, global).await,
    }
}
