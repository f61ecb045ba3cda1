//! Dashboard summary handler.

use serde::Serialize;

use crmdesk_core::DashboardStats;

use crate::cli::GlobalOpts;
use crate::config::Connection;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Summary {
    total_clients: usize,
    total_payments: usize,
    pending_payments: usize,
    revenue: f64,
}

impl From<DashboardStats> for Summary {
    fn from(s: DashboardStats) -> Self {
        Self {
            total_clients: s.total_clients,
            total_payments: s.total_payments,
            pending_payments: s.pending_payments,
            revenue: s.revenue,
        }
    }
}

fn detail(s: &Summary) -> String {
    [
        format!("Clients:           {}", s.total_clients),
        format!("Payments:          {}", s.total_payments),
        format!("Pending payments:  {}", s.pending_payments),
        format!("Revenue (paid):    {:.2}", s.revenue),
    ]
    .join("\n")
}

pub async fn handle(conn: &Connection, global: &GlobalOpts) -> Result<(), CliError> {
    conn.require_login()?;
    let summary = Summary::from(DashboardStats::fetch(&conn.api).await?);
    let out = output::render_single(global.output(), &summary, detail, |s| {
        format!("{:.2}", s.revenue)
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
