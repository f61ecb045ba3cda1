// ── Dashboard summary ──

use tracing::debug;

use crmdesk_api::{Client, CrmClient, Payment, PaymentStatus};

use crate::error::CoreError;

/// Headline numbers for the landing screen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardStats {
    pub total_clients: usize,
    pub total_payments: usize,
    /// Payments still `PENDENTE`.
    pub pending_payments: usize,
    /// Sum of every `PAGO` payment.
    pub revenue: f64,
}

impl DashboardStats {
    pub fn compute(clients: &[Client], payments: &[Payment]) -> Self {
        let (pending_payments, revenue) =
            payments
                .iter()
                .fold((0, 0.0), |(pending, revenue), payment| match payment.status {
                    PaymentStatus::Pendente => (pending + 1, revenue),
                    PaymentStatus::Pago => (pending, revenue + payment.value),
                    PaymentStatus::Vencido => (pending, revenue),
                });

        Self {
            total_clients: clients.len(),
            total_payments: payments.len(),
            pending_payments,
            revenue,
        }
    }

    /// Load clients and payments concurrently and summarize them.
    pub async fn fetch(api: &CrmClient) -> Result<Self, CoreError> {
        let clients = api.clients();
        let payments = api.payments();
        let (clients, payments) = tokio::try_join!(clients.list(), payments.list())?;
        debug!(
            clients = clients.len(),
            payments = payments.len(),
            "dashboard loaded"
        );
        Ok(Self::compute(&clients, &payments))
    }
}
