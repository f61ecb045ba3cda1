// ── Per-resource view behavior ──
//
// Everything that differs between the user, client and payment screens:
// what else must be loaded alongside the list, how search matches, who may
// use the view, and which deletes are refused.

use std::future::{self, Future};

use crmdesk_api::{
    Client, Clients, CrmClient, Payment, PaymentDraft, Payments, RecordId, Resource, User, Users,
};

use crate::error::CoreError;
use crate::forms::{ClientFields, FormAdapter, PaymentFields, UserFields};

/// Placeholder shown when a payment references a client the view has not loaded.
pub const UNKNOWN_CLIENT: &str = "Unknown client";

/// Resource-specific hooks for [`ViewController`](crate::ViewController).
pub trait ViewResource: Resource {
    /// Extra data loaded alongside the record list.
    type Context: Default + Send + Sync + 'static;
    /// Form field state for this resource.
    type Fields: FormAdapter<Record = Self::Record, Draft = Self::Draft>;

    fn load_context(
        api: &CrmClient,
    ) -> impl Future<Output = Result<Self::Context, crmdesk_api::Error>> + Send;

    /// Case-insensitive search. `needle` is already lowercased and non-empty.
    fn matches(record: &Self::Record, needle: &str, context: &Self::Context) -> bool;

    /// Gate for the whole view.
    fn authorize(_principal: Option<&User>) -> Result<(), CoreError> {
        Ok(())
    }

    /// Refuse deletes that must never reach the server.
    fn guard_delete(_id: RecordId, _principal: Option<&User>) -> Result<(), CoreError> {
        Ok(())
    }

    /// Checks against the view's loaded data before a save is sent.
    fn validate(_draft: &Self::Draft, _context: &Self::Context) -> Result<(), CoreError> {
        Ok(())
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

// ── Users ───────────────────────────────────────────────────────────

impl ViewResource for Users {
    type Context = ();
    type Fields = UserFields;

    fn load_context(
        _api: &CrmClient,
    ) -> impl Future<Output = Result<(), crmdesk_api::Error>> + Send {
        future::ready(Ok(()))
    }

    fn matches(user: &User, needle: &str, _context: &()) -> bool {
        contains_ci(&user.name, needle) || contains_ci(&user.email, needle)
    }

    fn authorize(principal: Option<&User>) -> Result<(), CoreError> {
        match principal {
            Some(user) if user.is_admin() => Ok(()),
            Some(_) => Err(CoreError::Forbidden {
                reason: "only administrators can manage users".into(),
            }),
            None => Err(CoreError::Forbidden {
                reason: "not logged in".into(),
            }),
        }
    }

    fn guard_delete(id: RecordId, principal: Option<&User>) -> Result<(), CoreError> {
        if principal.is_some_and(|user| user.id == id) {
            return Err(CoreError::SelfDeletion);
        }
        Ok(())
    }
}

// ── Clients ─────────────────────────────────────────────────────────

impl ViewResource for Clients {
    type Context = ();
    type Fields = ClientFields;

    fn load_context(
        _api: &CrmClient,
    ) -> impl Future<Output = Result<(), crmdesk_api::Error>> + Send {
        future::ready(Ok(()))
    }

    fn matches(client: &Client, needle: &str, _context: &()) -> bool {
        contains_ci(&client.name, needle) || contains_ci(&client.phone, needle)
    }
}

// ── Payments ────────────────────────────────────────────────────────

/// The clients a payment view knows about, for name resolution and the
/// client picker.
#[derive(Debug, Clone, Default)]
pub struct ClientDirectory {
    clients: Vec<Client>,
}

impl ClientDirectory {
    pub fn new(clients: Vec<Client>) -> Self {
        Self { clients }
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.clients.iter().any(|client| client.id == id)
    }

    pub fn name_of(&self, id: RecordId) -> Option<&str> {
        self.clients
            .iter()
            .find(|client| client.id == id)
            .map(|client| client.name.as_str())
    }

    /// Display name for `id`, or [`UNKNOWN_CLIENT`] when the directory is
    /// stale relative to the payment.
    pub fn resolve(&self, id: RecordId) -> &str {
        self.name_of(id).unwrap_or(UNKNOWN_CLIENT)
    }
}

impl ViewResource for Payments {
    type Context = ClientDirectory;
    type Fields = PaymentFields;

    fn load_context(
        api: &CrmClient,
    ) -> impl Future<Output = Result<ClientDirectory, crmdesk_api::Error>> + Send {
        let clients = api.clients();
        async move { clients.list().await.map(ClientDirectory::new) }
    }

    fn matches(payment: &Payment, needle: &str, directory: &ClientDirectory) -> bool {
        contains_ci(directory.resolve(payment.client_id), needle)
            || payment.value.to_string().contains(needle)
            || contains_ci(&payment.status.to_string(), needle)
    }

    fn validate(draft: &PaymentDraft, directory: &ClientDirectory) -> Result<(), CoreError> {
        if directory.contains(draft.client_id) {
            Ok(())
        } else {
            Err(CoreError::validation(
                "client_id",
                format!("client {} is not in the loaded client list", draft.client_id),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use crmdesk_api::{PaymentStatus, PaymentType, Role};

    use super::*;

    fn user(id: RecordId, role: Role) -> User {
        User {
            id,
            name: "Ana Souza".into(),
            email: "ana@crm.example".into(),
            phone: 1,
            role,
            create_date: String::new(),
        }
    }

    fn client(id: RecordId, name: &str) -> Client {
        Client {
            id,
            name: name.into(),
            phone: "(11) 4002-8922".into(),
            create_date: String::new(),
            user_id: 1,
            payments: None,
        }
    }

    #[test]
    fn only_admins_may_open_user_view() {
        assert!(Users::authorize(Some(&user(1, Role::Admin))).is_ok());
        assert!(matches!(
            Users::authorize(Some(&user(2, Role::User))),
            Err(CoreError::Forbidden { .. })
        ));
        assert!(matches!(Users::authorize(None), Err(CoreError::Forbidden { .. })));
        assert!(Clients::authorize(None).is_ok());
    }

    #[test]
    fn self_delete_is_refused() {
        let me = user(1, Role::Admin);
        assert!(matches!(
            Users::guard_delete(1, Some(&me)),
            Err(CoreError::SelfDeletion)
        ));
        assert!(Users::guard_delete(2, Some(&me)).is_ok());
    }

    #[test]
    fn user_search_covers_name_and_email() {
        let ana = user(1, Role::User);
        assert!(Users::matches(&ana, "souza", &()));
        assert!(Users::matches(&ana, "crm.example", &()));
        assert!(!Users::matches(&ana, "bruno", &()));
    }

    #[test]
    fn client_search_covers_phone() {
        assert!(Clients::matches(&client(1, "Padaria Sol"), "4002", &()));
        assert!(Clients::matches(&client(1, "Padaria Sol"), "padaria", &()));
    }

    #[test]
    fn payment_search_uses_resolved_name_value_and_status() {
        let directory = ClientDirectory::new(vec![client(3, "Padaria Sol")]);
        let payment = Payment {
            id: 7,
            value: 150.5,
            kind: PaymentType::Boleto,
            create_date: String::new(),
            final_date: String::new(),
            status: PaymentStatus::Vencido,
            client_id: 3,
        };

        assert!(Payments::matches(&payment, "padaria sol", &directory));
        assert!(Payments::matches(&payment, "150.5", &directory));
        assert!(Payments::matches(&payment, "venc", &directory));
        assert!(!Payments::matches(&payment, "pago", &directory));
    }

    #[test]
    fn unknown_client_gets_placeholder() {
        let directory = ClientDirectory::new(vec![client(3, "Padaria Sol")]);
        assert_eq!(directory.resolve(3), "Padaria Sol");
        assert_eq!(directory.resolve(99), UNKNOWN_CLIENT);
        assert!(!directory.contains(99));
    }
}
