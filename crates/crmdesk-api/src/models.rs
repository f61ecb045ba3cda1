// Wire types for the CRM REST API.
//
// Records are server-owned: `id` and `create_date` are assigned by the
// server and only ever read. Submission payloads (`*Draft`) have no such
// fields, so they cannot be sent on create or update by construction.

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumIter, EnumString};

/// Server-assigned record identifier.
pub type RecordId = i64;

// ── Enumerations ────────────────────────────────────────────────────

/// Staff role. Only `ADMIN` may manage user accounts.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Role {
    Admin,
    #[default]
    User,
}

/// How a payment is settled.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum PaymentType {
    /// Bank slip.
    #[default]
    Boleto,
    /// Card.
    Cartao,
    /// Cash, paid up front.
    Avista,
}

/// Settlement state of a payment.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum PaymentStatus {
    #[default]
    Pendente,
    Vencido,
    Pago,
}

// ── Records ─────────────────────────────────────────────────────────

/// A staff account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub phone: u64,
    #[serde(rename = "roles_user")]
    pub role: Role,
    /// Server-formatted timestamp, carried verbatim.
    pub create_date: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A customer, owned by one staff account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: RecordId,
    pub name: String,
    pub phone: String,
    pub create_date: String,
    pub user_id: RecordId,
    /// Denormalized view some endpoints embed. Never authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payments: Option<Vec<Payment>>,
}

/// A charge against a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: RecordId,
    pub value: f64,
    #[serde(rename = "type")]
    pub kind: PaymentType,
    pub create_date: String,
    /// Due date as sent by the server (date or full timestamp).
    pub final_date: String,
    pub status: PaymentStatus,
    pub client_id: RecordId,
}

// ── Submission payloads ─────────────────────────────────────────────

/// Body for `POST /user` and `PUT /user/{id}`.
///
/// `password: None` is omitted from the JSON, which the server reads as
/// "leave unchanged" on update.
#[derive(Debug, Clone, Serialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_secret"
    )]
    pub password: Option<SecretString>,
    pub phone: u64,
    #[serde(rename = "roles_user")]
    pub role: Role,
}

/// Body for `POST /client` and `PUT /client/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientDraft {
    pub name: String,
    pub phone: String,
    pub user_id: RecordId,
}

/// Body for `POST /payment` and `PUT /payment/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentDraft {
    pub value: f64,
    #[serde(rename = "type")]
    pub kind: PaymentType,
    pub final_date: NaiveDate,
    pub status: PaymentStatus,
    pub client_id: RecordId,
}

// ── Authentication ──────────────────────────────────────────────────

/// Body for `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
        }
    }
}

/// Successful login: the bearer token and the authenticated account.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub token: SecretString,
    pub user: User,
}

/// Raw login body; the token is wrapped in a secret before leaving the crate.
#[derive(Deserialize)]
pub(crate) struct RawLoginResponse {
    pub token: String,
    pub user: User,
}

impl From<RawLoginResponse> for LoginResponse {
    fn from(raw: RawLoginResponse) -> Self {
        Self {
            token: SecretString::from(raw.token),
            user: raw.user,
        }
    }
}

// ── Serde helpers ───────────────────────────────────────────────────

fn serialize_secret<S: Serializer>(
    secret: &SecretString,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[allow(clippy::ref_option)]
fn serialize_optional_secret<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_str(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn user_reads_roles_user_field() {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "name": "Ana",
            "email": "ana@crm.example",
            "phone": 11987654321_u64,
            "roles_user": "ADMIN",
            "create_date": "2024-01-01T10:00:00.000Z"
        }))
        .unwrap();

        assert!(user.is_admin());
        assert_eq!(user.phone, 11_987_654_321);
    }

    #[test]
    fn client_without_payments_omits_field_on_write() {
        let client: Client = serde_json::from_value(json!({
            "id": 3,
            "name": "Padaria Sol",
            "phone": "(11) 4002-8922",
            "create_date": "2024-01-01",
            "user_id": 1
        }))
        .unwrap();

        assert!(client.payments.is_none());
        let back = serde_json::to_value(&client).unwrap();
        assert!(back.get("payments").is_none());
    }

    #[test]
    fn payment_type_uses_type_key() {
        let payment: Payment = serde_json::from_value(json!({
            "id": 7,
            "value": 10,
            "type": "CARTAO",
            "status": "PAGO",
            "client_id": 3,
            "create_date": "2024-01-01",
            "final_date": "2024-02-01"
        }))
        .unwrap();

        assert_eq!(payment.kind, PaymentType::Cartao);
        assert_eq!(payment.status, PaymentStatus::Pago);
        assert!((payment.value - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn user_draft_without_password_omits_it() {
        let draft = UserDraft {
            name: "Ana".into(),
            email: "ana@crm.example".into(),
            password: None,
            phone: 1199,
            role: Role::User,
        };

        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({
                "name": "Ana",
                "email": "ana@crm.example",
                "phone": 1199,
                "roles_user": "USER"
            })
        );
    }

    #[test]
    fn user_draft_with_password_exposes_it_on_the_wire_only() {
        let draft = UserDraft {
            name: "Ana".into(),
            email: "ana@crm.example".into(),
            password: Some(SecretString::from("s3cret".to_string())),
            phone: 1199,
            role: Role::Admin,
        };

        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body["password"], "s3cret");
        assert!(!format!("{draft:?}").contains("s3cret"));
    }

    #[test]
    fn payment_draft_serializes_calendar_date() {
        let draft = PaymentDraft {
            value: 99.9,
            kind: PaymentType::default(),
            final_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            status: PaymentStatus::default(),
            client_id: 3,
        };

        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({
                "value": 99.9,
                "type": "BOLETO",
                "final_date": "2024-02-01",
                "status": "PENDENTE",
                "client_id": 3
            })
        );
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Avista".parse::<PaymentType>().unwrap(), PaymentType::Avista);
        assert_eq!(PaymentStatus::Vencido.to_string(), "VENCIDO");
    }
}
