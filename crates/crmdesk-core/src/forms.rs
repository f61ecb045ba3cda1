// ── Form adapters ──
//
// Pure mapping between a record and the editable field state a form shows.
// Field states are plain structs with a fixed field set; text inputs stay
// strings until `to_submission` parses them.

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};

use crmdesk_api::{
    Client, ClientDraft, Payment, PaymentDraft, PaymentStatus, PaymentType, RecordId, Role, User,
    UserDraft,
};

use crate::error::CoreError;

/// Two-way mapping between a record and its editable form state.
pub trait FormAdapter: Sized {
    type Record;
    type Draft;

    /// Blank defaults when `record` is `None`, otherwise the record's
    /// editable fields. `principal` is the authenticated user.
    fn to_field_state(record: Option<&Self::Record>, principal: Option<&User>) -> Self;

    /// Validate presence and type, then build the submission payload.
    fn to_submission(&self) -> Result<Self::Draft, CoreError>;
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CoreError::validation(field, "is required"))
    } else {
        Ok(trimmed)
    }
}

/// Calendar date part of a server timestamp (`2024-02-01T00:00:00Z` -> `2024-02-01`).
pub fn date_part(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or_default()
}

// ── User ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct UserFields {
    pub name: String,
    pub email: String,
    /// Never pre-filled. Blank on an existing user means "keep the current one".
    pub password: SecretString,
    pub phone: String,
    pub role: Role,
    is_new: bool,
}

impl UserFields {
    /// `true` when these fields describe a user that does not exist yet.
    pub fn is_new(&self) -> bool {
        self.is_new
    }
}

impl FormAdapter for UserFields {
    type Record = User;
    type Draft = UserDraft;

    fn to_field_state(record: Option<&User>, _principal: Option<&User>) -> Self {
        let blank_password = SecretString::from(String::new());
        match record {
            Some(user) => Self {
                name: user.name.clone(),
                email: user.email.clone(),
                password: blank_password,
                phone: user.phone.to_string(),
                role: user.role,
                is_new: false,
            },
            None => Self {
                name: String::new(),
                email: String::new(),
                password: blank_password,
                phone: String::new(),
                role: Role::User,
                is_new: true,
            },
        }
    }

    fn to_submission(&self) -> Result<UserDraft, CoreError> {
        let name = required("name", &self.name)?;
        let email = required("email", &self.email)?;
        let phone = required("phone", &self.phone)?
            .parse::<u64>()
            .map_err(|_| CoreError::validation("phone", "must contain digits only"))?;

        let password = if self.password.expose_secret().is_empty() {
            if self.is_new {
                return Err(CoreError::validation("password", "is required for new users"));
            }
            None
        } else {
            Some(self.password.clone())
        };

        Ok(UserDraft {
            name: name.to_owned(),
            email: email.to_owned(),
            password,
            phone,
            role: self.role,
        })
    }
}

// ── Client ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFields {
    pub name: String,
    pub phone: String,
    /// Owning staff account. New clients belong to the authenticated user.
    pub owner: Option<RecordId>,
}

impl FormAdapter for ClientFields {
    type Record = Client;
    type Draft = ClientDraft;

    fn to_field_state(record: Option<&Client>, principal: Option<&User>) -> Self {
        match record {
            Some(client) => Self {
                name: client.name.clone(),
                phone: client.phone.clone(),
                owner: Some(client.user_id),
            },
            None => Self {
                name: String::new(),
                phone: String::new(),
                owner: principal.map(|user| user.id),
            },
        }
    }

    fn to_submission(&self) -> Result<ClientDraft, CoreError> {
        let name = required("name", &self.name)?;
        let phone = required("phone", &self.phone)?;
        let user_id = self
            .owner
            .ok_or_else(|| CoreError::validation("user_id", "no owning user; log in first"))?;

        Ok(ClientDraft {
            name: name.to_owned(),
            phone: phone.to_owned(),
            user_id,
        })
    }
}

// ── Payment ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentFields {
    pub value: String,
    pub kind: PaymentType,
    /// `YYYY-MM-DD`.
    pub final_date: String,
    pub status: PaymentStatus,
    pub client_id: Option<RecordId>,
}

impl FormAdapter for PaymentFields {
    type Record = Payment;
    type Draft = PaymentDraft;

    fn to_field_state(record: Option<&Payment>, _principal: Option<&User>) -> Self {
        match record {
            Some(payment) => Self {
                value: payment.value.to_string(),
                kind: payment.kind,
                final_date: date_part(&payment.final_date).to_owned(),
                status: payment.status,
                client_id: Some(payment.client_id),
            },
            None => Self {
                value: "0".into(),
                kind: PaymentType::Boleto,
                final_date: String::new(),
                status: PaymentStatus::Pendente,
                client_id: None,
            },
        }
    }

    fn to_submission(&self) -> Result<PaymentDraft, CoreError> {
        let value = required("value", &self.value)?
            .parse::<f64>()
            .map_err(|_| CoreError::validation("value", "must be a number"))?;
        if !value.is_finite() || value < 0.0 {
            return Err(CoreError::validation("value", "must be zero or more"));
        }

        let final_date =
            NaiveDate::parse_from_str(required("final_date", &self.final_date)?, "%Y-%m-%d")
                .map_err(|_| CoreError::validation("final_date", "expected YYYY-MM-DD"))?;

        let client_id = self
            .client_id
            .ok_or_else(|| CoreError::validation("client_id", "select a client"))?;

        Ok(PaymentDraft {
            value,
            kind: self.kind,
            final_date,
            status: self.status,
            client_id,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn admin() -> User {
        User {
            id: 1,
            name: "Ana".into(),
            email: "ana@crm.example".into(),
            phone: 11_987_654_321,
            role: Role::Admin,
            create_date: "2024-01-01T10:00:00.000Z".into(),
        }
    }

    #[test]
    fn existing_user_never_prefills_password() {
        let fields = UserFields::to_field_state(Some(&admin()), None);
        assert!(fields.password.expose_secret().is_empty());
        assert_eq!(fields.phone, "11987654321");
        assert_eq!(fields.role, Role::Admin);
        assert!(!fields.is_new());
    }

    #[test]
    fn blank_password_on_edit_means_unchanged() {
        let fields = UserFields::to_field_state(Some(&admin()), None);
        let draft = fields.to_submission().unwrap();
        assert!(draft.password.is_none());
    }

    #[test]
    fn new_user_requires_password() {
        let mut fields = UserFields::to_field_state(None, None);
        fields.name = "Bruno".into();
        fields.email = "bruno@crm.example".into();
        fields.phone = "1133".into();

        let err = fields.to_submission().unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "password"));

        fields.password = SecretString::from("hunter2".to_string());
        let draft = fields.to_submission().unwrap();
        assert_eq!(draft.password.unwrap().expose_secret(), "hunter2");
        assert_eq!(draft.role, Role::User);
    }

    #[test]
    fn user_phone_must_be_numeric() {
        let mut fields = UserFields::to_field_state(Some(&admin()), None);
        fields.phone = "11 9876".into();
        let err = fields.to_submission().unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "phone"));
    }

    #[test]
    fn new_client_is_owned_by_principal() {
        let mut fields = ClientFields::to_field_state(None, Some(&admin()));
        assert_eq!(fields.owner, Some(1));

        fields.name = "Padaria Sol".into();
        fields.phone = "(11) 4002-8922".into();
        assert_eq!(
            fields.to_submission().unwrap(),
            ClientDraft {
                name: "Padaria Sol".into(),
                phone: "(11) 4002-8922".into(),
                user_id: 1,
            }
        );
    }

    #[test]
    fn client_without_owner_is_rejected() {
        let mut fields = ClientFields::to_field_state(None, None);
        fields.name = "Padaria Sol".into();
        fields.phone = "4002".into();
        let err = fields.to_submission().unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "user_id"));
    }

    #[test]
    fn existing_client_keeps_its_owner() {
        let client = Client {
            id: 3,
            name: "Padaria Sol".into(),
            phone: "4002".into(),
            create_date: "2024-01-01".into(),
            user_id: 42,
            payments: None,
        };
        let fields = ClientFields::to_field_state(Some(&client), Some(&admin()));
        assert_eq!(fields.owner, Some(42));
    }

    #[test]
    fn payment_defaults() {
        let fields = PaymentFields::to_field_state(None, None);
        assert_eq!(fields.kind, PaymentType::Boleto);
        assert_eq!(fields.status, PaymentStatus::Pendente);
        assert_eq!(fields.client_id, None);
    }

    #[test]
    fn payment_edit_truncates_due_date() {
        let payment = Payment {
            id: 7,
            value: 10.5,
            kind: PaymentType::Cartao,
            create_date: "2024-01-01T09:00:00.000Z".into(),
            final_date: "2024-02-01T23:59:00.000Z".into(),
            status: PaymentStatus::Vencido,
            client_id: 3,
        };
        let fields = PaymentFields::to_field_state(Some(&payment), None);
        assert_eq!(fields.final_date, "2024-02-01");
        assert_eq!(fields.value, "10.5");

        let draft = fields.to_submission().unwrap();
        assert_eq!(draft.final_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(draft.client_id, 3);
    }

    #[test]
    fn payment_value_must_be_non_negative_number() {
        let mut fields = PaymentFields::to_field_state(None, None);
        fields.final_date = "2024-02-01".into();
        fields.client_id = Some(3);

        fields.value = "abc".into();
        assert!(fields.to_submission().is_err());
        fields.value = "-1".into();
        assert!(fields.to_submission().is_err());
        fields.value = "NaN".into();
        assert!(fields.to_submission().is_err());
        fields.value = "12.34".into();
        assert!((fields.to_submission().unwrap().value - 12.34).abs() < f64::EPSILON);
    }

    #[test]
    fn payment_requires_client_and_date() {
        let mut fields = PaymentFields::to_field_state(None, None);
        fields.final_date = "01/02/2024".into();
        fields.client_id = Some(3);
        let err = fields.to_submission().unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "final_date"));

        fields.final_date = "2024-02-01".into();
        fields.client_id = None;
        let err = fields.to_submission().unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "client_id"));
    }
}
