// crmdesk-core: View state between crmdesk-api and rendering surfaces (CLI).

pub mod dashboard;
pub mod error;
pub mod forms;
pub mod notify;
pub mod resources;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use dashboard::DashboardStats;
pub use error::CoreError;
pub use forms::{ClientFields, FormAdapter, PaymentFields, UserFields, date_part};
pub use notify::{Level, Notification, Notifier};
pub use resources::{ClientDirectory, UNKNOWN_CLIENT, ViewResource};
pub use view::{DeleteIntent, EditState, ViewController, ViewState};

// Re-export the api surface consumers need alongside the controllers.
pub use crmdesk_api::Error as ApiError;
pub use crmdesk_api::{
    Client, ClientConfig, ClientDraft, Clients, CrmClient, DEFAULT_BASE_URL, FileSessionStore,
    LoginRequest, LoginResponse, MemorySessionStore, Payment, PaymentDraft, PaymentStatus,
    PaymentType, Payments, RecordId, Role, SessionStore, TlsMode, TransportConfig, User,
    UserDraft, Users,
};

/// Controller for the user screen (administrators only).
pub type UserView = ViewController<Users>;
/// Controller for the client screen.
pub type ClientView = ViewController<Clients>;
/// Controller for the payment screen.
pub type PaymentView = ViewController<Payments>;
