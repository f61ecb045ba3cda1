// crmdesk-api: Async typed client for the CRM REST API

pub mod client;
pub mod error;
pub mod models;
pub mod resource;
pub mod session;
pub mod transport;

pub use client::CrmClient;
pub use error::Error;
pub use models::{
    Client, ClientDraft, LoginRequest, LoginResponse, Payment, PaymentDraft, PaymentStatus,
    PaymentType, RecordId, Role, User, UserDraft,
};
pub use resource::{Clients, Payments, Resource, ResourceClient, Users};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
pub use transport::{ClientConfig, DEFAULT_BASE_URL, TlsMode, TransportConfig};
