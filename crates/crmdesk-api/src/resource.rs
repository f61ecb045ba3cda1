// Typed resource clients.
//
// One zero-sized descriptor per resource kind encodes its collection path
// and payload types; `ResourceClient<R>` turns CRUD intents into calls on
// the shared `CrmClient` verbs.

use std::fmt::Debug;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::CrmClient;
use crate::error::Error;
use crate::models::{Client, ClientDraft, Payment, PaymentDraft, RecordId, User, UserDraft};

/// Static description of one REST collection.
pub trait Resource: Send + Sync + 'static {
    /// The server-owned record returned by reads and writes.
    type Record: DeserializeOwned + Serialize + Clone + Debug + Send + Sync + 'static;
    /// Submission body for create and update. Never carries `id` or `create_date`.
    type Draft: Serialize + Debug + Send + Sync + 'static;

    /// Collection path relative to the API root, e.g. `"user"`.
    const PATH: &'static str;
    /// Singular human-readable name, e.g. `"user"`.
    const NAME: &'static str;

    fn id(record: &Self::Record) -> RecordId;
}

/// Staff accounts: `/user`.
#[derive(Debug, Clone, Copy)]
pub struct Users;

/// Customers: `/client`.
#[derive(Debug, Clone, Copy)]
pub struct Clients;

/// Payments: `/payment`.
#[derive(Debug, Clone, Copy)]
pub struct Payments;

impl Resource for Users {
    type Record = User;
    type Draft = UserDraft;
    const PATH: &'static str = "user";
    const NAME: &'static str = "user";

    fn id(record: &User) -> RecordId {
        record.id
    }
}

impl Resource for Clients {
    type Record = Client;
    type Draft = ClientDraft;
    const PATH: &'static str = "client";
    const NAME: &'static str = "client";

    fn id(record: &Client) -> RecordId {
        record.id
    }
}

impl Resource for Payments {
    type Record = Payment;
    type Draft = PaymentDraft;
    const PATH: &'static str = "payment";
    const NAME: &'static str = "payment";

    fn id(record: &Payment) -> RecordId {
        record.id
    }
}

// ── ResourceClient ───────────────────────────────────────────────────

/// CRUD access to one resource kind.
pub struct ResourceClient<R: Resource> {
    api: CrmClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self::new(self.api.clone())
    }
}

impl<R: Resource> Debug for ResourceClient<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceClient")
            .field("resource", &R::NAME)
            .field("api", &self.api)
            .finish()
    }
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(api: CrmClient) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    /// The shared client underneath.
    pub fn api(&self) -> &CrmClient {
        &self.api
    }

    fn member(id: RecordId) -> String {
        format!("{}/{id}", R::PATH)
    }

    /// `GET /{path}`
    pub async fn list(&self) -> Result<Vec<R::Record>, Error> {
        self.api.get(R::PATH).await
    }

    /// `GET /{path}/{id}`
    pub async fn get(&self, id: RecordId) -> Result<R::Record, Error> {
        self.api.get(&Self::member(id)).await
    }

    /// `POST /{path}`; returns the record with its server-assigned fields.
    pub async fn create(&self, draft: &R::Draft) -> Result<R::Record, Error> {
        self.api.post(R::PATH, draft).await
    }

    /// `PUT /{path}/{id}` with a full draft or any partial body.
    pub async fn update<B: Serialize + Sync + ?Sized>(
        &self,
        id: RecordId,
        body: &B,
    ) -> Result<R::Record, Error> {
        self.api.put(&Self::member(id), body).await
    }

    /// `DELETE /{path}/{id}`
    pub async fn delete(&self, id: RecordId) -> Result<(), Error> {
        self.api.delete(&Self::member(id)).await
    }
}

impl ResourceClient<Payments> {
    /// `GET /payment/client/{client_id}`
    pub async fn list_by_client(&self, client_id: RecordId) -> Result<Vec<Payment>, Error> {
        self.api
            .get(&format!("{}/client/{client_id}", Payments::PATH))
            .await
    }
}
