// ── Generic CRUD view controller ──
//
// Owns the local copy of one resource list plus its search term, edit
// target and pending delete. Local state changes only after the matching
// server call succeeds. The state lock is never held across a request, so
// concurrent calls on one controller all reach the server and the last
// response to arrive wins.

use std::sync::Arc;

use strum::Display;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crmdesk_api::{Client, CrmClient, Payments, RecordId, ResourceClient, User};

use crate::error::CoreError;
use crate::forms::FormAdapter;
use crate::notify::Notifier;
use crate::resources::{ClientDirectory, ViewResource};

// ── State types ──────────────────────────────────────────────────

/// Lifecycle of the record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ViewState {
    Loading,
    Ready,
    Failed,
}

/// The create/edit dialog, nested inside [`ViewState::Ready`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditState<T> {
    Idle,
    Editing(T),
    Creating,
}

/// A pending, single-use confirmation for a destructive delete.
///
/// Returned by [`ViewController::request_delete`] and consumed by
/// [`ViewController::confirm_delete`]. Only the most recent request is
/// honored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteIntent {
    id: RecordId,
    token: Uuid,
}

impl DeleteIntent {
    /// The record this intent would delete.
    pub fn id(&self) -> RecordId {
        self.id
    }
}

struct ViewModel<R: ViewResource> {
    state: ViewState,
    records: Vec<R::Record>,
    context: R::Context,
    search: String,
    edit: EditState<R::Record>,
    pending_delete: Option<DeleteIntent>,
}

impl<R: ViewResource> ViewModel<R> {
    fn new() -> Self {
        Self {
            state: ViewState::Loading,
            records: Vec::new(),
            context: R::Context::default(),
            search: String::new(),
            edit: EditState::Idle,
            pending_delete: None,
        }
    }

    fn find(&self, id: RecordId) -> Option<&R::Record> {
        self.records.iter().find(|record| R::id(record) == id)
    }

    fn ensure_ready(&self) -> Result<(), CoreError> {
        match self.state {
            ViewState::Ready => Ok(()),
            state => Err(CoreError::NotReady { state }),
        }
    }

    /// Dialogs only exist while the view is `Ready`.
    fn close_dialogs(&mut self) {
        self.edit = EditState::Idle;
        self.pending_delete = None;
    }

    fn filtered(&self) -> Vec<R::Record> {
        let needle = self.search.to_lowercase();
        if needle.is_empty() {
            return self.records.clone();
        }
        self.records
            .iter()
            .filter(|record| R::matches(record, &needle, &self.context))
            .cloned()
            .collect()
    }
}

// ── ViewController ───────────────────────────────────────────────

/// State owner for one resource screen.
///
/// Cheaply cloneable via `Arc`; clones share state.
pub struct ViewController<R: ViewResource> {
    inner: Arc<ViewInner<R>>,
}

struct ViewInner<R: ViewResource> {
    resource: ResourceClient<R>,
    notifier: Notifier,
    model: Mutex<ViewModel<R>>,
}

impl<R: ViewResource> Clone for ViewController<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: ViewResource> ViewController<R> {
    pub fn new(api: &CrmClient, notifier: Notifier) -> Self {
        Self {
            inner: Arc::new(ViewInner {
                resource: ResourceClient::new(api.clone()),
                notifier,
                model: Mutex::new(ViewModel::new()),
            }),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    /// The authenticated user, as remembered by the session store.
    pub fn principal(&self) -> Option<User> {
        self.inner.resource.api().session().user()
    }

    /// Notify and hand the error back, for refusals and failed calls.
    fn fail(&self, message: &str, err: CoreError) -> CoreError {
        self.inner.notifier.error(format!("{message}: {err}"));
        err
    }

    fn authorize(&self) -> Result<(), CoreError> {
        R::authorize(self.principal().as_ref()).map_err(|e| self.fail("Access denied", e))
    }

    // ── Loading ──────────────────────────────────────────────────

    /// Fetch the list (and the resource's context) from the server.
    ///
    /// On failure the view is `Failed` with an empty list. Calling again
    /// refreshes.
    pub async fn load(&self) -> Result<(), CoreError> {
        if let Err(e) = self.authorize() {
            let mut model = self.inner.model.lock().await;
            model.state = ViewState::Failed;
            model.records.clear();
            model.close_dialogs();
            return Err(e);
        }

        {
            let mut model = self.inner.model.lock().await;
            model.state = ViewState::Loading;
            model.close_dialogs();
        }
        debug!(resource = R::NAME, "loading view");

        let fetched = tokio::try_join!(
            self.inner.resource.list(),
            R::load_context(self.inner.resource.api()),
        );

        let mut model = self.inner.model.lock().await;
        match fetched {
            Ok((records, context)) => {
                debug!(resource = R::NAME, count = records.len(), "view ready");
                model.records = records;
                model.context = context;
                model.state = ViewState::Ready;
                Ok(())
            }
            Err(e) => {
                model.records.clear();
                model.context = R::Context::default();
                model.state = ViewState::Failed;
                Err(self.fail(&format!("Could not load {}s", R::NAME), e.into()))
            }
        }
    }

    // ── Snapshots ────────────────────────────────────────────────

    pub async fn state(&self) -> ViewState {
        self.inner.model.lock().await.state
    }

    /// The canonical list, unfiltered.
    pub async fn records(&self) -> Vec<R::Record> {
        self.inner.model.lock().await.records.clone()
    }

    pub async fn edit_state(&self) -> EditState<R::Record> {
        self.inner.model.lock().await.edit.clone()
    }

    pub async fn search_term(&self) -> String {
        self.inner.model.lock().await.search.clone()
    }

    // ── Search ───────────────────────────────────────────────────

    /// Set the search term and return the matching records.
    ///
    /// Pure client-side filter. An empty term shows everything.
    pub async fn search(&self, term: &str) -> Vec<R::Record> {
        let mut model = self.inner.model.lock().await;
        term.clone_into(&mut model.search);
        model.filtered()
    }

    /// Records matching the current search term.
    pub async fn visible(&self) -> Vec<R::Record> {
        self.inner.model.lock().await.filtered()
    }

    // ── Create / edit ────────────────────────────────────────────

    /// Open the create dialog with blank defaults.
    pub async fn start_create(&self) -> Result<R::Fields, CoreError> {
        self.authorize()?;
        let principal = self.principal();
        let mut model = self.inner.model.lock().await;
        model.ensure_ready()?;
        model.edit = EditState::Creating;
        Ok(<R::Fields as FormAdapter>::to_field_state(None, principal.as_ref()))
    }

    /// Open the edit dialog for `id`, seeded from the loaded record.
    pub async fn start_edit(&self, id: RecordId) -> Result<R::Fields, CoreError> {
        self.authorize()?;
        let principal = self.principal();
        let mut model = self.inner.model.lock().await;
        model.ensure_ready()?;
        let record = model
            .find(id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                resource: R::NAME.into(),
                id,
            })?;
        let fields = <R::Fields as FormAdapter>::to_field_state(Some(&record), principal.as_ref());
        model.edit = EditState::Editing(record);
        Ok(fields)
    }

    /// Close the dialog without saving.
    pub async fn cancel_edit(&self) {
        self.inner.model.lock().await.edit = EditState::Idle;
    }

    /// Convert form fields and [`save`](Self::save) them.
    pub async fn submit(&self, fields: &R::Fields) -> Result<R::Record, CoreError> {
        let draft = fields
            .to_submission()
            .map_err(|e| self.fail(&format!("Could not save the {}", R::NAME), e))?;
        self.save(draft).await
    }

    /// Send the open dialog's payload.
    ///
    /// Editing updates the record and replaces it in place by id; creating
    /// appends the server's record. Either way the dialog closes on success.
    /// On failure the dialog stays open and the list is untouched.
    pub async fn save(&self, draft: R::Draft) -> Result<R::Record, CoreError> {
        self.authorize()?;
        let target = {
            let model = self.inner.model.lock().await;
            model.ensure_ready()?;
            let target = match &model.edit {
                EditState::Idle => return Err(CoreError::NotEditing),
                EditState::Editing(record) => Some(R::id(record)),
                EditState::Creating => None,
            };
            R::validate(&draft, &model.context)
                .map_err(|e| self.fail(&format!("Could not save the {}", R::NAME), e))?;
            target
        };

        let result = match target {
            Some(id) => self.inner.resource.update(id, &draft).await,
            None => self.inner.resource.create(&draft).await,
        };

        let saved = result
            .map_err(|e| self.fail(&format!("Could not save the {}", R::NAME), e.into()))?;

        let mut model = self.inner.model.lock().await;
        // A refresh that failed mid-request leaves nothing to reconcile.
        let ready = model.state == ViewState::Ready;
        match target {
            Some(id) => {
                if ready {
                    for record in &mut model.records {
                        if R::id(record) == id {
                            *record = saved.clone();
                        }
                    }
                }
                self.inner.notifier.success(format!("{} {id} updated.", capitalized(R::NAME)));
            }
            None => {
                if ready {
                    model.records.push(saved.clone());
                }
                self.inner.notifier.success(format!(
                    "{} {} created.",
                    capitalized(R::NAME),
                    R::id(&saved)
                ));
            }
        }
        model.edit = EditState::Idle;
        Ok(saved)
    }

    // ── Delete ───────────────────────────────────────────────────

    /// First step of a delete: record the intent and hand it to the
    /// rendering surface, which asks the user to confirm.
    pub async fn request_delete(&self, id: RecordId) -> Result<DeleteIntent, CoreError> {
        self.authorize()?;
        R::guard_delete(id, self.principal().as_ref())
            .map_err(|e| self.fail(&format!("Could not delete the {}", R::NAME), e))?;

        let mut model = self.inner.model.lock().await;
        model.ensure_ready()?;
        if model.find(id).is_none() {
            return Err(CoreError::NotFound {
                resource: R::NAME.into(),
                id,
            });
        }

        let intent = DeleteIntent {
            id,
            token: Uuid::new_v4(),
        };
        model.pending_delete = Some(intent.clone());
        Ok(intent)
    }

    /// Second step: the user confirmed. Deletes on the server, then drops
    /// exactly that record from the local list.
    pub async fn confirm_delete(&self, intent: &DeleteIntent) -> Result<(), CoreError> {
        self.authorize()?;
        {
            let mut model = self.inner.model.lock().await;
            model.ensure_ready()?;
            if model.pending_delete.as_ref() != Some(intent) {
                return Err(CoreError::StaleIntent);
            }
            model.pending_delete = None;
        }
        R::guard_delete(intent.id, self.principal().as_ref())
            .map_err(|e| self.fail(&format!("Could not delete the {}", R::NAME), e))?;

        self.inner
            .resource
            .delete(intent.id)
            .await
            .map_err(|e| self.fail(&format!("Could not delete the {}", R::NAME), e.into()))?;

        let mut model = self.inner.model.lock().await;
        if model.state == ViewState::Ready {
            model.records.retain(|record| R::id(record) != intent.id);
        }
        self.inner
            .notifier
            .success(format!("{} {} deleted.", capitalized(R::NAME), intent.id));
        Ok(())
    }

    /// The user declined; forget the pending intent.
    pub async fn cancel_delete(&self) {
        self.inner.model.lock().await.pending_delete = None;
    }
}

// ── Payment-specific lookups ─────────────────────────────────────

impl ViewController<Payments> {
    /// Resolved client name for a payment row, or the placeholder when the
    /// client is not in the loaded list.
    pub async fn client_name(&self, client_id: RecordId) -> String {
        self.inner
            .model
            .lock()
            .await
            .context
            .resolve(client_id)
            .to_owned()
    }

    /// The loaded clients, for a client picker.
    pub async fn clients(&self) -> Vec<Client> {
        self.inner.model.lock().await.context.clients().to_vec()
    }

    pub async fn directory(&self) -> ClientDirectory {
        self.inner.model.lock().await.context.clone()
    }
}

fn capitalized(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::capitalized;

    #[test]
    fn capitalizes_resource_names() {
        assert_eq!(capitalized("payment"), "Payment");
        assert_eq!(capitalized(""), "");
    }
}
