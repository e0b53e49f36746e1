//! Real-time content stores.
//!
//! Both stores subscribe to one Firestore collection and republish the
//! **complete** current contents on every remote change; consumers never see
//! diffs. A batch containing any document that fails its shape check is
//! suppressed whole and reported through `on_error` instead. Neither store
//! retries: delivery guarantees are whatever the underlying listen stream
//! provides, and reconnection is the presenter's decision (driven by the
//! connectivity monitor).
//!
//! `subscribe` is a fire-and-forget registration; it spawns a pump task on
//! the ambient Tokio runtime and returns immediately. Callbacks run on that
//! task, in stream order for a single registration. The embedding shell is
//! expected to marshal them onto its UI context, typically by pointing them
//! at a channel drained there.

pub mod models;


use self::models::{ContentItem, LabelEntry, ParseError, Section};
use crate::firestore::models::{Document, ListenEvent, TargetChangeType};
use crate::firestore::{FirestoreClient, FirestoreError};
use futures::StreamExt;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::AbortHandle;

/// Collection holding the bilingual UI labels.
pub const LABELS_COLLECTION: &str = "traducciones";

/// Sort field of the tutorial collections.
pub const ORDER_FIELD: &str = "order";

/// Errors a store reports through `on_error`. Neither variant is fatal to
/// the process; the presenter maps both to its disconnected placeholder.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The remote store denied or dropped the subscription.
    #[error("subscription failed: {0}")]
    Subscription(String),
    /// A document in the batch did not match the expected shape.
    #[error(transparent)]
    Deserialization(#[from] ParseError),
}

impl From<FirestoreError> for StoreError {
    fn from(e: FirestoreError) -> Self {
        Self::Subscription(e.to_string())
    }
}

struct Callbacks<T> {
    on_snapshot: Box<dyn Fn(Vec<T>) + Send>,
    on_error: Box<dyn Fn(StoreError) + Send>,
}

/// Gate between the pump task and the subscriber's callbacks.
///
/// `close` drops the callbacks while holding the lock, so once it returns no
/// callback can begin; a change that arrives after teardown hits an empty
/// slot and is discarded.
pub(crate) struct Emitter<T> {
    slot: Mutex<Option<Callbacks<T>>>,
}

impl<T> Emitter<T> {
    fn new(
        on_snapshot: impl Fn(Vec<T>) + Send + 'static,
        on_error: impl Fn(StoreError) + Send + 'static,
    ) -> Self {
        Self {
            slot: Mutex::new(Some(Callbacks {
                on_snapshot: Box::new(on_snapshot),
                on_error: Box::new(on_error),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Callbacks<T>>> {
        match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(crate) fn snapshot(&self, items: Vec<T>) {
        if let Some(callbacks) = &*self.lock() {
            (callbacks.on_snapshot)(items);
        }
    }

    pub(crate) fn error(&self, err: StoreError) {
        if let Some(callbacks) = &*self.lock() {
            (callbacks.on_error)(err);
        }
    }

    pub(crate) fn close(&self) {
        *self.lock() = None;
    }
}

trait Close: Send + Sync {
    fn close(&self);
}

impl<T: Send> Close for Emitter<T> {
    fn close(&self) {
        Emitter::close(self);
    }
}

/// Handle to one live subscription. Dropping it removes the listener.
pub struct ListenerRegistration {
    gate: Arc<dyn Close>,
    abort: AbortHandle,
}

impl ListenerRegistration {
    /// Releases the subscription. Idempotent; once this returns, no further
    /// callback fires.
    pub fn remove(&self) {
        self.gate.close();
        self.abort.abort();
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Folds raw listen events into the collection's full current contents.
///
/// Documents are keyed by resource name; a snapshot is emitted at each
/// consistency marker (a `NO_CHANGE` target change once the target has gone
/// `CURRENT`). `RESET` discards everything including the current flag.
pub(crate) struct SnapshotAssembler {
    docs: BTreeMap<String, Document>,
    current: bool,
}

impl SnapshotAssembler {
    pub(crate) fn new() -> Self {
        Self {
            docs: BTreeMap::new(),
            current: false,
        }
    }

    pub(crate) fn apply(&mut self, event: ListenEvent) -> Option<Vec<Document>> {
        if let Some(change) = event.document_change {
            self.docs.insert(change.document.name.clone(), change.document);
        }
        if let Some(delete) = event.document_delete {
            self.docs.remove(&delete.document);
        }
        if let Some(remove) = event.document_remove {
            self.docs.remove(&remove.document);
        }

        if let Some(target_change) = event.target_change {
            match target_change.target_change_type {
                TargetChangeType::Current => self.current = true,
                TargetChangeType::Reset => {
                    self.docs.clear();
                    self.current = false;
                }
                TargetChangeType::NoChange if self.current => {
                    return Some(self.docs.values().cloned().collect());
                }
                _ => {}
            }
        }

        None
    }
}

/// Consumes one listen stream, turning consistent document sets into typed
/// snapshots. Ends on a stream error (no retry); a malformed batch only
/// suppresses that batch.
async fn pump<T: Send>(
    client: FirestoreClient,
    collection: String,
    order_by: Option<&'static str>,
    parse: impl Fn(&Document) -> Result<T, ParseError> + Send,
    finish: impl Fn(&mut Vec<T>) + Send,
    emitter: Arc<Emitter<T>>,
) {
    let mut stream = match client.listen_collection(&collection, order_by).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("listen on {collection} failed to open: {e}");
            emitter.error(e.into());
            return;
        }
    };
    debug!("listening on {collection}");

    let mut assembler = SnapshotAssembler::new();
    while let Some(event) = stream.next().await {
        match event {
            Ok(event) => {
                let Some(docs) = assembler.apply(event) else {
                    continue;
                };
                match docs.iter().map(&parse).collect::<Result<Vec<T>, _>>() {
                    Ok(mut items) => {
                        finish(&mut items);
                        emitter.snapshot(items);
                    }
                    Err(e) => {
                        warn!("suppressing malformed snapshot of {collection}: {e}");
                        emitter.error(StoreError::Deserialization(e));
                    }
                }
            }
            Err(e) => {
                warn!("listen on {collection} ended: {e}");
                emitter.error(e.into());
                return;
            }
        }
    }
    debug!("listen on {collection} closed by server");
}

fn register<T: Send + 'static>(
    client: FirestoreClient,
    collection: String,
    order_by: Option<&'static str>,
    parse: impl Fn(&Document) -> Result<T, ParseError> + Send + 'static,
    finish: impl Fn(&mut Vec<T>) + Send + 'static,
    on_snapshot: impl Fn(Vec<T>) + Send + 'static,
    on_error: impl Fn(StoreError) + Send + 'static,
) -> ListenerRegistration {
    let emitter = Arc::new(Emitter::new(on_snapshot, on_error));
    let task = tokio::spawn(pump(
        client,
        collection,
        order_by,
        parse,
        finish,
        Arc::clone(&emitter),
    ));

    ListenerRegistration {
        gate: emitter,
        abort: task.abort_handle(),
    }
}

/// Live view of the `traducciones` collection of bilingual UI labels.
#[derive(Clone)]
pub struct LabelStore {
    client: FirestoreClient,
}

impl LabelStore {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Starts listening. Every remote change delivers the complete current
    /// label set to `on_snapshot`. Must be called within a Tokio runtime.
    pub fn subscribe(
        &self,
        on_snapshot: impl Fn(Vec<LabelEntry>) + Send + 'static,
        on_error: impl Fn(StoreError) + Send + 'static,
    ) -> ListenerRegistration {
        register(
            self.client.clone(),
            LABELS_COLLECTION.to_string(),
            None,
            LabelEntry::from_document,
            |_: &mut Vec<LabelEntry>| {},
            on_snapshot,
            on_error,
        )
    }
}

/// Live view of one tutorial section's ordered steps.
///
/// An instance is bound to its collection for life; showing a different
/// section means dropping this store and creating a new one.
#[derive(Clone)]
pub struct TutorialStore {
    client: FirestoreClient,
    collection: String,
}

impl TutorialStore {
    pub fn new(client: FirestoreClient, section: Section) -> Self {
        Self {
            client,
            collection: section.collection_name().to_string(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Starts listening. Items are delivered ascending by `order`: the query
    /// asks the server for that order, and a stable client-side sort keeps
    /// the contract independent of backend behavior. Must be called within a
    /// Tokio runtime.
    pub fn subscribe(
        &self,
        on_snapshot: impl Fn(Vec<ContentItem>) + Send + 'static,
        on_error: impl Fn(StoreError) + Send + 'static,
    ) -> ListenerRegistration {
        register(
            self.client.clone(),
            self.collection.clone(),
            Some(ORDER_FIELD),
            ContentItem::from_document,
            |items: &mut Vec<ContentItem>| items.sort_by_key(|item| item.order),
            on_snapshot,
            on_error,
        )
    }
}
