//! In-memory doubles for the browser seams.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use async_trait::async_trait;
use contact_common::{ContactPayload, Envelope, FormValues};

use super::draft::{DraftStore, StorageError};
use super::transport::{ContactTransport, NetworkError, ServerReply};

/// Keeps the draft as the same JSON string local storage would hold.
#[derive(Default)]
pub struct MemoryDraftStore {
    record: RefCell<Option<String>>,
    broken: Cell<bool>,
}

impl MemoryDraftStore {
    pub fn with_draft(values: &FormValues) -> Self {
        let store = Self::default();
        *store.record.borrow_mut() = serde_json::to_string(values).ok();
        store
    }

    /// Every operation fails, like a browser with storage disabled.
    pub fn broken() -> Self {
        let store = Self::default();
        store.broken.set(true);
        store
    }

    pub fn raw(&self) -> Option<String> {
        self.record.borrow().clone()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.broken.get() {
            return Err(StorageError::Unavailable);
        }
        Ok(())
    }
}

impl DraftStore for MemoryDraftStore {
    fn load(&self) -> Result<Option<FormValues>, StorageError> {
        self.check()?;
        match self.record.borrow().as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, values: &FormValues) -> Result<(), StorageError> {
        self.check()?;
        *self.record.borrow_mut() = Some(serde_json::to_string(values)?);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.check()?;
        *self.record.borrow_mut() = None;
        Ok(())
    }
}

/// Replays queued replies and records every payload it was handed.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: RefCell<VecDeque<Result<ServerReply, NetworkError>>>,
    requests: RefCell<Vec<ContactPayload>>,
}

impl ScriptedTransport {
    pub fn reply(&self, status: u16, envelope: Envelope) -> &Self {
        self.replies.borrow_mut().push_back(Ok(ServerReply {
            status,
            envelope: Some(envelope),
        }));
        self
    }

    pub fn reply_raw(&self, reply: ServerReply) -> &Self {
        self.replies.borrow_mut().push_back(Ok(reply));
        self
    }

    pub fn fail(&self, error: NetworkError) -> &Self {
        self.replies.borrow_mut().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<ContactPayload> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl ContactTransport for ScriptedTransport {
    async fn submit(&self, payload: &ContactPayload) -> Result<ServerReply, NetworkError> {
        self.requests.borrow_mut().push(payload.clone());
        // Give concurrently polled submissions a chance to run.
        tokio::task::yield_now().await;
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(NetworkError::Request("no scripted reply".to_string())))
    }
}
