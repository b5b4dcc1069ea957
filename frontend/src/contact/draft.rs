use std::rc::Rc;

use contact_common::FormValues;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("local storage is not available")]
    Unavailable,
    #[error("storage operation failed: {0}")]
    Operation(String),
    #[error("draft record is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The single saved copy of an unfinished form.
pub trait DraftStore {
    fn load(&self) -> Result<Option<FormValues>, StorageError>;
    fn save(&self, values: &FormValues) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

impl<S: DraftStore + ?Sized> DraftStore for Rc<S> {
    fn load(&self) -> Result<Option<FormValues>, StorageError> {
        (**self).load()
    }

    fn save(&self, values: &FormValues) -> Result<(), StorageError> {
        (**self).save(values)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::LocalStorageDraftStore;

#[cfg(target_arch = "wasm32")]
mod browser {
    use contact_common::{FormValues, DRAFT_KEY};
    use web_sys::Storage;

    use super::{DraftStore, StorageError};

    /// `window.localStorage` under [`DRAFT_KEY`].
    #[derive(Debug, Clone, Copy, Default)]
    pub struct LocalStorageDraftStore;

    impl LocalStorageDraftStore {
        fn storage(&self) -> Result<Storage, StorageError> {
            web_sys::window()
                .ok_or(StorageError::Unavailable)?
                .local_storage()
                .map_err(|e| StorageError::Operation(format!("{:?}", e)))?
                .ok_or(StorageError::Unavailable)
        }
    }

    impl DraftStore for LocalStorageDraftStore {
        fn load(&self) -> Result<Option<FormValues>, StorageError> {
            let raw = self
                .storage()?
                .get_item(DRAFT_KEY)
                .map_err(|e| StorageError::Operation(format!("{:?}", e)))?;
            match raw {
                Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
                None => Ok(None),
            }
        }

        fn save(&self, values: &FormValues) -> Result<(), StorageError> {
            let raw = serde_json::to_string(values)?;
            self.storage()?
                .set_item(DRAFT_KEY, &raw)
                .map_err(|e| StorageError::Operation(format!("{:?}", e)))
        }

        fn clear(&self) -> Result<(), StorageError> {
            self.storage()?
                .remove_item(DRAFT_KEY)
                .map_err(|e| StorageError::Operation(format!("{:?}", e)))
        }
    }
}
