pub mod controller;
pub mod draft;
pub mod presenter;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{FormController, SubmissionState, SubmitOutcome};
pub use draft::{DraftStore, StorageError};
pub use presenter::{FieldPresenter, FormView, MessageKind, ViewState};
pub use transport::{ContactTransport, NetworkError, ServerReply};
