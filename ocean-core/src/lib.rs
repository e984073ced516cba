#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod form;
pub mod notify;
pub mod selection;
pub mod timeoffset;
pub mod transport;

pub mod envelope {
    pub mod handler;
    pub mod model;
}

pub mod upload {
    pub mod chunked;
    pub mod field;
    pub mod keepalive;
    pub mod session;
    pub mod whole_form;
}

#[cfg(test)]
pub(crate) mod testing;

// Re-exports: stable API surface
pub use config::ClientConfig;
pub use envelope::handler::{Callbacks, Outcome, PopupPolicy, ResponseContractHandler};
pub use envelope::model::ResponseEnvelope;
pub use form::{FormPart, FormPayload, FormRequest, Method};
pub use notify::{LogNotifier, Notifier, Toast};
pub use selection::SelectionList;
pub use timeoffset::{OffsetLabels, TimeOffsetCalculator};
pub use transport::{HttpTransport, Transport};
pub use upload::chunked::{ChunkUploader, UploadEvent, UploadReceipt};
pub use upload::field::{FieldState, UploadField};
pub use upload::session::UploadSession;
pub use upload::whole_form::{FormOutcome, FormUploader};
