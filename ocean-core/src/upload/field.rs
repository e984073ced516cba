use crate::upload::chunked::UploadEvent;

#[derive(Clone, Debug, PartialEq)]
pub enum FieldState {
    /// File picker shown, nothing stored.
    Picking,
    Uploading {
        file_name: String,
        progress: f64,
    },
    /// Picker replaced by `Uploaded: <name>` and a reset control.
    Uploaded {
        file_name: String,
        file_id: String,
    },
    /// Upload stopped at `index`; only reset is possible.
    Failed {
        index: u64,
        reason: String,
    },
}

/// Model of a file-picker form field backed by a chunked upload: the hidden
/// id/name stores a form later submits, the submit control and the progress
/// bar.
#[derive(Clone, Debug)]
pub struct UploadField {
    state: FieldState,
    pub file_id_store: String,
    pub file_name_store: String,
    submit_enabled: bool,
    progress_visible: bool,
}

impl Default for UploadField {
    fn default() -> Self {
        Self {
            state: FieldState::Picking,
            file_id_store: String::new(),
            file_name_store: String::new(),
            submit_enabled: true,
            progress_visible: false,
        }
    }
}

impl UploadField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FieldState {
        &self.state
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn progress_visible(&self) -> bool {
        self.progress_visible
    }

    pub fn input_visible(&self) -> bool {
        !matches!(self.state, FieldState::Uploaded { .. })
    }

    pub fn can_reset(&self) -> bool {
        matches!(
            self.state,
            FieldState::Uploaded { .. } | FieldState::Failed { .. }
        )
    }

    pub fn display_text(&self) -> Option<String> {
        match &self.state {
            FieldState::Uploaded { file_name, .. } => Some(format!("Uploaded: {file_name}")),
            _ => None,
        }
    }

    pub fn apply(&mut self, event: &UploadEvent) {
        match event {
            UploadEvent::Started { file_name, .. } => {
                self.submit_enabled = false;
                self.progress_visible = true;
                self.state = FieldState::Uploading {
                    file_name: file_name.clone(),
                    progress: 0.0,
                };
            }
            UploadEvent::ChunkAcknowledged { progress, .. } => {
                if let FieldState::Uploading { progress: p, .. } = &mut self.state {
                    *p = *progress;
                }
            }
            UploadEvent::Completed(receipt) => {
                let local = match &self.state {
                    FieldState::Uploading { file_name, .. } => file_name.clone(),
                    _ => receipt.file_name.clone(),
                };
                self.file_id_store = receipt.file_id.clone();
                self.file_name_store = receipt.file_name.clone();
                self.submit_enabled = true;
                self.progress_visible = false;
                self.state = FieldState::Uploaded {
                    file_name: local,
                    file_id: receipt.file_id.clone(),
                };
            }
            UploadEvent::Failed { index, reason } => {
                self.state = FieldState::Failed {
                    index: *index,
                    reason: reason.clone(),
                };
            }
        }
    }

    /// Back to the pre-upload state: stores cleared, picker re-enabled.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
