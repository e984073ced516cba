//! User-facing notification seam.
//!
//! An alert blocks until acknowledged and is used when the caller is about to
//! navigate away; a toast is transient and non-blocking.

use tracing::{error, info, warn};

pub const ERROR_HEADING: &str = "Unable to continue";
pub const INFO_HEADING: &str = "Info";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Error,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub heading: String,
    pub text: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            heading: ERROR_HEADING.into(),
            text: text.into(),
            kind: ToastKind::Error,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            heading: INFO_HEADING.into(),
            text: text.into(),
            kind: ToastKind::Info,
        }
    }
}

pub trait Notifier {
    fn alert(&mut self, text: &str);

    fn toast(&mut self, toast: Toast);

    /// Full navigation to `url`. Nothing after this should be user-visible.
    fn navigate(&mut self, url: &str);
}

/// Routes notifications into the tracing pipeline.
#[derive(Debug, Default)]
pub struct LogNotifier {
    pub last_redirect: Option<String>,
}

impl Notifier for LogNotifier {
    fn alert(&mut self, text: &str) {
        warn!(target: "ocean::alert", "{text}");
    }

    fn toast(&mut self, toast: Toast) {
        match toast.kind {
            ToastKind::Error => {
                error!(target: "ocean::toast", heading = %toast.heading, "{}", toast.text)
            }
            ToastKind::Info => {
                info!(target: "ocean::toast", heading = %toast.heading, "{}", toast.text)
            }
        }
    }

    fn navigate(&mut self, url: &str) {
        info!(target: "ocean::navigate", url, "redirect");
        self.last_redirect = Some(url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_notifier_remembers_redirect() {
        let mut n = LogNotifier::default();
        n.toast(Toast::error("boom"));
        n.navigate("/ocean/home");
        assert_eq!(n.last_redirect.as_deref(), Some("/ocean/home"));
    }

    #[test]
    fn toast_constructors_pick_headings() {
        assert_eq!(Toast::error("x").heading, "Unable to continue");
        assert_eq!(Toast::info("x").kind, ToastKind::Info);
    }
}
