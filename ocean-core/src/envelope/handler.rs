use tracing::{debug, warn};

use crate::envelope::model::ResponseEnvelope;
use crate::error::{OceanError, Result};
use crate::form::FormRequest;
use crate::notify::{Notifier, Toast};
use crate::transport::{RawResponse, Transport};

pub const INVALID_RESPONSE_TEXT: &str = "Invalid server response";

/// Which envelope contents are shown to the user. Callbacks and redirects
/// run regardless.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PopupPolicy {
    pub errors: bool,
    pub messages: bool,
}

impl Default for PopupPolicy {
    fn default() -> Self {
        Self {
            errors: true,
            messages: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Success(ResponseEnvelope),
    /// Envelope with a non-empty `errors` list.
    Errored(ResponseEnvelope),
    /// Body did not match the envelope shape.
    Malformed(String),
    /// Network failure or non-2xx status.
    Transport(String),
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        !matches!(self, Outcome::Success(_))
    }

    pub fn envelope(&self) -> Option<&ResponseEnvelope> {
        match self {
            Outcome::Success(env) | Outcome::Errored(env) => Some(env),
            Outcome::Malformed(_) | Outcome::Transport(_) => None,
        }
    }

    pub fn redirect(&self) -> Option<&str> {
        self.envelope().and_then(|e| e.redirect.as_deref())
    }
}

type SuccessFn<'a> = Box<dyn FnOnce(&ResponseEnvelope) + 'a>;
type ErrorFn<'a> = Box<dyn FnOnce(&Outcome) + 'a>;

/// Optional caller hooks; a missing hook is a no-op.
#[derive(Default)]
pub struct Callbacks<'a> {
    on_success: Option<SuccessFn<'a>>,
    on_error: Option<ErrorFn<'a>>,
}

impl<'a> Callbacks<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, f: impl FnOnce(&ResponseEnvelope) + 'a) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(&Outcome) + 'a) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    fn dispatch(self, outcome: &Outcome) {
        match outcome {
            Outcome::Success(env) => {
                if let Some(f) = self.on_success {
                    f(env);
                }
            }
            other => {
                if let Some(f) = self.on_error {
                    f(other);
                }
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ResponseContractHandler {
    pub popups: PopupPolicy,
}

impl ResponseContractHandler {
    pub fn new(popups: PopupPolicy) -> Self {
        Self { popups }
    }

    /// Sends `req` and runs the full envelope contract on whatever comes back.
    pub async fn request<T, N>(
        &self,
        transport: &T,
        req: &FormRequest,
        notifier: &mut N,
        callbacks: Callbacks<'_>,
    ) -> Outcome
    where
        T: Transport,
        N: Notifier + ?Sized,
    {
        debug!(method = %req.method, url = %req.url, "submitting form");
        let result = transport.submit(req).await;
        self.handle_result(result, notifier, callbacks)
    }

    pub fn handle_result<N: Notifier + ?Sized>(
        &self,
        result: Result<RawResponse>,
        notifier: &mut N,
        callbacks: Callbacks<'_>,
    ) -> Outcome {
        match result {
            Ok(raw) if raw.is_success() => self.handle_body(&raw.body, notifier, callbacks),
            Ok(raw) => {
                let err = OceanError::Status {
                    status: raw.status,
                    body: String::from_utf8_lossy(&raw.body).into_owned(),
                };
                self.handle_transport_error(&err, notifier, callbacks)
            }
            Err(err) => self.handle_transport_error(&err, notifier, callbacks),
        }
    }

    pub fn handle_body<N: Notifier + ?Sized>(
        &self,
        body: &[u8],
        notifier: &mut N,
        callbacks: Callbacks<'_>,
    ) -> Outcome {
        match ResponseEnvelope::parse(body) {
            Ok(env) => self.handle_envelope(env, notifier, callbacks),
            Err(err) => {
                warn!(error = %err, "server response is not an envelope");
                notifier.toast(Toast::error(INVALID_RESPONSE_TEXT));
                let outcome = Outcome::Malformed(err.to_string());
                callbacks.dispatch(&outcome);
                outcome
            }
        }
    }

    pub fn handle_envelope<N: Notifier + ?Sized>(
        &self,
        env: ResponseEnvelope,
        notifier: &mut N,
        callbacks: Callbacks<'_>,
    ) -> Outcome {
        let leaving = env.redirect.is_some();

        if env.is_error() {
            if self.popups.errors {
                let text = env.errors.join("\n");
                if leaving {
                    notifier.alert(&format!("Error(s) occurred: {text}"));
                } else {
                    notifier.toast(Toast::error(text));
                }
            }
        } else if !env.messages.is_empty() && self.popups.messages {
            let text = env.messages.join("\n");
            if leaving {
                notifier.alert(&format!("Info: {text}"));
            } else {
                notifier.toast(Toast::info(text));
            }
        }

        let outcome = if env.is_error() {
            Outcome::Errored(env)
        } else {
            Outcome::Success(env)
        };
        callbacks.dispatch(&outcome);

        if let Some(url) = outcome.redirect() {
            notifier.navigate(url);
        }
        outcome
    }

    pub fn handle_transport_error<N: Notifier + ?Sized>(
        &self,
        err: &OceanError,
        notifier: &mut N,
        callbacks: Callbacks<'_>,
    ) -> Outcome {
        warn!(error = %err, "request failed");
        notifier.alert(&format!("An error occurred: {err}"));
        let outcome = Outcome::Transport(err.to_string());
        callbacks.dispatch(&outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Method;
    use crate::testing::{MockTransport, Notice, RecordingNotifier};
    use std::cell::Cell;

    fn body(v: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&v).unwrap()
    }

    #[test]
    fn errors_with_redirect_alert_then_navigate() {
        let h = ResponseContractHandler::default();
        let mut n = RecordingNotifier::default();
        let errored = Cell::new(false);
        let outcome = h.handle_body(
            &body(serde_json::json!({
                "messages": [],
                "errors": ["Not allowed", "Log in again"],
                "redirect": "/ocean/login"
            })),
            &mut n,
            Callbacks::none()
                .on_success(|_| panic!("success callback must not run"))
                .on_error(|_| errored.set(true)),
        );
        assert!(errored.get());
        assert!(matches!(outcome, Outcome::Errored(_)));
        assert_eq!(
            n.notices,
            vec![
                Notice::Alert("Error(s) occurred: Not allowed\nLog in again".into()),
                Notice::Navigate("/ocean/login".into()),
            ]
        );
    }

    #[test]
    fn errors_without_redirect_use_a_toast() {
        let h = ResponseContractHandler::default();
        let mut n = RecordingNotifier::default();
        h.handle_body(
            &body(serde_json::json!({"messages": [], "errors": ["Nope"], "redirect": null})),
            &mut n,
            Callbacks::none(),
        );
        assert_eq!(n.notices, vec![Notice::Toast(Toast::error("Nope"))]);
    }

    #[test]
    fn messages_follow_the_same_split() {
        let h = ResponseContractHandler::default();
        let mut n = RecordingNotifier::default();
        let mut seen = None;
        h.handle_body(
            &body(serde_json::json!({
                "messages": ["Saved"], "errors": [], "redirect": null, "data": 3
            })),
            &mut n,
            Callbacks::none().on_success(|env| seen = Some(env.data.clone())),
        );
        assert_eq!(seen, Some(serde_json::json!(3)));
        assert_eq!(n.notices, vec![Notice::Toast(Toast::info("Saved"))]);

        let mut n = RecordingNotifier::default();
        h.handle_body(
            &body(serde_json::json!({"messages": ["Saved"], "errors": [], "redirect": "/next"})),
            &mut n,
            Callbacks::none(),
        );
        assert_eq!(
            n.notices,
            vec![Notice::Alert("Info: Saved".into()), Notice::Navigate("/next".into())]
        );
    }

    #[test]
    fn missing_errors_key_is_malformed_and_skips_success() {
        let h = ResponseContractHandler::default();
        let mut n = RecordingNotifier::default();
        let errored = Cell::new(false);
        let outcome = h.handle_body(
            &body(serde_json::json!({"messages": ["hi"], "redirect": null})),
            &mut n,
            Callbacks::none()
                .on_success(|_| panic!("success callback must not run"))
                .on_error(|o| {
                    assert!(matches!(o, Outcome::Malformed(_)));
                    errored.set(true);
                }),
        );
        assert!(outcome.is_error());
        assert!(errored.get());
        assert_eq!(n.notices, vec![Notice::Toast(Toast::error(INVALID_RESPONSE_TEXT))]);
    }

    #[test]
    fn popups_can_be_suppressed_without_losing_redirect() {
        let h = ResponseContractHandler::new(PopupPolicy {
            errors: false,
            messages: false,
        });
        let mut n = RecordingNotifier::default();
        h.handle_body(
            &body(serde_json::json!({"messages": [], "errors": ["x"], "redirect": "/away"})),
            &mut n,
            Callbacks::none(),
        );
        assert_eq!(n.notices, vec![Notice::Navigate("/away".into())]);
    }

    #[test]
    fn non_success_status_alerts_with_error_text() {
        let h = ResponseContractHandler::default();
        let mut n = RecordingNotifier::default();
        let outcome = h.handle_result(
            Ok(RawResponse {
                status: 500,
                final_url: None,
                body: b"Internal Server Error".to_vec(),
            }),
            &mut n,
            Callbacks::none(),
        );
        assert!(matches!(outcome, Outcome::Transport(_)));
        match &n.notices[..] {
            [Notice::Alert(text)] => {
                assert!(text.starts_with("An error occurred: "));
                assert!(text.contains("500"));
            }
            other => panic!("unexpected notices {other:?}"),
        }
    }

    #[tokio::test]
    async fn request_routes_through_transport() {
        let transport = MockTransport::default();
        transport.push_submit_response(
            200,
            br#"{"messages":["Deleted 2 files"],"errors":[],"redirect":null}"#,
        );
        let h = ResponseContractHandler::default();
        let mut n = RecordingNotifier::default();
        let req = FormRequest::new("/ocean/filespace/delete", Method::Post).field("ids", "1,2");
        let outcome = h.request(&transport, &req, &mut n, Callbacks::none()).await;

        assert!(!outcome.is_error());
        assert_eq!(transport.submitted(), vec![req]);
        assert_eq!(n.notices, vec![Notice::Toast(Toast::info("Deleted 2 files"))]);
    }
}
