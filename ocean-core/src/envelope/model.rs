use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OceanError, Result};

const REQUIRED_KEYS: [&str; 3] = ["messages", "errors", "redirect"];

/// Standard `{messages, errors, redirect, data}` server response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub messages: Vec<String>,
    pub errors: Vec<String>,
    pub redirect: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl ResponseEnvelope {
    /// Parses a response body. All of `messages`, `errors` and `redirect` must
    /// be present as keys; `redirect` may be null and `data` may be absent.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| OceanError::InvalidEnvelope(format!("not JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| OceanError::InvalidEnvelope("expected a JSON object".into()))?;
        if let Some(missing) = REQUIRED_KEYS.iter().find(|k| !obj.contains_key(**k)) {
            return Err(OceanError::InvalidEnvelope(format!("missing `{missing}`")));
        }
        let mut env: ResponseEnvelope = serde_json::from_value(value)
            .map_err(|e| OceanError::InvalidEnvelope(e.to_string()))?;
        // an empty redirect string never navigates
        if env.redirect.as_deref().is_some_and(|r| r.trim().is_empty()) {
            env.redirect = None;
        }
        Ok(env)
    }

    pub fn is_error(&self) -> bool {
        !self.errors.is_empty()
    }
}
