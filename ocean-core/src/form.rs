use std::fmt;
use std::str::FromStr;

use crate::error::OceanError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Method {
    Get,
    #[default]
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = OceanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            other => Err(OceanError::Format(format!("unsupported HTTP method: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

/// Request body. `Multipart` leaves content-type and boundary to the
/// transport; `UrlEncoded` is sent as `application/x-www-form-urlencoded`
/// (or as a query string for GET).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormPayload {
    UrlEncoded(Vec<(String, String)>),
    Multipart(Vec<FormPart>),
}

impl Default for FormPayload {
    fn default() -> Self {
        FormPayload::UrlEncoded(Vec::new())
    }
}

impl FormPayload {
    pub fn is_multipart(&self) -> bool {
        matches!(self, FormPayload::Multipart(_))
    }

    /// Total bytes carried by file parts.
    pub fn file_bytes(&self) -> u64 {
        match self {
            FormPayload::UrlEncoded(_) => 0,
            FormPayload::Multipart(parts) => parts
                .iter()
                .map(|p| match p {
                    FormPart::File { bytes, .. } => bytes.len() as u64,
                    FormPart::Text { .. } => 0,
                })
                .sum(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormRequest {
    pub url: String,
    pub method: Method,
    pub payload: FormPayload,
}

impl FormRequest {
    pub fn new(url: impl Into<String>, method: Method) -> Self {
        Self {
            url: url.into(),
            method,
            payload: FormPayload::default(),
        }
    }

    /// Serializes a form the way a submit would: only named fields are sent,
    /// and any file field switches the whole body to multipart.
    pub fn from_form<I>(action: impl Into<String>, method: Method, fields: I) -> Self
    where
        I: IntoIterator<Item = FormPart>,
    {
        let parts: Vec<FormPart> = fields
            .into_iter()
            .filter(|p| !p.name().is_empty())
            .collect();
        let has_file = parts.iter().any(|p| matches!(p, FormPart::File { .. }));
        let payload = if has_file {
            FormPayload::Multipart(parts)
        } else {
            FormPayload::UrlEncoded(
                parts
                    .into_iter()
                    .filter_map(|p| match p {
                        FormPart::Text { name, value } => Some((name, value)),
                        FormPart::File { .. } => None,
                    })
                    .collect(),
            )
        };
        Self {
            url: action.into(),
            method,
            payload,
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        match &mut self.payload {
            FormPayload::UrlEncoded(pairs) => pairs.push((name, value)),
            FormPayload::Multipart(parts) => parts.push(FormPart::Text { name, value }),
        }
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        let part = FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            bytes,
        };
        self.payload = match std::mem::take(&mut self.payload) {
            FormPayload::UrlEncoded(pairs) => {
                let mut parts: Vec<FormPart> = pairs
                    .into_iter()
                    .map(|(name, value)| FormPart::Text { name, value })
                    .collect();
                parts.push(part);
                FormPayload::Multipart(parts)
            }
            FormPayload::Multipart(mut parts) => {
                parts.push(part);
                FormPayload::Multipart(parts)
            }
        };
        self
    }
}
