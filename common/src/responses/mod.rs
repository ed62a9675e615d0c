//! JSON bodies returned by the submission endpoint on its JSON path.
//!
//! The backend serializes [`AcceptedResponse`] and [`RejectedResponse`]; the
//! browser client only needs the `ok` flag and the optional `error` label, so
//! it reads replies through the looser [`SubmitReply`].

use serde::{Deserialize, Serialize};

/// Label carried by every validation failure reply.
pub const VALIDATION_FAILED: &str = "Validation failed";

/// Reply for a submission that passed validation.
///
/// The two flags are independent: a row can be saved while the email fails,
/// and the other way round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedResponse {
    pub ok: bool,
    pub email_sent: bool,
    pub csv_saved: bool,
}

impl AcceptedResponse {
    pub fn new(email_sent: bool, csv_saved: bool) -> Self {
        Self {
            ok: true,
            email_sent,
            csv_saved,
        }
    }
}

/// Reply for a submission rejected by validation (HTTP 422).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedResponse {
    pub ok: bool,
    pub error: String,
    pub fields: FieldErrors,
}

impl RejectedResponse {
    pub fn new(fields: FieldErrors) -> Self {
        Self {
            ok: false,
            error: VALIDATION_FAILED.to_string(),
            fields,
        }
    }
}

/// Per-field validation messages. Only violated fields are serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of violated fields.
    pub fn len(&self) -> usize {
        [&self.name, &self.email, &self.phone]
            .iter()
            .filter(|f| f.is_some())
            .count()
    }
}

/// Shape-agnostic view of any endpoint reply, used by the browser client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitReply {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}
