use serde::{Deserialize, Serialize};

/// Form field names the endpoint reads from a request payload.
///
/// Anything else a form posts is ignored.
pub const FIELD_NAMES: [&str; 9] = [
    "name", "email", "phone", "date", "guests", "location", "referral", "source", "notes",
];

/// Header row of the record store, in column order.
pub const CSV_HEADER: [&str; 10] = [
    "submittedAt",
    "name",
    "email",
    "phone",
    "date",
    "guests",
    "location",
    "referral",
    "source",
    "notes",
];

/// One accepted lead or booking request.
///
/// A `Submission` only exists once the payload has passed validation, so
/// `name`, `email` and `phone` are always non-empty. Every other field is
/// free text and defaults to the empty string. `guests` is kept as the text
/// the visitor typed; it is never parsed as a number.
///
/// It is appended to the record store as one CSV row (see [`CSV_HEADER`]) and
/// never touched again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// ISO-8601 timestamp with offset, taken when the row is written.
    #[serde(rename = "submittedAt")]
    pub submitted_at: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Requested event date, as typed in the form.
    pub date: String,
    pub guests: String,
    pub location: String,
    /// How the visitor heard about the restaurant.
    pub referral: String,
    /// Which form produced the submission (`quick-lead`, `form`, ...).
    pub source: String,
    pub notes: String,
}

impl Submission {
    /// Field values in [`CSV_HEADER`] order.
    pub fn record(&self) -> [&str; 10] {
        [
            &self.submitted_at,
            &self.name,
            &self.email,
            &self.phone,
            &self.date,
            &self.guests,
            &self.location,
            &self.referral,
            &self.source,
            &self.notes,
        ]
    }
}
