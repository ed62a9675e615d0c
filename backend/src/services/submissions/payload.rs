//! Reads a submission request body into a normalized field map.
//!
//! The endpoint accepts three body shapes: a JSON object, URL-encoded form
//! fields, and multipart form fields. Whatever cannot be read (a malformed
//! JSON body, a JSON array, an unknown content type, a body over the size
//! limit) becomes an empty map. The empty map then fails validation like any
//! other incomplete submission.

use std::sync::LazyLock;

use actix_multipart::Multipart;
use actix_web::{
    http::header::{HeaderMap, CONTENT_TYPE},
    web::{self, BytesMut},
};
use common::model::submission::{Submission, FIELD_NAMES};
use futures_util::StreamExt;
use log::debug;
use regex::Regex;
use serde_json::{Map, Value};

// a tag opens only when `<` is directly followed by a non-space character
static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^\s>][^>]*(?:>|$)").expect("tag pattern is valid"));
static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+").expect("line break pattern is valid"));

/// How the client posted, which also decides how the reply is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// `fetch` with a JSON body; answered with JSON.
    Json,
    /// Native browser form post; answered with a redirect.
    Form,
}

impl RequestShape {
    pub fn of(headers: &HeaderMap) -> Self {
        if content_type(headers).contains("application/json") {
            Self::Json
        } else {
            Self::Form
        }
    }
}

/// Normalized request payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub shape: RequestShape,
    pub fields: Map<String, Value>,
}

impl Payload {
    /// `true` when a native form post carried at least one field.
    pub fn is_filled_form(&self) -> bool {
        self.shape == RequestShape::Form && !self.fields.is_empty()
    }
}

fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Reads and normalizes the request body, never failing.
pub async fn read_payload(headers: &HeaderMap, body: web::Payload, limit: usize) -> Payload {
    let shape = RequestShape::of(headers);
    let content_type = content_type(headers);

    let fields = if shape == RequestShape::Json {
        match collect_body(body, limit).await {
            Some(bytes) => parse_json(&bytes),
            None => Map::new(),
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        match collect_body(body, limit).await {
            Some(bytes) => parse_urlencoded(&bytes),
            None => Map::new(),
        }
    } else if content_type.starts_with("multipart/form-data") {
        read_multipart(Multipart::new(headers, body), limit).await
    } else {
        debug!("Unsupported content type `{content_type}`, treating body as empty");
        Map::new()
    };

    Payload {
        shape,
        fields: normalize(fields),
    }
}

async fn collect_body(mut body: web::Payload, limit: usize) -> Option<BytesMut> {
    let mut bytes = BytesMut::new();
    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                debug!("Could not read request body: {e}");
                return None;
            }
        };
        if bytes.len() + chunk.len() > limit {
            debug!("Request body over {limit} bytes, treating as empty");
            return None;
        }
        bytes.extend_from_slice(&chunk);
    }
    Some(bytes)
}

/// Anything but a JSON object is an empty payload.
pub fn parse_json(bytes: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            debug!("JSON body is not an object, treating as empty");
            Map::new()
        }
        Err(e) => {
            debug!("Malformed JSON body, treating as empty: {e}");
            Map::new()
        }
    }
}

/// Repeated keys keep the last value.
pub fn parse_urlencoded(bytes: &[u8]) -> Map<String, Value> {
    url::form_urlencoded::parse(bytes)
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect()
}

async fn read_multipart(mut multipart: Multipart, limit: usize) -> Map<String, Value> {
    let mut fields = Map::new();
    let mut total = 0usize;

    while let Some(item) = multipart.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) => {
                debug!("Malformed multipart body, treating as empty: {e}");
                return Map::new();
            }
        };

        let disposition = field.content_disposition();
        let name = disposition.and_then(|cd| cd.get_name().map(str::to_string));
        let is_file = disposition.is_some_and(|cd| cd.get_filename().is_some());

        let mut value = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    debug!("Malformed multipart field, treating body as empty: {e}");
                    return Map::new();
                }
            };
            total += chunk.len();
            if total > limit {
                debug!("Multipart body over {limit} bytes, treating as empty");
                return Map::new();
            }
            if !is_file {
                value.extend_from_slice(&chunk);
            }
        }

        if let (Some(name), false) = (name, is_file) {
            let text = String::from_utf8_lossy(&value).into_owned();
            fields.insert(name, Value::String(text));
        }
    }

    fields
}

/// Applies [`sanitize`] to every string value; other values are left as they are.
pub fn normalize(fields: Map<String, Value>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => (key, Value::String(sanitize(&s))),
            other => (key, other),
        })
        .collect()
}

/// Trims, strips markup tags, and folds line breaks into single spaces.
pub fn sanitize(value: &str) -> String {
    let trimmed = value.trim();
    let stripped = TAGS.replace_all(trimmed, "");
    LINE_BREAKS.replace_all(&stripped, " ").into_owned()
}

/// Text view of one payload field. `null` and missing fields are empty;
/// numbers, booleans and nested values use their JSON text.
pub fn field_text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// The recognised fields of a payload, as text, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub guests: String,
    pub location: String,
    pub referral: String,
    pub source: String,
    pub notes: String,
}

impl LeadForm {
    /// Picks the recognised fields out of `payload`. A missing `source` is
    /// `"form"` for a non-empty native form post and empty otherwise.
    pub fn from_payload(payload: &Payload) -> Self {
        let [name, email, phone, date, guests, location, referral, source, notes] =
            FIELD_NAMES.map(|key| field_text(&payload.fields, key));
        let default_source = if payload.is_filled_form() { "form" } else { "" };

        Self {
            name: name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            phone: phone.unwrap_or_default(),
            date: date.unwrap_or_default(),
            guests: guests.unwrap_or_default(),
            location: location.unwrap_or_default(),
            referral: referral.unwrap_or_default(),
            source: source.unwrap_or_else(|| default_source.to_string()),
            notes: notes.unwrap_or_default(),
        }
    }

    /// Stamps a validated form into a [`Submission`].
    pub fn into_submission(self, submitted_at: String) -> Submission {
        Submission {
            submitted_at,
            name: self.name,
            email: self.email,
            phone: self.phone,
            date: self.date,
            guests: self.guests,
            location: self.location,
            referral: self.referral,
            source: self.source,
            notes: self.notes,
        }
    }
}
