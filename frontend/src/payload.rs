use common::responses::SubmitReply;
use serde_json::{Map, Value};

/// Message shown when the endpoint refuses without saying why.
pub const SUBMISSION_FAILED: &str = "Submission failed";

/// Builds the JSON body from form entries: values are trimmed, and `source`
/// overrides whatever the form carried.
pub fn build_payload<I>(entries: I, source: Option<&str>) -> Map<String, Value>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut payload: Map<String, Value> = entries
        .into_iter()
        .map(|(key, value)| (key, Value::String(value.trim().to_string())))
        .collect();
    if let Some(source) = source {
        payload.insert("source".to_string(), Value::String(source.to_string()));
    }
    payload
}

/// Decides whether a reply counts as success. An error status or `ok: false`
/// is a failure carrying the server's label, if any.
pub fn interpret(status_ok: bool, reply: SubmitReply) -> Result<(), String> {
    if status_ok && reply.ok {
        Ok(())
    } else {
        Err(reply.error.unwrap_or_else(|| SUBMISSION_FAILED.to_string()))
    }
}
