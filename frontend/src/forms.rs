use common::responses::SubmitReply;
use gloo_net::http::Request;
use serde_json::{Map, Value};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Event, FormData, HtmlFormElement};

use crate::{
    payload::{build_payload, interpret},
    toast::{show_toast, Tone},
};

/// Used when a form has no `action` attribute.
const DEFAULT_ENDPOINT: &str = "form-handler.php";

struct FormSpec {
    id: &'static str,
    source: Option<&'static str>,
    success: &'static str,
    failure: &'static str,
}

static FORMS: [FormSpec; 2] = [
    FormSpec {
        id: "quickLeadForm",
        source: Some("quick-lead"),
        success: "Thanks! We will reach out shortly.",
        failure: "Unable to submit form.",
    },
    FormSpec {
        id: "bookingForm",
        source: None,
        success: "Booking received! We will confirm soon.",
        failure: "Unable to submit booking.",
    },
];

/// Hooks every known form present on the page.
pub fn attach_all() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    for spec in &FORMS {
        if let Some(form) = document
            .get_element_by_id(spec.id)
            .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
        {
            attach(form, spec);
        }
    }
}

fn attach(form: HtmlFormElement, spec: &'static FormSpec) {
    let target = form.clone();
    let on_submit = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        event.prevent_default();
        let form = target.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let payload = build_payload(serialize_form(&form), spec.source);
            match submit_form(&form, &payload).await {
                Ok(()) => {
                    form.reset();
                    show_toast(spec.success, Tone::Success);
                }
                Err(message) => {
                    let message = if message.is_empty() { spec.failure } else { message.as_str() };
                    show_toast(message, Tone::Error);
                }
            }
        });
    });

    form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())
        .ok();
    // The listener lives as long as the page.
    on_submit.forget();
}

/// Text entries of the form, in document order. File inputs are skipped.
fn serialize_form(form: &HtmlFormElement) -> Vec<(String, String)> {
    let Ok(data) = FormData::new_with_form(form) else {
        return Vec::new();
    };
    let Ok(Some(entries)) = js_sys::try_iter(&data) else {
        return Vec::new();
    };

    entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let pair = js_sys::Array::from(&entry);
            Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
        })
        .collect()
}

/// Posts the payload as JSON. Transport failures come back as an empty
/// message so the caller falls back to the form's own wording.
async fn submit_form(form: &HtmlFormElement, payload: &Map<String, Value>) -> Result<(), String> {
    let endpoint = form
        .get_attribute("action")
        .filter(|action| !action.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let response = Request::post(&endpoint)
        .json(payload)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| {
            gloo_console::error!(format!("Submission to {endpoint} failed: {e}"));
            String::new()
        })?;

    let status_ok = response.ok();
    let reply = response.json::<SubmitReply>().await.map_err(|e| {
        gloo_console::error!(format!("Unreadable reply from {endpoint}: {e}"));
        String::new()
    })?;

    interpret(status_ok, reply)
}
