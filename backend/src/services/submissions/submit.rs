//! # Submission pipeline
//!
//! `POST {endpoint_path}` runs one request through four steps:
//!
//! 1. **Normalize**: the body is read as JSON, URL-encoded or multipart fields
//!    and every string value is sanitized (see [`super::payload`]).
//! 2. **Validate**: `name`, `email` and `phone` are checked. A failure ends
//!    the pipeline with [`Outcome::Rejected`]. Nothing is stored or mailed.
//! 3. **Persist**: the stamped [`Submission`] is appended to the CSV store.
//! 4. **Notify**: the staff email is handed to the configured [`Notifier`].
//!
//! Persist and notify are blocking and independent of each other, so both run
//! on the blocking pool at the same time. Their failures only flip the
//! matching flag on [`Outcome::Accepted`].
//!
//! The outcome is then rendered for the request shape: JSON for `fetch`
//! clients, a redirect to the success page for native form posts.
//!
//! [`Submission`]: common::model::submission::Submission
//! [`Notifier`]: crate::notifier::Notifier

use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{Local, SecondsFormat};
use log::{info, warn};
use tokio::task;

use super::{
    outcome::Outcome,
    payload::{read_payload, LeadForm, Payload},
    validate::validate,
};
use crate::{
    notifier::{compose, notify},
    state::AppState,
};

/// The Actix web handler for the submission endpoint.
pub(crate) async fn process(
    req: HttpRequest,
    body: web::Payload,
    state: web::Data<AppState>,
) -> HttpResponse {
    let payload = read_payload(req.headers(), body, state.config.max_body_bytes).await;
    let shape = payload.shape;

    submit(&state, &payload)
        .await
        .render(shape, &state.config.success_redirect)
}

/// Runs validation, storage and notification for an already normalized payload.
pub async fn submit(state: &AppState, payload: &Payload) -> Outcome {
    let form = LeadForm::from_payload(payload);
    if let Err(errors) = validate(&form) {
        return Outcome::Rejected(errors);
    }

    let submission = form.into_submission(timestamp());
    let notification = compose(
        &submission,
        &state.config.to_email,
        &state.config.from_email,
        &state.config.email_subject,
    );

    let store = Arc::clone(&state.store);
    let notifier = Arc::clone(&state.notifier);
    let saving = task::spawn_blocking(move || store.save(&submission));
    let sending = task::spawn_blocking(move || notify(notifier.as_ref(), &notification));
    let (saved, sent) = tokio::join!(saving, sending);

    let csv_saved = saved.unwrap_or_else(|e| {
        warn!("Storage task did not finish: {e}");
        false
    });
    let email_sent = sent.unwrap_or_else(|e| {
        warn!("Notification task did not finish: {e}");
        false
    });

    info!("Submission accepted (csv_saved: {csv_saved}, email_sent: {email_sent})");
    Outcome::Accepted {
        csv_saved,
        email_sent,
    }
}

/// Current local time as ISO-8601 with offset, e.g. `2026-10-15T09:30:00+02:00`.
fn timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}
