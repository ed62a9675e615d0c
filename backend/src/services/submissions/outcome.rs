use actix_web::{http::header::LOCATION, HttpResponse};
use common::responses::{AcceptedResponse, FieldErrors, RejectedResponse};

use super::payload::RequestShape;

/// Result of one pass through the submission pipeline, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Validation failed; nothing was stored or sent.
    Rejected(FieldErrors),
    /// Validation passed. Each flag reports its own best-effort step.
    Accepted { csv_saved: bool, email_sent: bool },
}

impl Outcome {
    /// JSON reply for `fetch` clients, redirect for native form posts.
    pub fn render(self, shape: RequestShape, success_redirect: &str) -> HttpResponse {
        match shape {
            RequestShape::Json => self.render_json(),
            RequestShape::Form => self.render_redirect(success_redirect),
        }
    }

    fn render_json(self) -> HttpResponse {
        match self {
            Self::Rejected(fields) => {
                HttpResponse::UnprocessableEntity().json(RejectedResponse::new(fields))
            }
            Self::Accepted {
                csv_saved,
                email_sent,
            } => HttpResponse::Ok().json(AcceptedResponse::new(email_sent, csv_saved)),
        }
    }

    fn render_redirect(self, success_redirect: &str) -> HttpResponse {
        let (key, value) = match self {
            Self::Rejected(_) => ("error", "validation"),
            Self::Accepted { .. } => ("submitted", "1"),
        };
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(key, value)
            .finish();
        let separator = if success_redirect.contains('?') { '&' } else { '?' };

        HttpResponse::Found()
            .insert_header((LOCATION, format!("{success_redirect}{separator}{query}")))
            .finish()
    }
}
