//! Lead and booking form submissions.
//!
//! A single route, `POST {endpoint_path}` (`/form-handler.php` by default so
//! the static site's forms keep their action), accepts both body styles the
//! site produces:
//!
//! - `fetch` calls from the browser client post JSON and get JSON back:
//!   `200 {"ok":true,"email_sent":..,"csv_saved":..}` or
//!   `422 {"ok":false,"error":"Validation failed","fields":{..}}`.
//! - Native form posts (URL-encoded or multipart) get a `302` to the success
//!   page with `submitted=1` or `error=validation`.

use actix_web::web::{post, resource};
use actix_web::Resource;

mod outcome;
mod payload;
mod submit;
mod validate;

/// Configures and returns the Actix resource for the submission endpoint.
pub fn configure_routes(endpoint_path: &str) -> Resource {
    resource(endpoint_path).route(post().to(submit::process))
}
