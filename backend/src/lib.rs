//! Lead-capture backend for the Soulful Kitchen marketing site.
//!
//! Accepts contact and booking form submissions, appends them to a CSV
//! record store, emails staff, and serves the static site itself.

pub mod config;
pub mod notifier;
pub mod services;
pub mod state;
pub mod storage;

use actix_files::Files;
use actix_web::web;
use log::warn;

use crate::state::AppState;

/// Registers the submission endpoint and, when the site directory exists,
/// the static file service behind it.
pub fn configure(cfg: &mut web::ServiceConfig, state: web::Data<AppState>) {
    let config = &state.config;
    cfg.app_data(state.clone())
        .service(services::submissions::configure_routes(&config.endpoint_path));

    if config.site_dir.is_dir() {
        cfg.service(Files::new("/", &config.site_dir).index_file("index.html"));
    } else {
        warn!(
            "Site directory {} not found, serving the submission endpoint only",
            config.site_dir.display()
        );
    }
}
