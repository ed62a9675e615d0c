use std::sync::Arc;

use crate::{
    config::Config,
    notifier::{Mailer, Notifier},
    storage::SubmissionStore,
};

/// Shared, read-only state handed to every handler through `web::Data`.
pub struct AppState {
    pub config: Config,
    pub store: Arc<SubmissionStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Wires the CSV store and the lettre mailer described by `config`.
    pub fn from_config(config: Config) -> Self {
        let store = SubmissionStore::new(&config.data_dir, &config.csv_file);
        let notifier = Mailer::from_config(&config.mail);

        Self {
            config,
            store: Arc::new(store),
            notifier: Arc::new(notifier),
        }
    }
}
