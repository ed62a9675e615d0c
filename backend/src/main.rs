use actix_web::{middleware::Logger, web, App, HttpServer};
use backend::{config::Config, state::AppState};
use env_logger::Env;
use log::info;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let bind = (config.host.clone(), config.port);
    info!(
        "Server running at http://{}:{}, accepting submissions on {}",
        bind.0, bind.1, config.endpoint_path
    );
    info!("Recording submissions in {}", config.csv_file.display());

    let state = web::Data::new(AppState::from_config(config));

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(Logger::default())
            .configure(move |cfg| backend::configure(cfg, state))
    })
        .bind(bind)?
        .run()
        .await
}
