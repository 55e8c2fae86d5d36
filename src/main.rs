use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::{error, info};

use pow_ledger::api::{self, AppState};
use pow_ledger::blockchain::Ledger;
use pow_ledger::config::Settings;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let settings = Settings::from_env().map_err(|e| {
        error!("configuration error: {e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let host = settings.host.clone();
    let port = settings.port;

    info!("⛓️ Starting ledger API at http://{host}:{port}");

    let ledger = Ledger::new(settings.ledger.clone(), settings.miner());
    let state = web::Data::new(AppState::new(ledger));

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
