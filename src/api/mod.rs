mod chain;
mod health;
mod mining;
pub mod models;
mod risk;
mod rewards;
mod stats;
mod tx;

use actix_web::HttpResponse;
use actix_web::error::InternalError;
use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

use models::ErrorResponse;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api/blockchain")
            .service(tx::post_transaction)
            .service(tx::post_record)
            .service(tx::get_mempool)
            .service(tx::get_pending)
            .service(mining::mine_block)
            .service(chain::get_chain)
            .service(chain::get_latest)
            .service(chain::get_consensus)
            .service(chain::get_difficulty)
            .service(chain::set_difficulty)
            .service(chain::get_reward)
            .service(chain::set_reward)
            .service(stats::get_stats)
            .service(rewards::get_rewards)
            .service(risk::post_simulate),
    )
    .service(
        web::scope("/api")
            .service(health::health_check)
            .service(risk::get_transactions)
            .service(risk::get_transaction),
    );
}

/// Malformed JSON bodies answer `400 {"success": false, "error": ...}`.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = HttpResponse::BadRequest().json(ErrorResponse::new(&err));
        InternalError::from_response(err, body).into()
    })
}
