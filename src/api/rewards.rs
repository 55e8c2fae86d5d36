use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, RewardsResponse};

/// Blocks sealed by a miner and the rewards credited to it.
#[get("/rewards/{miner}")]
pub async fn get_rewards(state: web::Data<AppState>, path: web::Path<(String,)>) -> impl Responder {
    let miner = path.into_inner().0;
    let rewards: RewardsResponse = state.ledger.rewards_of(&miner);
    HttpResponse::Ok().json(rewards)
}
