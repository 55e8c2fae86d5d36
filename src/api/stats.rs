use actix_web::{HttpResponse, Responder, get, web};
use chrono::DateTime;

use super::models::{AppState, StatsResponse};
use crate::blockchain::{Block, DrainPolicy};

#[get("/stats")]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    let settings = state.ledger.settings();
    let (chain, pending) = state.ledger.snapshot();

    // last interval
    let last_interval_ms = match chain.as_slice() {
        [.., older, newer] => interval_ms(older, newer),
        _ => None,
    };

    HttpResponse::Ok().json(StatsResponse {
        height: chain.len(),
        difficulty: settings.difficulty(),
        block_reward: settings.block_reward(),
        batch_size: match settings.policy() {
            DrainPolicy::Batch(n) => Some(n),
            DrainPolicy::All => None,
        },
        mempool_size: pending.len(),
        sealed_transactions: chain.iter().map(|b| b.transactions.len()).sum(),
        last_interval_ms,
    })
}

fn interval_ms(older: &Block, newer: &Block) -> Option<i64> {
    let older = DateTime::parse_from_rfc3339(&older.timestamp).ok()?;
    let newer = DateTime::parse_from_rfc3339(&newer.timestamp).ok()?;
    Some((newer - older).num_milliseconds().max(0))
}
