use actix_web::{HttpResponse, Responder, post, web};
use log::{error, info};

use super::models::{AppState, ErrorResponse, MineRequest, MineResponse};
use crate::blockchain::MineOutcome;

/// Mine a new block from the current mempool:
/// - Drain pending transactions per the configured policy
/// - Commit to them with a Merkle root
/// - Mine PoW at the current difficulty
/// - Append the sealed block and credit the configured reward to `miner`
#[post("/mine")]
pub async fn mine_block(state: web::Data<AppState>, req: web::Json<MineRequest>) -> impl Responder {
    let miner = req.into_inner().miner.trim().to_string();
    if miner.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("Miner address required"));
    }

    // PoW is CPU-bound; run it on the blocking pool.
    let outcome = match web::block(move || state.ledger.mine_block(&miner)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("MINER - mining task failed: {e}");
            return HttpResponse::InternalServerError().json(ErrorResponse::new(e));
        }
    };

    match outcome {
        MineOutcome::Sealed(block) => {
            info!(
                "MINER - sealed block #{} (hash={}, nonce={})",
                block.index, block.hash, block.nonce
            );
            HttpResponse::Ok().json(MineResponse {
                success: true,
                block: Some(block),
                message: None,
            })
        }
        MineOutcome::NothingToMine => HttpResponse::Ok().json(MineResponse {
            success: false,
            block: None,
            message: Some("No transactions to mine"),
        }),
        MineOutcome::Cancelled => HttpResponse::Ok().json(MineResponse {
            success: false,
            block: None,
            message: Some("Mining was cancelled"),
        }),
    }
}
