use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, error, info, warn};

use super::models::{AppState, ErrorResponse, RecordRequest, SubmitResponse};
use crate::blockchain::{DrainPolicy, iso_timestamp_now};
use crate::transaction::Transaction;

/// Submit a new transaction into the mempool.
#[post("/transaction")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<Transaction>,
) -> impl Responder {
    submit(state, body.into_inner()).await
}

/// Queue a transaction wrapped as `{"transaction": {...}}`.
#[post("/record")]
pub async fn post_record(
    state: web::Data<AppState>,
    body: web::Json<RecordRequest>,
) -> impl Responder {
    submit(state, body.into_inner().transaction).await
}

async fn submit(state: web::Data<AppState>, mut tx: Transaction) -> HttpResponse {
    if let Err(e) = tx.check_format() {
        warn!("POST transaction - rejected: {e}");
        return HttpResponse::BadRequest().json(ErrorResponse::new(e));
    }
    tx.timestamp = iso_timestamp_now();
    debug!("POST transaction - {} -> {} ({})", tx.from, tx.to, tx.amount);

    let batch_size = match state.ledger.settings().policy() {
        DrainPolicy::Batch(n) => Some(n),
        DrainPolicy::All => None,
    };

    // Admission can seal a block under the batch policy; keep PoW off the async workers.
    let ledger_state = state.clone();
    let mut admission = match web::block(move || ledger_state.ledger.admit_transaction(tx)).await {
        Ok(admission) => admission,
        Err(e) => {
            error!("POST transaction - admission task failed: {e}");
            return HttpResponse::InternalServerError().json(ErrorResponse::new(e));
        }
    };

    for block in &admission.mined {
        info!("POST transaction - batch full, sealed block #{}", block.index);
    }

    HttpResponse::Ok().json(SubmitResponse {
        success: true,
        message: "Transaction added to mempool",
        pending: admission.pending,
        batch_size,
        mined_block: admission.mined.pop(),
    })
}

/// List pending transactions in FIFO order.
#[get("/mempool")]
pub async fn get_mempool(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.ledger.get_mempool())
}

#[get("/pending")]
pub async fn get_pending(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.ledger.get_mempool())
}
