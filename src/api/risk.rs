use actix_web::{HttpResponse, Responder, get, post, web};
use log::{error, info};

use super::models::{AppState, ErrorResponse, SimulateRequest, SimulateResponse};
use crate::transaction::Payment;
use crate::transaction::risk::generate_mock_payment;

const INITIAL_BATCH: usize = 50;
const MAX_SIMULATED: usize = 100;

/// Initial batch of scored mock payments for the dashboard.
#[get("/transactions")]
pub async fn get_transactions() -> impl Responder {
    let payments: Vec<Payment> = (0..INITIAL_BATCH).map(|_| generate_mock_payment()).collect();
    HttpResponse::Ok().json(payments)
}

/// One fresh scored mock payment.
#[get("/transaction")]
pub async fn get_transaction() -> impl Responder {
    HttpResponse::Ok().json(generate_mock_payment())
}

/// Generate `count` mock payments and admit them to the ledger.
#[post("/simulate")]
pub async fn post_simulate(
    state: web::Data<AppState>,
    body: web::Json<SimulateRequest>,
) -> impl Responder {
    let count = body.count;
    if !(1..=MAX_SIMULATED).contains(&count) {
        return HttpResponse::BadRequest().json(ErrorResponse::new(format!(
            "count must be between 1 and {MAX_SIMULATED}"
        )));
    }

    let result = web::block(move || {
        let mut flagged = 0;
        let mut mined_blocks = Vec::new();
        let mut pending = 0;
        for payment in (0..count).map(|_| generate_mock_payment()) {
            if payment.is_fraudulent {
                flagged += 1;
            }
            let admission = state.ledger.admit_transaction(payment.into_transaction());
            pending = admission.pending;
            mined_blocks.extend(admission.mined.iter().map(|block| block.index));
        }
        SimulateResponse {
            success: true,
            admitted: count,
            flagged,
            pending,
            mined_blocks,
        }
    })
    .await;

    match result {
        Ok(resp) => {
            info!(
                "SIMULATE - admitted {} mock payments ({} flagged)",
                resp.admitted, resp.flagged
            );
            HttpResponse::Ok().json(resp)
        }
        Err(e) => {
            error!("SIMULATE - task failed: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse::new(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use crate::api::test_support::{app, easy_state};

    #[actix_web::test]
    async fn dashboard_feed_returns_scored_payments() {
        let app = test::init_service(app(easy_state())).await;

        let req = test::TestRequest::get().uri("/api/transactions").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let payments = body.as_array().unwrap();
        assert_eq!(payments.len(), 50);
        assert!(payments[0].get("trustScore").is_some());
        assert!(payments[0].get("riskLevel").is_some());

        let req = test::TestRequest::get().uri("/api/transaction").to_request();
        let one: Value = test::call_and_read_body_json(&app, req).await;
        assert!(one["status"] == "approved" || one["status"] == "flagged");
    }

    #[actix_web::test]
    async fn simulate_fills_the_mempool() {
        let state = easy_state();
        let app = test::init_service(app(state.clone())).await;

        let req = test::TestRequest::post()
            .uri("/api/blockchain/simulate")
            .set_json(json!({"count": 4}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["admitted"], 4);
        assert_eq!(body["pending"], 4);
        assert_eq!(state.ledger.mempool_len(), 4);
        assert!(
            state
                .ledger
                .get_mempool()
                .iter()
                .all(|tx| tx.extra.contains_key("trustScore"))
        );

        let req = test::TestRequest::post()
            .uri("/api/blockchain/simulate")
            .set_json(json!({"count": 0}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn health_is_reachable() {
        let app = test::init_service(app(easy_state())).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
