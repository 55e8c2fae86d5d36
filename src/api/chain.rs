use actix_web::{HttpResponse, Responder, get, post, web};

use super::models::{
    AppState, ConsensusResponse, DifficultyResponse, ErrorResponse, RewardResponse,
    SetDifficultyRequest, SetRewardRequest,
};

/// Get the full blockchain.
#[get("/chain")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.ledger.get_chain())
}

#[get("/latest")]
pub async fn get_latest(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.ledger.latest_block())
}

/// Validate the whole chain.
#[get("/consensus")]
pub async fn get_consensus(state: web::Data<AppState>) -> impl Responder {
    let report = state.ledger.validate_chain();
    HttpResponse::Ok().json(ConsensusResponse {
        valid: report.is_valid(),
        length: report.length,
        first_invalid_index: report.first_invalid,
        reason: report.violation.map(|v| v.to_string()),
    })
}

/// Get current PoW difficulty.
#[get("/difficulty")]
pub async fn get_difficulty(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(DifficultyResponse {
        success: true,
        difficulty: state.ledger.difficulty(),
    })
}

/// Update PoW difficulty (affects future blocks only).
#[post("/difficulty")]
pub async fn set_difficulty(
    state: web::Data<AppState>,
    body: web::Json<SetDifficultyRequest>,
) -> impl Responder {
    match state.ledger.set_difficulty(body.difficulty) {
        Ok(difficulty) => HttpResponse::Ok().json(DifficultyResponse {
            success: true,
            difficulty,
        }),
        Err(e) => HttpResponse::BadRequest().json(ErrorResponse::new(e)),
    }
}

#[get("/reward")]
pub async fn get_reward(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(RewardResponse {
        success: true,
        reward: state.ledger.block_reward(),
    })
}

/// Update the block reward (affects future blocks only).
#[post("/reward")]
pub async fn set_reward(
    state: web::Data<AppState>,
    body: web::Json<SetRewardRequest>,
) -> impl Responder {
    match state.ledger.set_block_reward(body.reward) {
        Ok(reward) => HttpResponse::Ok().json(RewardResponse {
            success: true,
            reward,
        }),
        Err(e) => HttpResponse::BadRequest().json(ErrorResponse::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use crate::api::test_support::{app, easy_state};
    use crate::transaction::Transaction;

    #[actix_web::test]
    async fn chain_and_latest_start_at_genesis() {
        let app = test::init_service(app(easy_state())).await;

        let req = test::TestRequest::get().uri("/api/blockchain/chain").to_request();
        let chain: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(chain.as_array().map(Vec::len), Some(1));
        assert_eq!(chain[0]["previousHash"], "0");

        let req = test::TestRequest::get().uri("/api/blockchain/latest").to_request();
        let latest: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(latest, chain[0]);
    }

    #[actix_web::test]
    async fn consensus_reports_validity() {
        let state = easy_state();
        state
            .ledger
            .admit_transaction(Transaction::new("a", "b", 1.0, "t"));
        state.ledger.mine_block("m");
        let app = test::init_service(app(state)).await;

        let req = test::TestRequest::get()
            .uri("/api/blockchain/consensus")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["valid"], true);
        assert_eq!(body["length"], 2);
        assert_eq!(body["firstInvalidIndex"], Value::Null);
    }

    #[actix_web::test]
    async fn difficulty_is_bounded() {
        let state = easy_state();
        let app = test::init_service(app(state.clone())).await;

        for bad in [json!({"difficulty": 0}), json!({"difficulty": 7}), json!({"difficulty": -2})] {
            let req = test::TestRequest::post()
                .uri("/api/blockchain/difficulty")
                .set_json(bad)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
        assert_eq!(state.ledger.difficulty(), 1);

        let req = test::TestRequest::post()
            .uri("/api/blockchain/difficulty")
            .set_json(json!({"difficulty": 4}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"success": true, "difficulty": 4}));
    }

    #[actix_web::test]
    async fn reward_rejects_negative_values() {
        let state = easy_state();
        let app = test::init_service(app(state.clone())).await;

        let req = test::TestRequest::post()
            .uri("/api/blockchain/reward")
            .set_json(json!({"reward": -5}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("non-negative"));

        let req = test::TestRequest::post()
            .uri("/api/blockchain/reward")
            .set_json(json!({"reward": 2.5}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["reward"], 2.5);
        assert_eq!(state.ledger.block_reward(), 2.5);
    }
}
