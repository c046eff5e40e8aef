//! HTTP request handlers

use super::types::{ErrorResponse, HealthResponse, RecommendationRequest, RecommendationResponse};
use super::AppState;
use crate::reply;
use crate::session::Slot;
use crate::turn::TurnInput;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .route("/recommendation", post(recommend))
        .with_state(state)
}

async fn banner() -> String {
    format!("remy {}", env!("CARGO_PKG_VERSION"))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        dataset_records: state.dataset_records,
    })
}

async fn recommend(
    State(state): State<AppState>,
    body: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let id = request
        .conversation_id()
        .ok_or_else(|| AppError::BadRequest("conversation_id is required".to_string()))?
        .to_string();

    let input = TurnInput {
        presupplied: request.presupplied(),
        message: request.message,
        display_name: request.username,
    };
    let outcome = state.concierge.handle(&id, input).await;
    let state = outcome.state;
    let rendered = reply::render(&outcome.decision, state.language, &state.slots);

    Ok(Json(RecommendationResponse {
        reply: rendered.reply,
        followup: rendered.followup,
        next_slot: state.pending_question.map(Slot::wire_name),
        language: state.language,
        decision: outcome.decision.kind(),
        slots: state.slots,
    }))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LocalityResolver;
    use crate::search::{CanonicalDataset, CanonicalRecord, SearchEngine};
    use crate::session::SessionStore;
    use crate::testing::{MockGeocoder, MockMapSource};
    use crate::turn::{Concierge, TurnController};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(records: Vec<CanonicalRecord>) -> (Router, Arc<SessionStore>) {
        let controller = TurnController::new(
            LocalityResolver::new(Arc::new(MockGeocoder::new())),
            SearchEngine::new(
                Arc::new(CanonicalDataset::from_records(records)),
                Arc::new(MockMapSource::new()),
            ),
            None,
            chrono::Duration::minutes(15),
        );
        let store = Arc::new(SessionStore::new());
        let concierge = Arc::new(Concierge::new(store.clone(), Arc::new(controller)));
        (create_router(AppState::new(concierge)), store)
    }

    async fn post(app: Router, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/recommendation")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_greeting_turn() {
        let (app, _) = app(Vec::new());
        let (status, body) = post(app, r#"{"conversation_id":"u1","message":"hola"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decision"], "greet");
        assert_eq!(body["followup"], "¿En qué ciudad estás?");
        assert_eq!(body["next_slot"], "locality");
        assert_eq!(body["language"], "es");
    }

    #[tokio::test]
    async fn test_missing_conversation_id_is_rejected() {
        let (app, store) = app(Vec::new());
        let (status, body) = post(app, r#"{"message":"hola"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "conversation_id is required");
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let (app, _) = app(Vec::new());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/recommendation")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_presupplied_slots_reach_the_turn() {
        let (app, _) = app(Vec::new());
        let request = json!({
            "manychat_user_id": "u2",
            "message": "hola",
            "city": "Guadalajara",
            "slots": { "city": "CDMX", "cuisine": "ramen" }
        });
        let (status, body) = post(app, &request.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["slots"]["locality"], "CDMX");
        assert_eq!(body["slots"]["cuisine"], "ramen");
        assert_eq!(body["next_slot"], "sub_area");
    }

    #[tokio::test]
    async fn test_numeric_budget_is_accepted() {
        let (app, _) = app(Vec::new());
        let request = json!({
            "conversation_id": "u3",
            "message": "hola",
            "budget": 300,
            "slots": { "city": "CDMX" }
        });
        let (status, body) = post(app, &request.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["slots"]["budget"], "300");
        assert_eq!(body["slots"]["locality"], "CDMX");
    }

    #[tokio::test]
    async fn test_health_reports_dataset_size() {
        let record = CanonicalRecord {
            id: None,
            name: "Pujol".to_string(),
            lat: Some(19.4326),
            lon: Some(-99.1947),
            cuisine: "mexican".to_string(),
            prestige: 9.5,
            address: String::new(),
            michelin: None,
            best_of_rank: None,
            green_star: false,
            website: None,
        };
        let (app, _) = app(vec![record]);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"status": "ok", "dataset_records": 1}));
    }

    #[tokio::test]
    async fn test_banner() {
        let (app, _) = app(Vec::new());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes, format!("remy {}", env!("CARGO_PKG_VERSION")));
    }
}
