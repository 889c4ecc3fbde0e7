use std::sync::Arc;

use {
    axum::{
        Json, Router,
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
        routing::{get, post},
    },
    serde::Deserialize,
    sqlx::SqlitePool,
    tower_http::cors::{Any, CorsLayer},
    tracing::{info, warn},
};

use {
    parlo_core::DeliverySender,
    parlo_gemini::GeminiGenerator,
    parlo_history::SqliteHistoryStore,
    parlo_orchestrator::Orchestrator,
    parlo_whatsapp::{CloudApiSender, WebhookPayload, normalize, verify_subscription},
};

use crate::{config::RelayConfig, state::AppState};

// ── Router ───────────────────────────────────────────────────────────────────

/// Build the relay router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/webhook",
            get(verify_webhook_handler).post(webhook_handler),
        )
        .route("/send-message", post(send_message_handler))
        .layer(cors)
        .with_state(state)
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Open the database, wire the collaborators and serve until shutdown.
pub async fn start_server(config: RelayConfig) -> anyhow::Result<()> {
    let db_url = format!("sqlite:{}?mode=rwc", config.db_path);
    let pool = SqlitePool::connect(&db_url).await?;
    SqliteHistoryStore::init(&pool).await?;

    let sender: Arc<dyn DeliverySender> = Arc::new(CloudApiSender::new(config.whatsapp.clone()));
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(SqliteHistoryStore::new(pool)),
        Arc::new(GeminiGenerator::new(config.gemini.clone())),
        Arc::clone(&sender),
    ));

    let state = AppState {
        orchestrator,
        sender,
        whatsapp: Arc::new(config.whatsapp.clone()),
    };
    let app = build_app(state);

    let addr = format!("{}:{}", config.bind, config.port);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %config.gemini.model,
        db = %config.db_path,
        "parlo relay listening on http://{addr}"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler() -> &'static str {
    "Server is healthy"
}

#[derive(Debug, Deserialize)]
struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

async fn verify_webhook_handler(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> impl IntoResponse {
    match verify_subscription(
        params.mode.as_deref(),
        params.verify_token.as_deref(),
        params.challenge.as_deref(),
        &state.whatsapp,
    ) {
        Some(challenge) => {
            info!("webhook subscription verified");
            (StatusCode::OK, challenge)
        },
        None => {
            warn!("webhook subscription verification failed");
            (StatusCode::FORBIDDEN, "Error, wrong token.".to_string())
        },
    }
}

/// Acknowledge first, process later.
///
/// The platform retries deliveries that are not answered quickly, so the
/// response never waits on the pipeline. The body is decoded leniently; an
/// undecodable body is logged and still acknowledged.
async fn webhook_handler(State(state): State<AppState>, body: String) -> impl IntoResponse {
    match serde_json::from_str::<WebhookPayload>(&body) {
        Ok(payload) => {
            let event = normalize(payload, &state.whatsapp);
            let orchestrator = Arc::clone(&state.orchestrator);
            tokio::spawn(async move {
                let outcome = orchestrator.handle_event(event).await;
                info!(?outcome, "webhook event processed");
            });
        },
        Err(err) => {
            warn!(error = %err, "undecodable webhook body");
        },
    }

    (StatusCode::OK, "OK")
}

#[derive(Debug, Deserialize)]
struct SendMessageRequest {
    to: String,
    message: String,
}

async fn send_message_handler(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> impl IntoResponse {
    let receipt = state.sender.send_text(&req.to, &req.message).await;
    let status = if receipt.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (
        status,
        Json(serde_json::json!({
            "success": receipt.success,
            "external_message_id": receipt.external_message_id,
        })),
    )
}
