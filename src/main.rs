//! Remy - conversational restaurant recommendations
//!
//! Collects a locality, an optional sub-area, a cuisine and a budget over a
//! chat, then recommends venues from a curated dataset topped up with live
//! map data.

mod api;
mod config;
mod cuisine;
mod geo;
mod llm;
mod nlu;
mod reply;
mod search;
mod session;
#[cfg(test)]
mod testing;
mod turn;

use api::{create_router, AppState};
use config::AppConfig;
use geo::{LocalityResolver, NominatimClient};
use llm::{LlmService, LoggingService, OpenAIService};
use nlu::{LlmNlu, NluService};
use search::{CanonicalDataset, OverpassClient, SearchEngine};
use session::SessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turn::{Concierge, TurnController};

const PRUNE_EVERY: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "remy=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env()?;
    let user_agent = config.user_agent();

    let dataset = CanonicalDataset::load(&config.dataset_path)?;

    let geocoder = NominatimClient::new(
        config.nominatim_url.clone(),
        config.nominatim_email.clone(),
        &user_agent,
        config.http_timeout,
    )?;
    let map_source = OverpassClient::new(config.overpass_url.clone(), &user_agent, config.http_timeout)?;

    let nlu: Option<Arc<dyn NluService>> = match &config.openai_api_key {
        Some(key) => {
            let service = OpenAIService::new(key.clone(), config.nlu_model.clone(), None, config.http_timeout)?;
            let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(service)));
            tracing::info!(model = %config.nlu_model, "LLM-assisted NLU enabled");
            Some(Arc::new(LlmNlu::new(llm)))
        }
        None => {
            tracing::info!("OPENAI_API_KEY not set; pattern-only message understanding");
            None
        }
    };

    let controller = TurnController::new(
        LocalityResolver::new(Arc::new(geocoder)),
        SearchEngine::new(Arc::new(dataset), Arc::new(map_source)),
        nlu,
        config.idle_after,
    );
    let store = Arc::new(SessionStore::new());
    let concierge = Arc::new(Concierge::new(store.clone(), Arc::new(controller)));

    // Evict conversations nobody has touched for a while
    let ttl = config.session_ttl;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PRUNE_EVERY);
        loop {
            ticker.tick().await;
            let pruned = store.prune_idle(chrono::Utc::now(), ttl).await;
            if pruned > 0 {
                let remaining = store.len().await;
                tracing::info!(pruned, remaining, "Pruned idle sessions");
            }
        }
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(AppState::new(concierge))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Remy listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
