//! Ritmo Score Service — Binary Entrypoint
//! Boots the Axum HTTP server: config, engine, routes and optional metrics.

use std::sync::Arc;

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ritmo_score::config::{EngineConfig, HistoryBackend};
use ritmo_score::metrics::Metrics;
use ritmo_score::{api, RitmoEngine};

/// Install the tracing subscriber once.
/// `RITMO_LOG_JSON=1` selects JSON lines, otherwise compact text.
fn init_tracing() {
    let json = std::env::var("RITMO_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ritmo=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);
    // try_init: Shuttle may already have installed a global subscriber.
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if res.is_err() {
        eprintln!("tracing subscriber already installed; keeping it");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = EngineConfig::load().context("loading engine config")?;
    match &cfg.history {
        HistoryBackend::Jsonl(path) => {
            info!(target: "ritmo", path = %path.display(), "history: jsonl")
        }
        HistoryBackend::Memory => warn!(target: "ritmo", "history: in-memory (lost on restart)"),
    }

    let engine = Arc::new(RitmoEngine::from_config(&cfg));
    let mut router = api::router(engine);

    if cfg.metrics_enabled {
        match Metrics::init() {
            Ok(m) => router = router.merge(m.router()),
            Err(e) => warn!(target: "ritmo", error = ?e, "metrics disabled"),
        }
    }

    info!(target: "ritmo", "ritmo service ready");
    Ok(router.into())
}
