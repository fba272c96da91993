use anyhow::Context;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use shuttle_axum::axum::{routing::get, Router};

use crate::engine::Outcome;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

/// One-time series registration (so they show up on /metrics before first use).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ritmo_checkins_total", "Check-ins evaluated, by level.");
        describe_counter!("ritmo_profiles_total", "Study profiles assigned.");
        describe_histogram!("ritmo_score", "Distribution of Ritmo Scores (0-100).");
        describe_counter!(
            "ritmo_history_read_failures_total",
            "History reads that failed or skipped a corrupt record."
        );
        describe_counter!(
            "ritmo_history_write_failures_total",
            "History appends that failed."
        );
    });
}

/// Count one evaluated check-in.
pub fn record_outcome(o: &Outcome) {
    counter!("ritmo_checkins_total", "nivel" => o.level.as_str()).increment(1);
    counter!("ritmo_profiles_total", "perfil" => o.profile.as_str()).increment(1);
    histogram!("ritmo_score").record(o.score);
}

impl Metrics {
    /// Install the Prometheus recorder. Fails if a recorder is already installed.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
