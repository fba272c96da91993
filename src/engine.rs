//! # Ritmo Engine
//! Sequences one check-in through the pipeline:
//! validate → sentiment → score/level → history & trend → profile → mission/insight.
//!
//! Everything except the history append is pure. The engine holds its
//! collaborators explicitly (built from [`EngineConfig`] or injected), so
//! there is no process-wide state.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::checkin::{CheckIn, Environment, Mood};
use crate::config::{EngineConfig, HistoryBackend};
use crate::error::{EngineError, Result};
use crate::history::{HistoryRecord, HistoryStore, HistoryTracker, JsonlHistoryStore, Trend};
use crate::profile::{self, Profile};
use crate::recommend::{Recommender, Templates};
use crate::score::{self, Level};
use crate::sentiment::{SentimentAnalyzer, SentimentClass};

/// Result returned to the caller. Ephemeral; only the history record is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(rename = "usuario_id")]
    pub user_id: String,
    pub score: f64,
    #[serde(rename = "nivel")]
    pub level: Level,
    #[serde(rename = "missao_sugerida")]
    pub mission: String,
    #[serde(rename = "insight_sugerido")]
    pub insight: String,
    #[serde(rename = "sentimento_texto")]
    pub sentiment: SentimentClass,
    #[serde(rename = "intensidade_sentimento")]
    pub intensity: f64,
    #[serde(rename = "palavras_chave")]
    pub keywords: Vec<String>,
    #[serde(rename = "tendencia_score")]
    pub trend: Trend,
    #[serde(rename = "total_checkins_usuario")]
    pub total_checkins: usize,
    #[serde(rename = "perfil_estudo")]
    pub profile: Profile,
}

#[derive(Debug)]
pub struct RitmoEngine {
    analyzer: SentimentAnalyzer,
    history: HistoryTracker,
    recommender: Recommender,
}

impl RitmoEngine {
    pub fn new(analyzer: SentimentAnalyzer, history: HistoryTracker, recommender: Recommender) -> Self {
        Self {
            analyzer,
            history,
            recommender,
        }
    }

    /// Default analyzer and templates over the given store.
    pub fn with_store(store: Arc<dyn HistoryStore>) -> Self {
        Self::new(
            SentimentAnalyzer::new(),
            HistoryTracker::new(store),
            Recommender::default(),
        )
    }

    /// Engine with an in-process history (nothing touches disk).
    pub fn in_memory() -> Self {
        Self::new(
            SentimentAnalyzer::new(),
            HistoryTracker::in_memory(),
            Recommender::default(),
        )
    }

    pub fn from_config(cfg: &EngineConfig) -> Self {
        let history = match &cfg.history {
            HistoryBackend::Jsonl(path) => {
                HistoryTracker::new(Arc::new(JsonlHistoryStore::new(path.clone())))
            }
            HistoryBackend::Memory => HistoryTracker::in_memory(),
        };
        let templates = cfg
            .templates_path
            .as_ref()
            .map(Templates::load_from_file)
            .unwrap_or_default();
        Self::new(SentimentAnalyzer::new(), history, Recommender::new(templates))
    }

    pub fn history(&self) -> &HistoryTracker {
        &self.history
    }

    /// Score one check-in and append it to the history.
    pub fn evaluate(&self, checkin: &CheckIn) -> Result<Outcome> {
        checkin.validate()?;
        let uid = anon_hash(&checkin.user_id);

        if checkin.mood == Mood::Unrecognized || checkin.environment == Environment::Unrecognized {
            warn!(target: "ritmo", %uid, "unrecognized mood/environment; scoring with defaults");
        }

        let sentiment = self.analyzer.analyze(checkin.free_text.as_deref());
        let breakdown = score::breakdown(checkin, sentiment.class);
        debug!(target: "ritmo", %uid, breakdown = ?breakdown, "score computed");

        let trend = self
            .history
            .record_and_get_trend(
                &checkin.user_id,
                breakdown.score,
                breakdown.level,
                sentiment.class,
            )
            .map_err(EngineError::StoreWrite)?;

        let profile = profile::classify(breakdown.level, sentiment.class, trend.trend, checkin);
        let rec = self.recommender.recommend(
            profile,
            breakdown.level,
            sentiment.class,
            trend.trend,
            checkin,
        );

        info!(
            target: "ritmo",
            %uid,
            score = breakdown.score,
            level = breakdown.level.as_str(),
            sentiment = sentiment.class.as_str(),
            trend = trend.trend.as_str(),
            total = trend.total,
            profile = profile.as_str(),
            "check-in evaluated"
        );

        let outcome = Outcome {
            user_id: checkin.user_id.clone(),
            score: breakdown.score,
            level: breakdown.level,
            mission: rec.mission,
            insight: rec.insight,
            sentiment: sentiment.class,
            intensity: sentiment.intensity,
            keywords: sentiment.keywords,
            trend: trend.trend,
            total_checkins: trend.total,
            profile,
        };
        crate::metrics::record_outcome(&outcome);
        Ok(outcome)
    }

    /// A user's past check-ins, oldest first.
    pub fn history_for(&self, user_id: &str) -> Vec<HistoryRecord> {
        self.history.records_for(user_id)
    }
}

/// Short stable id for logs; raw user ids and texts are never logged.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::Condition;

    #[test]
    fn first_checkin_is_first_measurement() {
        let e = RitmoEngine::in_memory();
        let c = CheckIn::new("fresh", Mood::Good, 4, Environment::School).sleep(7.0);
        let o = e.evaluate(&c).unwrap();
        assert_eq!(o.trend, Trend::FirstMeasurement);
        assert_eq!(o.total_checkins, 1);
        assert_eq!(o.user_id, "fresh");
    }

    #[test]
    fn invalid_checkin_is_rejected_without_touching_history() {
        let e = RitmoEngine::in_memory();
        let mut c = CheckIn::new("u", Mood::Good, 3, Environment::Home);
        c.focus = 9;
        assert!(matches!(e.evaluate(&c), Err(EngineError::InvalidCheckIn(_))));
        assert!(e.history_for("u").is_empty());
    }

    #[test]
    fn critical_negative_with_no_internet_is_overloaded() {
        let e = RitmoEngine::in_memory();
        let c = CheckIn::new("p", Mood::Overwhelmed, 1, Environment::Home)
            .sleep(3.0)
            .condition(Condition::NoInternet)
            .text("Estou muito cansado e triste, tudo difícil.");
        let o = e.evaluate(&c).unwrap();
        assert_eq!(o.level, Level::Critical);
        assert_eq!(o.sentiment, SentimentClass::Negative);
        assert_eq!(o.profile, Profile::Overloaded);
    }

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("user-1");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("user-1"));
        assert_ne!(a, anon_hash("user-2"));
    }

    #[test]
    fn outcome_wire_names() {
        let e = RitmoEngine::in_memory();
        let o = e
            .evaluate(&CheckIn::new("w", Mood::Ok, 3, Environment::Home))
            .unwrap();
        let v = serde_json::to_value(&o).unwrap();
        for key in [
            "usuario_id",
            "score",
            "nivel",
            "missao_sugerida",
            "insight_sugerido",
            "sentimento_texto",
            "intensidade_sentimento",
            "palavras_chave",
            "tendencia_score",
            "total_checkins_usuario",
            "perfil_estudo",
        ] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
        assert_eq!(v["tendencia_score"], "primeira_medicao");
    }
}
