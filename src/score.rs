//! # Score Calculator
//! Pure mapping `(check-in, sentiment class)` → `(score, level)`.
//!
//! Base 50 plus independent additive adjustments, one per input field, summed
//! and then clamped to [0, 100]. The level is a monotone step function of the
//! final score.

use serde::{Deserialize, Serialize};

use crate::checkin::{CheckIn, Condition, Environment, Mood};
use crate::sentiment::SentimentClass;

pub const BASE_SCORE: i32 = 50;
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

pub const FLOW_THRESHOLD: f64 = 75.0;
pub const NEUTRAL_THRESHOLD: f64 = 55.0;
pub const ALERT_THRESHOLD: f64 = 35.0;

/// Discrete level of the Ritmo Score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "flow")]
    Flow,
    #[serde(rename = "neutro")]
    Neutral,
    #[serde(rename = "alerta")]
    Alert,
    #[serde(rename = "critico")]
    Critical,
}

impl Level {
    /// Thresholds checked from highest to lowest (score >= X).
    pub fn from_score(score: f64) -> Self {
        if score >= FLOW_THRESHOLD {
            Level::Flow
        } else if score >= NEUTRAL_THRESHOLD {
            Level::Neutral
        } else if score >= ALERT_THRESHOLD {
            Level::Alert
        } else {
            Level::Critical
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Flow => "flow",
            Level::Neutral => "neutro",
            Level::Alert => "alerta",
            Level::Critical => "critico",
        }
    }
}

/// Every adjustment that went into a score, for explainability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: i32,
    pub mood: i32,
    pub focus: i32,
    pub sleep: i32,
    pub environment: i32,
    pub conditions: i32,
    pub sentiment: i32,
    /// Unclamped sum of base and all adjustments.
    pub raw: i32,
    /// `raw` clamped to [0, 100].
    pub score: f64,
    pub level: Level,
}

pub fn mood_points(mood: Mood) -> i32 {
    match mood {
        Mood::VeryGood => 25,
        Mood::Good => 20,
        Mood::Ok => 15,
        Mood::Tired => 10,
        Mood::Overwhelmed => 5,
        Mood::Unrecognized => 15,
    }
}

/// Focus 1..=5 maps to -10..=+10.
pub fn focus_adjustment(focus: u8) -> i32 {
    (i32::from(focus) - 3) * 5
}

pub fn sleep_adjustment(hours: Option<f64>) -> i32 {
    let Some(h) = hours else {
        return 0;
    };
    if h < 4.0 {
        -15
    } else if h < 6.0 {
        -8
    } else if h < 8.0 {
        0
    } else if h <= 9.0 {
        5
    } else {
        // oversleeping weighs too
        -3
    }
}

pub fn environment_adjustment(env: Environment) -> i32 {
    match env {
        Environment::Ngo | Environment::School => 5,
        Environment::Home | Environment::Work => 0,
        Environment::Street | Environment::Transit => -10,
        Environment::Unrecognized => 0,
    }
}

pub fn condition_adjustment(c: Condition) -> i32 {
    match c {
        Condition::Noise => -8,
        Condition::NoSpace => -6,
        Condition::NoInternet => -10,
        Condition::Fatigue => -6,
        Condition::Stress => -8,
        Condition::Safe => 4,
        Condition::Ok => 0,
    }
}

pub fn sentiment_adjustment(s: SentimentClass) -> i32 {
    match s {
        SentimentClass::Positive => 3,
        SentimentClass::Negative => -5,
        SentimentClass::Neutral => 0,
    }
}

/// Compute the full breakdown. Total over every valid check-in.
pub fn breakdown(checkin: &CheckIn, sentiment: SentimentClass) -> ScoreBreakdown {
    let mood = mood_points(checkin.mood);
    let focus = focus_adjustment(checkin.focus);
    let sleep = sleep_adjustment(checkin.sleep_hours);
    let environment = environment_adjustment(checkin.environment);
    let conditions = checkin
        .conditions
        .iter()
        .map(|&c| condition_adjustment(c))
        .sum::<i32>();
    let sentiment = sentiment_adjustment(sentiment);

    let raw = BASE_SCORE + mood + focus + sleep + environment + conditions + sentiment;
    let score = f64::from(raw).clamp(SCORE_MIN, SCORE_MAX);

    ScoreBreakdown {
        base: BASE_SCORE,
        mood,
        focus,
        sleep,
        environment,
        conditions,
        sentiment,
        raw,
        score,
        level: Level::from_score(score),
    }
}

/// `(score, level)` for a check-in whose text was classified as `sentiment`.
pub fn compute(checkin: &CheckIn, sentiment: SentimentClass) -> (f64, Level) {
    let b = breakdown(checkin, sentiment);
    (b.score, b.level)
}
