//! checkin.rs — the student's daily check-in (mood, focus, sleep, environment,
//! conditions, free text) and its domain validation.
//!
//! Wire names follow the public check-in contract (`usuario_id`, `humor`, ...),
//! so the same JSON the upstream API sends deserializes straight into [`CheckIn`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::CheckInError;

pub const FOCUS_MIN: u8 = 1;
pub const FOCUS_MAX: u8 = 5;
pub const SLEEP_MAX_HOURS: f64 = 24.0;

/// Self-reported mood, ordered from best to worst valence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "muito_bem")]
    VeryGood,
    #[serde(rename = "bem")]
    Good,
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "cansado")]
    Tired,
    #[serde(rename = "sobrecarregado")]
    Overwhelmed,
    /// Any value outside the vocabulary; scored as the mid value.
    #[serde(other)]
    Unrecognized,
}

/// Where the student is studying today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Environment {
    #[serde(rename = "casa")]
    Home,
    #[serde(rename = "trabalho")]
    Work,
    #[serde(rename = "ong")]
    Ngo,
    #[serde(rename = "escola")]
    School,
    #[serde(rename = "rua")]
    Street,
    #[serde(rename = "transporte")]
    Transit,
    #[serde(other)]
    Unrecognized,
}

impl Environment {
    /// Studying while moving around (street or public transport).
    pub fn is_on_the_move(self) -> bool {
        matches!(self, Environment::Street | Environment::Transit)
    }
}

/// Context conditions the student ticked. Fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "barulho")]
    Noise,
    #[serde(rename = "falta_espaco")]
    NoSpace,
    #[serde(rename = "falta_internet")]
    NoInternet,
    #[serde(rename = "cansaco")]
    Fatigue,
    #[serde(rename = "estresse")]
    Stress,
    #[serde(rename = "seguro")]
    Safe,
    #[serde(rename = "ok")]
    Ok,
}

/// One check-in. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    #[serde(rename = "usuario_id")]
    pub user_id: String,
    #[serde(rename = "humor")]
    pub mood: Mood,
    /// Self-rated focus, 1..=5.
    #[serde(rename = "foco")]
    pub focus: u8,
    #[serde(rename = "horas_sono", default)]
    pub sleep_hours: Option<f64>,
    #[serde(rename = "ambiente")]
    pub environment: Environment,
    #[serde(rename = "condicoes", default)]
    pub conditions: BTreeSet<Condition>,
    #[serde(rename = "texto_livre", default)]
    pub free_text: Option<String>,
}

impl CheckIn {
    /// Minimal check-in: no sleep info, no conditions, no text.
    pub fn new(user_id: impl Into<String>, mood: Mood, focus: u8, environment: Environment) -> Self {
        Self {
            user_id: user_id.into(),
            mood,
            focus,
            sleep_hours: None,
            environment,
            conditions: BTreeSet::new(),
            free_text: None,
        }
    }

    pub fn sleep(mut self, hours: f64) -> Self {
        self.sleep_hours = Some(hours);
        self
    }

    pub fn condition(mut self, c: Condition) -> Self {
        self.conditions.insert(c);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.free_text = Some(text.into());
        self
    }

    #[inline]
    pub fn has(&self, c: Condition) -> bool {
        self.conditions.contains(&c)
    }

    /// Reject values the scoring tables are not defined for.
    /// Boundaries (focus 1 and 5, sleep 0 and 24) are valid.
    pub fn validate(&self) -> Result<(), CheckInError> {
        if self.user_id.trim().is_empty() {
            return Err(CheckInError::EmptyUserId);
        }
        if !(FOCUS_MIN..=FOCUS_MAX).contains(&self.focus) {
            return Err(CheckInError::FocusOutOfRange(self.focus));
        }
        if let Some(h) = self.sleep_hours {
            if !h.is_finite() || !(0.0..=SLEEP_MAX_HOURS).contains(&h) {
                return Err(CheckInError::SleepOutOfRange(h));
            }
        }
        Ok(())
    }
}
