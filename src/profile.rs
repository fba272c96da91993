//! Study profile classification.
//!
//! An ordered decision table over (level, sentiment, trend, check-in context).
//! Categories overlap, so rules are evaluated top to bottom and the first match
//! wins. The table ends with a catch-all, so every input gets exactly one profile.

use serde::{Deserialize, Serialize};

use crate::checkin::{CheckIn, Condition};
use crate::history::Trend;
use crate::score::Level;
use crate::sentiment::SentimentClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Profile {
    #[serde(rename = "sobrecarregado")]
    Overloaded,
    #[serde(rename = "contexto_dificil")]
    HardContext,
    #[serde(rename = "critico")]
    Critical,
    #[serde(rename = "nomade")]
    Nomad,
    #[serde(rename = "sensivel")]
    Sensitive,
    #[serde(rename = "em_alerta")]
    OnAlert,
    #[serde(rename = "produtivo")]
    Productive,
    #[serde(rename = "alto_potencial")]
    HighPotential,
    #[serde(rename = "em_evolucao")]
    Evolving,
    #[serde(rename = "neutro")]
    Neutral,
}

impl Profile {
    pub const ALL: [Profile; 10] = [
        Profile::Overloaded,
        Profile::HardContext,
        Profile::Critical,
        Profile::Nomad,
        Profile::Sensitive,
        Profile::OnAlert,
        Profile::Productive,
        Profile::HighPotential,
        Profile::Evolving,
        Profile::Neutral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Overloaded => "sobrecarregado",
            Profile::HardContext => "contexto_dificil",
            Profile::Critical => "critico",
            Profile::Nomad => "nomade",
            Profile::Sensitive => "sensivel",
            Profile::OnAlert => "em_alerta",
            Profile::Productive => "produtivo",
            Profile::HighPotential => "alto_potencial",
            Profile::Evolving => "em_evolucao",
            Profile::Neutral => "neutro",
        }
    }
}

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct Signals<'a> {
    pub level: Level,
    pub sentiment: SentimentClass,
    pub trend: Trend,
    pub checkin: &'a CheckIn,
}

impl Signals<'_> {
    /// Critical level or a falling score: the pressure branch.
    fn under_pressure(&self) -> bool {
        self.level == Level::Critical || self.trend == Trend::Falling
    }

    fn negative(&self) -> bool {
        self.sentiment == SentimentClass::Negative
    }
}

pub struct ProfileRule {
    pub name: &'static str,
    pub when: fn(&Signals<'_>) -> bool,
    pub then: Profile,
}

/// Precedence is the slice order.
pub static PROFILE_RULES: &[ProfileRule] = &[
    ProfileRule {
        name: "pressure_with_negative_text_or_stress",
        when: |s| s.under_pressure() && (s.negative() || s.checkin.has(Condition::Stress)),
        then: Profile::Overloaded,
    },
    ProfileRule {
        name: "pressure_with_material_constraints",
        when: |s| {
            s.under_pressure()
                && (s.checkin.has(Condition::NoInternet) || s.checkin.has(Condition::NoSpace))
        },
        then: Profile::HardContext,
    },
    ProfileRule {
        name: "pressure",
        when: |s| s.under_pressure(),
        then: Profile::Critical,
    },
    ProfileRule {
        name: "alert_on_the_move",
        when: |s| s.level == Level::Alert && s.checkin.environment.is_on_the_move(),
        then: Profile::Nomad,
    },
    ProfileRule {
        name: "alert_negative_text",
        when: |s| s.level == Level::Alert && s.negative(),
        then: Profile::Sensitive,
    },
    ProfileRule {
        name: "alert",
        when: |s| s.level == Level::Alert,
        then: Profile::OnAlert,
    },
    ProfileRule {
        name: "flow_positive_text",
        when: |s| s.level == Level::Flow && s.sentiment == SentimentClass::Positive,
        then: Profile::Productive,
    },
    ProfileRule {
        name: "flow",
        when: |s| s.level == Level::Flow,
        then: Profile::HighPotential,
    },
    ProfileRule {
        name: "neutral_rising",
        when: |s| s.level == Level::Neutral && s.trend == Trend::Rising,
        then: Profile::Evolving,
    },
    ProfileRule {
        name: "fallback",
        when: |_| true,
        then: Profile::Neutral,
    },
];

/// First matching rule for `signals`.
pub fn matching_rule(signals: &Signals<'_>) -> &'static ProfileRule {
    PROFILE_RULES
        .iter()
        .find(|r| (r.when)(signals))
        .unwrap_or(&PROFILE_RULES[PROFILE_RULES.len() - 1])
}

pub fn classify(
    level: Level,
    sentiment: SentimentClass,
    trend: Trend,
    checkin: &CheckIn,
) -> Profile {
    let signals = Signals {
        level,
        sentiment,
        trend,
        checkin,
    };
    matching_rule(&signals).then
}
