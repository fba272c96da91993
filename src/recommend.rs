//! # Recommendations
//!
//! Mission and insight selection. Two ordered rule tables resolve a template
//! key from (profile, level, sentiment, trend); a [`Templates`] catalog turns
//! the key into text.
//!
//! - Deterministic: no randomness, one fixed string per key.
//! - The catalog defaults to the built-in Brazilian-Portuguese texts.
//! - A JSON file may override any subset of texts; missing keys keep the default.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;

use crate::checkin::CheckIn;
use crate::history::Trend;
use crate::profile::Profile;
use crate::score::Level;
use crate::sentiment::SentimentClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissionKey {
    Project,
    MobileFriendly,
    GentleReview,
    LowConnectivity,
    Stretch,
    Consolidate,
    StudyBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsightKey {
    GoodMoment,
    OnTheMove,
    Overload,
    MaterialChallenges,
    Evolving,
    FallingAndNegative,
    Flow,
    Critical,
    Intermediate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionTemplates {
    pub project: String,
    pub mobile_friendly: String,
    pub gentle_review: String,
    pub low_connectivity: String,
    pub stretch: String,
    pub consolidate: String,
    pub study_block: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightTemplates {
    pub good_moment: String,
    pub on_the_move: String,
    pub overload: String,
    pub material_challenges: String,
    pub evolving: String,
    pub falling_and_negative: String,
    pub flow: String,
    pub critical: String,
    pub intermediate: String,
}

/// Text catalog for missions and insights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Templates {
    /// Prepended to every mission.
    pub mission_prefix: String,
    pub missions: MissionTemplates,
    pub insights: InsightTemplates,
}

impl Default for MissionTemplates {
    fn default() -> Self {
        Self {
            project: "criar um mini-projeto de IA completo. Escolha um dataset simples \
                (por exemplo, sentimentos de frases ou previsões simples), treine um modelo \
                básico e publique o código em um repositório com um README curto explicando \
                sua ideia e resultado."
                .into(),
            mobile_friendly: "fazer uma missão totalmente mobile friendly. Use o celular para \
                anotar ideias de projetos em IA, desenhar um fluxo de dados ou escrever \
                pseudocódigo de um modelo. Foque em algo que você consiga começar e pausar \
                facilmente enquanto se desloca."
                .into(),
            gentle_review: "pegar leve. Reabra um projeto antigo e apenas melhore comentários, \
                organize arquivos e ajuste o README. Não há necessidade de começar algo novo \
                hoje: sua missão é deixar o que já existe mais claro e apresentável para o futuro."
                .into(),
            low_connectivity: "focar em uma missão que dependa pouco de internet e equipamentos. \
                Por exemplo, escrever em um caderno (ou bloco de notas) uma ideia de solução em \
                IA para um problema da sua quebrada, detalhando dados, entradas, saídas e \
                impacto social."
                .into(),
            stretch: "escolher um conteúdo ligeiramente acima do que você já domina. Replique \
                um código de IA que você viu em aula ou tutorial e faça uma pequena modificação \
                para aprender algo novo (por exemplo, mudar o tipo de modelo ou a métrica analisada)."
                .into(),
            consolidate: "fazer uma missão de 20 a 30 minutos: revise um conceito importante de \
                IA e anote exemplos práticos. Hoje o foco é consolidar, não forçar produtividade."
                .into(),
            study_block: "separar entre 30 e 45 minutos para estudar um exemplo de IA, replicar \
                o código e salvar o resultado em um lugar seguro (como seu GitHub ou uma pasta \
                organizada)."
                .into(),
        }
    }
}

impl Default for InsightTemplates {
    fn default() -> Self {
        Self {
            good_moment: "Você está em um bom momento de aprendizado. Aproveite para registrar \
                bem seus projetos, porque isso vira prova concreta das suas habilidades em \
                futuros processos seletivos ou oportunidades na área de tecnologia."
                .into(),
            on_the_move: "Seu estudo acontece em movimento, e isso é uma realidade de muita \
                gente na quebrada. Pequenos avanços consistentes contam muito: use pequenos \
                intervalos para pensar projetos, rascunhar ideias e se manter conectado com a \
                IA, mesmo sem um espaço fixo de estudo."
                .into(),
            overload: "Seu Ritmo Score indica sobrecarga. Isso não é fraqueza: é um alerta. Se \
                for possível, busque apoio em pessoas ou espaços seguros, como ONGs parceiras. \
                Respeitar seus limites hoje pode te permitir seguir na jornada de IA de forma \
                mais sustentável amanhã."
                .into(),
            material_challenges: "Seu contexto de estudo traz desafios materiais. Mesmo assim, \
                sua visão sobre problemas reais da periferia é extremamente valiosa. Use essa \
                experiência para imaginar soluções em IA conectadas à sua realidade: isso é \
                diferencial, não limitação."
                .into(),
            evolving: "Seu ritmo está evoluindo. Pequenos passos constantes estão te levando \
                para um nível cada vez mais avançado. Valorize o que você já conquistou e \
                mantenha um compromisso realista consigo mesma(o)."
                .into(),
            falling_and_negative: "Seu Ritmo Score vem caindo e seu texto indica momentos \
                difíceis. Considere reduzir a cobrança sobre desempenho agora e, se fizer \
                sentido, buscar apoio emocional ou social. A tecnologia pode esperar: você é \
                mais importante."
                .into(),
            flow: "Você está em estado de flow. Use esse momento para avançar em algo que faça \
                sentido para o seu futuro no trabalho: um projeto que você teria orgulho de \
                mostrar em uma entrevista ou processo seletivo."
                .into(),
            critical: "Seu Ritmo Score está crítico. Antes de qualquer missão ou meta, cuide de \
                você. Se possível, busque apoio em pessoas, serviços públicos ou ONGs. Quando \
                as coisas estiverem mais estáveis, o PerifaFlow continua aqui para te apoiar."
                .into(),
            intermediate: "Seu Ritmo Score indica um momento intermediário. Isso é normal. \
                Aproveite para fazer uma missão possível hoje, sem comparação com outras \
                pessoas. Sua jornada em IA é sua, no seu tempo."
                .into(),
        }
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            mission_prefix: "Sua missão de hoje no PerifaFlow é: ".into(),
            missions: MissionTemplates::default(),
            insights: InsightTemplates::default(),
        }
    }
}

impl Templates {
    /// Load overrides from a JSON file on top of the defaults.
    /// Falls back to the defaults if the file is missing or invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!(target: "ritmo", path = %path.display(), error = %e, "invalid templates file; using defaults");
                Self::default()
            }),
            Err(e) => {
                warn!(target: "ritmo", path = %path.display(), error = %e, "templates file unreadable; using defaults");
                Self::default()
            }
        }
    }

    pub fn mission_text(&self, key: MissionKey) -> &str {
        let m = &self.missions;
        match key {
            MissionKey::Project => &m.project,
            MissionKey::MobileFriendly => &m.mobile_friendly,
            MissionKey::GentleReview => &m.gentle_review,
            MissionKey::LowConnectivity => &m.low_connectivity,
            MissionKey::Stretch => &m.stretch,
            MissionKey::Consolidate => &m.consolidate,
            MissionKey::StudyBlock => &m.study_block,
        }
    }

    pub fn insight_text(&self, key: InsightKey) -> &str {
        let i = &self.insights;
        match key {
            InsightKey::GoodMoment => &i.good_moment,
            InsightKey::OnTheMove => &i.on_the_move,
            InsightKey::Overload => &i.overload,
            InsightKey::MaterialChallenges => &i.material_challenges,
            InsightKey::Evolving => &i.evolving,
            InsightKey::FallingAndNegative => &i.falling_and_negative,
            InsightKey::Flow => &i.flow,
            InsightKey::Critical => &i.critical,
            InsightKey::Intermediate => &i.intermediate,
        }
    }
}

/* ----------------------------
Rule tables
---------------------------- */

#[derive(Debug, Clone, Copy)]
pub struct MissionSignals<'a> {
    pub profile: Profile,
    pub level: Level,
    pub checkin: &'a CheckIn,
}

#[derive(Debug, Clone, Copy)]
pub struct InsightSignals {
    pub profile: Profile,
    pub level: Level,
    pub sentiment: SentimentClass,
    pub trend: Trend,
}

pub struct MissionRule {
    pub name: &'static str,
    pub when: fn(&MissionSignals<'_>) -> bool,
    pub then: MissionKey,
}

pub struct InsightRule {
    pub name: &'static str,
    pub when: fn(&InsightSignals) -> bool,
    pub then: InsightKey,
}

/// First match wins; last rule is the catch-all.
pub static MISSION_RULES: &[MissionRule] = &[
    MissionRule {
        name: "productive_or_high_potential",
        when: |s| matches!(s.profile, Profile::Productive | Profile::HighPotential),
        then: MissionKey::Project,
    },
    MissionRule {
        name: "nomad",
        when: |s| s.profile == Profile::Nomad,
        then: MissionKey::MobileFriendly,
    },
    MissionRule {
        name: "overloaded_or_sensitive",
        when: |s| matches!(s.profile, Profile::Overloaded | Profile::Sensitive),
        then: MissionKey::GentleReview,
    },
    MissionRule {
        name: "hard_context",
        when: |s| s.profile == Profile::HardContext,
        then: MissionKey::LowConnectivity,
    },
    MissionRule {
        name: "evolving",
        when: |s| s.profile == Profile::Evolving,
        then: MissionKey::Stretch,
    },
    MissionRule {
        name: "alert_level",
        when: |s| s.level == Level::Alert,
        then: MissionKey::Consolidate,
    },
    MissionRule {
        name: "fallback",
        when: |_| true,
        then: MissionKey::StudyBlock,
    },
];

/// First match wins; last rule is the catch-all.
pub static INSIGHT_RULES: &[InsightRule] = &[
    InsightRule {
        name: "productive_or_high_potential",
        when: |s| matches!(s.profile, Profile::Productive | Profile::HighPotential),
        then: InsightKey::GoodMoment,
    },
    InsightRule {
        name: "nomad",
        when: |s| s.profile == Profile::Nomad,
        then: InsightKey::OnTheMove,
    },
    InsightRule {
        name: "overloaded_or_sensitive",
        when: |s| matches!(s.profile, Profile::Overloaded | Profile::Sensitive),
        then: InsightKey::Overload,
    },
    InsightRule {
        name: "hard_context",
        when: |s| s.profile == Profile::HardContext,
        then: InsightKey::MaterialChallenges,
    },
    InsightRule {
        name: "evolving",
        when: |s| s.profile == Profile::Evolving,
        then: InsightKey::Evolving,
    },
    InsightRule {
        name: "falling_and_negative",
        when: |s| s.trend == Trend::Falling && s.sentiment == SentimentClass::Negative,
        then: InsightKey::FallingAndNegative,
    },
    InsightRule {
        name: "flow_level",
        when: |s| s.level == Level::Flow,
        then: InsightKey::Flow,
    },
    InsightRule {
        name: "critical_level",
        when: |s| s.level == Level::Critical,
        then: InsightKey::Critical,
    },
    InsightRule {
        name: "fallback",
        when: |_| true,
        then: InsightKey::Intermediate,
    },
];

pub fn mission_key(profile: Profile, level: Level, checkin: &CheckIn) -> MissionKey {
    let s = MissionSignals {
        profile,
        level,
        checkin,
    };
    MISSION_RULES
        .iter()
        .find(|r| (r.when)(&s))
        .map(|r| r.then)
        .unwrap_or(MissionKey::StudyBlock)
}

pub fn insight_key(
    profile: Profile,
    level: Level,
    sentiment: SentimentClass,
    trend: Trend,
) -> InsightKey {
    let s = InsightSignals {
        profile,
        level,
        sentiment,
        trend,
    };
    INSIGHT_RULES
        .iter()
        .find(|r| (r.when)(&s))
        .map(|r| r.then)
        .unwrap_or(InsightKey::Intermediate)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub profile: Profile,
    pub mission: String,
    pub insight: String,
}

/// Resolves rule-table keys against a template catalog.
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    templates: Templates,
}

impl Recommender {
    pub fn new(templates: Templates) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn mission(&self, profile: Profile, level: Level, checkin: &CheckIn) -> String {
        let key = mission_key(profile, level, checkin);
        format!(
            "{}{}",
            self.templates.mission_prefix,
            self.templates.mission_text(key)
        )
    }

    pub fn insight(
        &self,
        profile: Profile,
        level: Level,
        sentiment: SentimentClass,
        trend: Trend,
    ) -> String {
        self.templates
            .insight_text(insight_key(profile, level, sentiment, trend))
            .to_string()
    }

    pub fn recommend(
        &self,
        profile: Profile,
        level: Level,
        sentiment: SentimentClass,
        trend: Trend,
        checkin: &CheckIn,
    ) -> RecommendationResult {
        RecommendationResult {
            profile,
            mission: self.mission(profile, level, checkin),
            insight: self.insight(profile, level, sentiment, trend),
        }
    }
}
