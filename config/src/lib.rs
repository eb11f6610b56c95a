//! Configuration for the chatpress gate.
//!
//! Every threshold and rule table the core uses lives here so deployments can
//! retune vocabularies and cut-offs without touching the algorithm. Omitted
//! TOML keys fall back to the canonical defaults.
//!
//! ```toml
//! banned_phrases = ["comprehensive discussion and analysis"]
//!
//! [thresholds]
//! min_pass_score = 80
//! min_repair_score = 40
//! min_coverage_pct = 35.0
//!
//! [length_bands.critique]
//! min = 150
//! max = 900
//! ```

mod defaults;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use chatpress_types::{AnchorKind, Genre, Section};

use defaults::strings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config{}: {source}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    Parse {
        path: Option<PathBuf>,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } => Some(path),
            ConfigError::Parse { path, .. } => path.as_deref(),
            ConfigError::Invalid(_) => None,
        }
    }
}

/// Complete gate configuration, injected into the core at construction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Phrases that mark template filler. Matched case-insensitively as substrings.
    pub banned_phrases: Vec<String>,
    pub thresholds: Thresholds,
    pub length_bands: LengthBands,
    pub anchors: AnchorRules,
    pub routing: RoutingRules,
    pub judging: JudgingRules,
    pub repair: RepairTemplates,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            banned_phrases: strings(defaults::BANNED_PHRASES),
            thresholds: Thresholds::default(),
            length_bands: LengthBands::default(),
            anchors: AnchorRules::default(),
            routing: RoutingRules::default(),
            judging: JudgingRules::default(),
            repair: RepairTemplates::default(),
        }
    }
}

impl GateConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: GateConfig =
            toml::from_str(raw).map_err(|source| ConfigError::Parse { path: None, source })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        let config: GateConfig = match toml::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                return Err(ConfigError::Parse {
                    path: Some(path.to_path_buf()),
                    source: err,
                });
            }
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "gate config loaded");
        Ok(config)
    }

    /// Reject threshold combinations the algorithm cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if t.min_pass_score > 100 {
            return Err(invalid(format!(
                "thresholds.min_pass_score must be <= 100 (got {})",
                t.min_pass_score
            )));
        }
        if t.min_repair_score > t.min_pass_score {
            return Err(invalid(format!(
                "thresholds.min_repair_score ({}) must not exceed min_pass_score ({})",
                t.min_repair_score, t.min_pass_score
            )));
        }
        if !(0.0..=100.0).contains(&t.min_coverage_pct) {
            return Err(invalid(format!(
                "thresholds.min_coverage_pct must be within 0..=100 (got {})",
                t.min_coverage_pct
            )));
        }
        if t.min_words > t.max_words {
            return Err(invalid(format!(
                "thresholds.min_words ({}) must not exceed max_words ({})",
                t.min_words, t.max_words
            )));
        }

        let bands = &self.length_bands;
        if !(0.0..=1.0).contains(&bands.widen_low)
            || !bands.widen_high.is_finite()
            || bands.widen_high < 1.0
        {
            return Err(invalid(
                "length_bands.widen_low must be within 0..=1 and widen_high finite and >= 1"
                    .to_string(),
            ));
        }
        for genre in Genre::ALL {
            let band = bands.for_genre(genre);
            if band.min > band.max {
                return Err(invalid(format!(
                    "length_bands.{genre}: min ({}) must not exceed max ({})",
                    band.min, band.max
                )));
            }
            if self.judging.required.for_genre(genre).is_empty() {
                return Err(invalid(format!(
                    "judging.required.{genre} must name at least one section"
                )));
            }
        }

        for section in Section::ALL {
            if self.judging.sections.for_section(section).is_empty() {
                return Err(invalid(format!(
                    "judging.sections.{} must list at least one heading",
                    section.as_str()
                )));
            }
        }

        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum score for a verdict to pass. Default: 80.
    pub min_pass_score: u8,
    /// Documents scoring below this are not worth a repair attempt. Default: 40.
    pub min_repair_score: u8,
    /// Anchor coverage below this percentage is a hard fail. Default: 35.
    pub min_coverage_pct: f64,
    /// Fewer `(msg N)` citations than this is a hard fail. Default: 2.
    pub min_citations: usize,
    /// Absolute word-count floor. Default: 50.
    pub min_words: usize,
    /// Absolute word-count ceiling. Default: 2000.
    pub max_words: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_pass_score: 80,
            min_repair_score: 40,
            min_coverage_pct: 35.0,
            min_citations: 2,
            min_words: 50,
            max_words: 2000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WordBand {
    pub min: usize,
    pub max: usize,
}

impl WordBand {
    #[must_use]
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(self, words: usize) -> bool {
        (self.min..=self.max).contains(&words)
    }
}

/// Per-genre target lengths. Half credit is given inside the widened band
/// `[min * widen_low, max * widen_high]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LengthBands {
    pub technical_journal: WordBand,
    pub research_article: WordBand,
    pub critique: WordBand,
    pub widen_low: f64,
    pub widen_high: f64,
}

impl Default for LengthBands {
    fn default() -> Self {
        Self {
            technical_journal: WordBand::new(100, 1400),
            research_article: WordBand::new(100, 1000),
            critique: WordBand::new(100, 1100),
            widen_low: 0.5,
            widen_high: 1.2,
        }
    }
}

impl LengthBands {
    #[must_use]
    pub fn for_genre(&self, genre: Genre) -> WordBand {
        match genre {
            Genre::TechnicalJournal => self.technical_journal,
            Genre::ResearchArticle => self.research_article,
            Genre::Critique => self.critique,
        }
    }

    #[must_use]
    pub fn widened(&self, genre: Genre) -> (f64, f64) {
        let band = self.for_genre(genre);
        (
            band.min as f64 * self.widen_low,
            band.max as f64 * self.widen_high,
        )
    }
}

/// Anchor extraction battery.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnchorRules {
    /// Characters of surrounding text kept on each side of a match. Default: 50.
    pub context_radius: usize,
    pub patterns: AnchorPatterns,
    pub tags: Vec<TagRule>,
}

impl Default for AnchorRules {
    fn default() -> Self {
        Self {
            context_radius: 50,
            patterns: AnchorPatterns::default(),
            tags: defaults::TAG_RULES
                .iter()
                .map(|(kind, needle, tag, case_sensitive)| TagRule {
                    kind: *kind,
                    needle: (*needle).to_string(),
                    tag: (*tag).to_string(),
                    case_sensitive: *case_sensitive,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnchorPatterns {
    pub decision: Vec<String>,
    pub command: Vec<String>,
    pub citation: Vec<String>,
    pub error: Vec<String>,
    pub model: Vec<String>,
    pub ship_action: Vec<String>,
    pub research_noun: Vec<String>,
    pub opinion: Vec<String>,
}

impl Default for AnchorPatterns {
    fn default() -> Self {
        Self {
            decision: strings(defaults::DECISION_PATTERNS),
            command: strings(defaults::COMMAND_PATTERNS),
            citation: strings(defaults::CITATION_PATTERNS),
            error: strings(defaults::ERROR_PATTERNS),
            model: strings(defaults::MODEL_PATTERNS),
            ship_action: strings(defaults::SHIP_ACTION_PATTERNS),
            research_noun: vec![defaults::RESEARCH_TERMS.to_string()],
            opinion: strings(defaults::OPINION_PATTERNS),
        }
    }
}

impl AnchorPatterns {
    #[must_use]
    pub fn for_kind(&self, kind: AnchorKind) -> &[String] {
        match kind {
            AnchorKind::Decision => &self.decision,
            AnchorKind::Command => &self.command,
            AnchorKind::Citation => &self.citation,
            AnchorKind::Error => &self.error,
            AnchorKind::Model => &self.model,
            AnchorKind::ShipAction => &self.ship_action,
            AnchorKind::ResearchNoun => &self.research_noun,
            AnchorKind::Opinion => &self.opinion,
        }
    }
}

/// Adds `tag` to every anchor of `kind` whose message contains `needle`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagRule {
    pub kind: AnchorKind,
    pub needle: String,
    pub tag: String,
    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoutingRules {
    pub blocked_reason: String,
    pub technical_journal: TechnicalJournalRules,
    pub research_article: ResearchArticleRules,
    pub critique: CritiqueRules,
}

impl Default for RoutingRules {
    fn default() -> Self {
        Self {
            blocked_reason: defaults::BLOCKED_REASON.to_string(),
            technical_journal: TechnicalJournalRules::default(),
            research_article: ResearchArticleRules::default(),
            critique: CritiqueRules::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TechnicalJournalRules {
    pub system_keywords: Vec<String>,
    pub min_system_keywords: usize,
    /// Named local tooling; a match is any anchor mentioning the term.
    pub tooling_terms: Vec<String>,
    pub decision_keywords: Vec<String>,
    pub weights: TechnicalJournalWeights,
}

impl Default for TechnicalJournalRules {
    fn default() -> Self {
        Self {
            system_keywords: strings(defaults::SYSTEM_KEYWORDS),
            min_system_keywords: 2,
            tooling_terms: strings(defaults::LOCAL_TOOLING_TERMS),
            decision_keywords: strings(defaults::DECISION_KEYWORDS),
            weights: TechnicalJournalWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TechnicalJournalWeights {
    pub per_command: u32,
    pub decision: u32,
    pub per_tooling_term: u32,
    pub per_system_keyword: u32,
}

impl Default for TechnicalJournalWeights {
    fn default() -> Self {
        Self {
            per_command: 3,
            decision: 5,
            per_tooling_term: 3,
            per_system_keyword: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResearchArticleRules {
    pub domain_term_pattern: String,
    pub min_domain_terms: usize,
    pub pattern_keywords: Vec<String>,
    pub min_pattern_keywords: usize,
    /// Concrete research objects that win the research/critique tie-break.
    pub research_object_pattern: String,
    pub weights: ResearchArticleWeights,
}

impl Default for ResearchArticleRules {
    fn default() -> Self {
        Self {
            domain_term_pattern: defaults::RESEARCH_TERMS.to_string(),
            min_domain_terms: 3,
            pattern_keywords: strings(defaults::RESEARCH_PHRASES),
            min_pattern_keywords: 2,
            research_object_pattern: defaults::RESEARCH_OBJECTS.to_string(),
            weights: ResearchArticleWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResearchArticleWeights {
    pub per_domain_term: u32,
    pub citation: u32,
    pub per_pattern_keyword: u32,
}

impl Default for ResearchArticleWeights {
    fn default() -> Self {
        Self {
            per_domain_term: 2,
            citation: 5,
            per_pattern_keyword: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CritiqueRules {
    pub token_pattern: String,
    pub min_tokens: usize,
    pub phrase_keywords: Vec<String>,
    pub min_phrases: usize,
    pub weights: CritiqueWeights,
}

impl Default for CritiqueRules {
    fn default() -> Self {
        Self {
            token_pattern: defaults::CRITIQUE_TOKENS.to_string(),
            min_tokens: 2,
            phrase_keywords: strings(defaults::CRITIQUE_PHRASES),
            min_phrases: 1,
            weights: CritiqueWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CritiqueWeights {
    pub opinion: u32,
    pub per_token: u32,
    pub per_phrase: u32,
}

impl Default for CritiqueWeights {
    fn default() -> Self {
        Self {
            opinion: 5,
            per_token: 2,
            per_phrase: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct JudgingRules {
    pub sections: SectionHeadings,
    pub required: RequiredSections,
    pub command_line_pattern: String,
    pub command_block_pattern: String,
    pub command_flag_pattern: String,
    pub min_commands: usize,
    pub domain_term_pattern: String,
    pub min_domain_terms: usize,
    pub local_tooling_terms: Vec<String>,
    pub quantization_pattern: String,
    pub shipping_decision_pattern: String,
    pub research_tooling_terms: Vec<String>,
    pub min_findings_bullets: usize,
    pub min_cited_findings: usize,
    pub stance_patterns: Vec<String>,
    pub consequence_terms: Vec<String>,
    pub min_consequence_terms: usize,
}

impl Default for JudgingRules {
    fn default() -> Self {
        Self {
            sections: SectionHeadings::default(),
            required: RequiredSections::default(),
            command_line_pattern: defaults::COMMAND_LINE.to_string(),
            command_block_pattern: defaults::COMMAND_BLOCK.to_string(),
            command_flag_pattern: defaults::COMMAND_FLAG.to_string(),
            min_commands: 2,
            domain_term_pattern: defaults::RESEARCH_TERMS.to_string(),
            min_domain_terms: 3,
            local_tooling_terms: strings(defaults::LOCAL_TOOLING_TERMS),
            quantization_pattern: defaults::QUANTIZATION.to_string(),
            shipping_decision_pattern: defaults::SHIPPING_DECISION.to_string(),
            research_tooling_terms: strings(defaults::RESEARCH_TOOLING_TERMS),
            min_findings_bullets: 3,
            min_cited_findings: 2,
            stance_patterns: strings(defaults::STANCE_PATTERNS),
            consequence_terms: strings(defaults::CONSEQUENCE_TERMS),
            min_consequence_terms: 2,
        }
    }
}

/// Accepted `##` heading synonyms per section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SectionHeadings {
    pub tldr: Vec<String>,
    pub decision_log: Vec<String>,
    pub commands: Vec<String>,
    pub open_questions: Vec<String>,
    pub tags: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_: Vec<String>,
    pub research_questions: Vec<String>,
    pub findings: Vec<String>,
    pub thesis: Vec<String>,
    pub counterpoints: Vec<String>,
}

impl Default for SectionHeadings {
    fn default() -> Self {
        Self {
            tldr: strings(defaults::TLDR_HEADINGS),
            decision_log: strings(defaults::DECISION_LOG_HEADINGS),
            commands: strings(defaults::COMMANDS_HEADINGS),
            open_questions: strings(defaults::OPEN_QUESTIONS_HEADINGS),
            tags: strings(defaults::TAGS_HEADINGS),
            abstract_: strings(defaults::ABSTRACT_HEADINGS),
            research_questions: strings(defaults::RESEARCH_QUESTIONS_HEADINGS),
            findings: strings(defaults::FINDINGS_HEADINGS),
            thesis: strings(defaults::THESIS_HEADINGS),
            counterpoints: strings(defaults::COUNTERPOINTS_HEADINGS),
        }
    }
}

impl SectionHeadings {
    #[must_use]
    pub fn for_section(&self, section: Section) -> &[String] {
        match section {
            Section::Tldr => &self.tldr,
            Section::DecisionLog => &self.decision_log,
            Section::Commands => &self.commands,
            Section::OpenQuestions => &self.open_questions,
            Section::Tags => &self.tags,
            Section::Abstract => &self.abstract_,
            Section::ResearchQuestions => &self.research_questions,
            Section::Findings => &self.findings,
            Section::Thesis => &self.thesis,
            Section::Counterpoints => &self.counterpoints,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RequiredSections {
    pub technical_journal: Vec<Section>,
    pub research_article: Vec<Section>,
    pub critique: Vec<Section>,
}

impl Default for RequiredSections {
    fn default() -> Self {
        Self {
            technical_journal: vec![
                Section::Tldr,
                Section::DecisionLog,
                Section::Commands,
                Section::OpenQuestions,
                Section::Tags,
            ],
            research_article: vec![
                Section::Abstract,
                Section::ResearchQuestions,
                Section::Findings,
                Section::Tags,
            ],
            critique: vec![Section::Thesis, Section::Counterpoints, Section::Tags],
        }
    }
}

impl RequiredSections {
    #[must_use]
    pub fn for_genre(&self, genre: Genre) -> &[Section] {
        match genre {
            Genre::TechnicalJournal => &self.technical_journal,
            Genre::ResearchArticle => &self.research_article,
            Genre::Critique => &self.critique,
        }
    }
}

/// Canned text the repair loop falls back on when the transcript itself
/// offers nothing to quote.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RepairTemplates {
    pub decision_log_heading: String,
    pub fallback_decision: String,
    pub fallback_commands: Vec<String>,
    pub expansion_heading: String,
    pub expansion_paragraph: String,
    pub thesis_statement: String,
    pub counterpoints: Vec<String>,
    /// Upper bound on entries quoted from the transcript per patch. Default: 5.
    pub max_entries: usize,
}

impl Default for RepairTemplates {
    fn default() -> Self {
        Self {
            decision_log_heading: defaults::DECISION_LOG_HEADING.to_string(),
            fallback_decision: defaults::FALLBACK_DECISION.to_string(),
            fallback_commands: strings(defaults::FALLBACK_COMMANDS),
            expansion_heading: defaults::EXPANSION_HEADING.to_string(),
            expansion_paragraph: defaults::EXPANSION_PARAGRAPH.to_string(),
            thesis_statement: defaults::THESIS_STATEMENT.to_string(),
            counterpoints: strings(defaults::COUNTERPOINTS),
            max_entries: 5,
        }
    }
}
