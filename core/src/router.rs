//! Deterministic genre routing.
//!
//! Three independent predicates are evaluated over the anchor set and the
//! raw conversation text. `technical_journal` is checked first and wins
//! outright; research and critique are then resolved by a tie-break when
//! both fire.

use regex::Regex;

use chatpress_config::{
    CritiqueWeights, ResearchArticleWeights, RoutingRules, TechnicalJournalWeights,
};
use chatpress_types::{AnchorKind, Genre, RoutingDecision};

use crate::anchors::AnchorSet;
use crate::error::RulesError;
use crate::matcher::{Boundary, KeywordSet, compile};

/// Weighted evidence for each genre, as used by the tie-break and
/// [`Router::confidence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenreScores {
    pub technical_journal: u32,
    pub research_article: u32,
    pub critique: u32,
}

impl GenreScores {
    #[must_use]
    pub fn get(&self, genre: Genre) -> u32 {
        match genre {
            Genre::TechnicalJournal => self.technical_journal,
            Genre::ResearchArticle => self.research_article,
            Genre::Critique => self.critique,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.technical_journal
            .saturating_add(self.research_article)
            .saturating_add(self.critique)
    }

    /// Highest-scoring genre. Ties go to the earlier genre in
    /// [`Genre::ALL`]; `None` when every score is zero.
    #[must_use]
    pub fn leader(&self) -> Option<Genre> {
        let mut best: Option<(Genre, u32)> = None;
        for genre in Genre::ALL {
            let score = self.get(genre);
            if score > 0 && best.is_none_or(|(_, top)| score > top) {
                best = Some((genre, score));
            }
        }
        best.map(|(genre, _)| genre)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteConfidence {
    /// Leader's share of the combined score, 0–100.
    pub confidence: f64,
    pub leader: Option<Genre>,
    pub reasoning: String,
    pub scores: GenreScores,
}

#[derive(Debug, Clone)]
struct TechnicalSignals {
    system_keywords: KeywordSet,
    min_system_keywords: usize,
    tooling_terms: Vec<String>,
    decision_keywords: KeywordSet,
    weights: TechnicalJournalWeights,
}

#[derive(Debug, Clone)]
struct ResearchSignals {
    domain_terms: Regex,
    min_domain_terms: usize,
    phrases: KeywordSet,
    min_phrases: usize,
    research_objects: Regex,
    weights: ResearchArticleWeights,
}

#[derive(Debug, Clone)]
struct CritiqueSignals {
    tokens: Regex,
    min_tokens: usize,
    phrases: KeywordSet,
    min_phrases: usize,
    weights: CritiqueWeights,
}

#[derive(Debug, Clone)]
pub struct Router {
    blocked_reason: String,
    technical: TechnicalSignals,
    research: ResearchSignals,
    critique: CritiqueSignals,
}

impl Router {
    pub fn new(rules: &RoutingRules) -> Result<Self, RulesError> {
        let tj = &rules.technical_journal;
        let ra = &rules.research_article;
        let cr = &rules.critique;
        Ok(Self {
            blocked_reason: rules.blocked_reason.clone(),
            technical: TechnicalSignals {
                system_keywords: KeywordSet::new(
                    "routing.technical_journal.system_keywords",
                    &tj.system_keywords,
                    Boundary::Prefix,
                )?,
                min_system_keywords: tj.min_system_keywords,
                tooling_terms: tj.tooling_terms.clone(),
                decision_keywords: KeywordSet::new(
                    "routing.technical_journal.decision_keywords",
                    &tj.decision_keywords,
                    Boundary::Prefix,
                )?,
                weights: tj.weights.clone(),
            },
            research: ResearchSignals {
                domain_terms: compile(
                    "routing.research_article.domain_term_pattern",
                    &ra.domain_term_pattern,
                )?,
                min_domain_terms: ra.min_domain_terms,
                phrases: KeywordSet::new(
                    "routing.research_article.pattern_keywords",
                    &ra.pattern_keywords,
                    Boundary::Prefix,
                )?,
                min_phrases: ra.min_pattern_keywords,
                research_objects: compile(
                    "routing.research_article.research_object_pattern",
                    &ra.research_object_pattern,
                )?,
                weights: ra.weights.clone(),
            },
            critique: CritiqueSignals {
                tokens: compile("routing.critique.token_pattern", &cr.token_pattern)?,
                min_tokens: cr.min_tokens,
                phrases: KeywordSet::new(
                    "routing.critique.phrase_keywords",
                    &cr.phrase_keywords,
                    Boundary::Word,
                )?,
                min_phrases: cr.min_phrases,
                weights: cr.weights.clone(),
            },
        })
    }

    /// Assign a genre to `primary_text`, or block it.
    #[must_use]
    pub fn route(&self, primary_text: &str, anchors: &AnchorSet) -> RoutingDecision {
        if self.is_technical_journal(primary_text, anchors) {
            tracing::debug!(genre = %Genre::TechnicalJournal, "routed");
            return RoutingDecision::routed(Genre::TechnicalJournal);
        }

        let research = self.is_research_article(primary_text, anchors);
        let critique = self.is_critique(primary_text, anchors);
        tracing::debug!(research, critique, "research/critique predicates");

        let genre = match (research, critique) {
            (true, true) => self.break_tie(primary_text, anchors),
            (true, false) => Genre::ResearchArticle,
            (false, true) => Genre::Critique,
            (false, false) => {
                tracing::debug!(reason = %self.blocked_reason, "routing blocked");
                return RoutingDecision::blocked(self.blocked_reason.clone());
            }
        };
        tracing::debug!(genre = %genre, "routed");
        RoutingDecision::routed(genre)
    }

    fn break_tie(&self, text: &str, anchors: &AnchorSet) -> Genre {
        let research_score = self.research_score(text, anchors);
        let critique_score = self.critique_score(text, anchors);
        let has_research_objects = self.research.research_objects.is_match(text);
        tracing::debug!(
            research_score,
            critique_score,
            has_research_objects,
            "research/critique tie-break"
        );
        if has_research_objects {
            Genre::ResearchArticle
        } else {
            Genre::Critique
        }
    }

    fn is_technical_journal(&self, text: &str, anchors: &AnchorSet) -> bool {
        let t = &self.technical;
        let has_commands = anchors.has(AnchorKind::Command);
        let has_decisions = anchors.has_decision();
        let system_building = t.system_keywords.distinct_matches(text) >= t.min_system_keywords;
        let decision_keyword = t.decision_keywords.is_match(text);
        let tooling = t.tooling_terms.iter().any(|term| anchors.mentions(term));

        (has_commands && has_decisions)
            || system_building
            || (tooling && decision_keyword)
            || (has_commands && decision_keyword)
    }

    fn is_research_article(&self, text: &str, anchors: &AnchorSet) -> bool {
        let r = &self.research;
        let domain_terms = anchors.count_matching(&r.domain_terms);
        domain_terms >= r.min_domain_terms
            && (anchors.has_citation() || r.phrases.distinct_matches(text) >= r.min_phrases)
    }

    fn is_critique(&self, text: &str, anchors: &AnchorSet) -> bool {
        let c = &self.critique;
        anchors.has_opinion()
            && (anchors.count_matching(&c.tokens) >= c.min_tokens
                || c.phrases.distinct_matches(text) >= c.min_phrases)
    }

    fn technical_score(&self, text: &str, anchors: &AnchorSet) -> u32 {
        let t = &self.technical;
        let w = &t.weights;
        let tools = t
            .tooling_terms
            .iter()
            .filter(|term| anchors.mentions(term))
            .count();
        weighted(w.per_command, anchors.count(AnchorKind::Command))
            .saturating_add(if anchors.has_decision() { w.decision } else { 0 })
            .saturating_add(weighted(w.per_tooling_term, tools))
            .saturating_add(weighted(
                w.per_system_keyword,
                t.system_keywords.distinct_matches(text),
            ))
    }

    fn research_score(&self, text: &str, anchors: &AnchorSet) -> u32 {
        let r = &self.research;
        let w = &r.weights;
        weighted(w.per_domain_term, anchors.count_matching(&r.domain_terms))
            .saturating_add(if anchors.has_citation() { w.citation } else { 0 })
            .saturating_add(weighted(
                w.per_pattern_keyword,
                r.phrases.distinct_matches(text),
            ))
    }

    fn critique_score(&self, text: &str, anchors: &AnchorSet) -> u32 {
        let c = &self.critique;
        let w = &c.weights;
        (if anchors.has_opinion() { w.opinion } else { 0 })
            .saturating_add(weighted(w.per_token, anchors.count_matching(&c.tokens)))
            .saturating_add(weighted(w.per_phrase, c.phrases.distinct_matches(text)))
    }

    #[must_use]
    pub fn scores(&self, primary_text: &str, anchors: &AnchorSet) -> GenreScores {
        GenreScores {
            technical_journal: self.technical_score(primary_text, anchors),
            research_article: self.research_score(primary_text, anchors),
            critique: self.critique_score(primary_text, anchors),
        }
    }

    /// How decisively the weighted evidence favors one genre.
    ///
    /// Informational only: [`route`](Self::route) never consults it.
    #[must_use]
    pub fn confidence(&self, primary_text: &str, anchors: &AnchorSet) -> RouteConfidence {
        let scores = self.scores(primary_text, anchors);
        let total = scores.total();
        let leader = scores.leader();
        let (confidence, reasoning) = match leader {
            Some(genre) if total > 0 => {
                let top = scores.get(genre);
                (
                    f64::from(top) / f64::from(total) * 100.0,
                    format!("{} indicators: {top} points", indicator_label(genre)),
                )
            }
            _ => (0.0, "No clear indicators found".to_string()),
        };
        RouteConfidence {
            confidence,
            leader,
            reasoning,
            scores,
        }
    }
}

fn weighted(weight: u32, count: usize) -> u32 {
    weight.saturating_mul(u32::try_from(count).unwrap_or(u32::MAX))
}

fn indicator_label(genre: Genre) -> &'static str {
    match genre {
        Genre::TechnicalJournal => "Technical journal",
        Genre::ResearchArticle => "Research article",
        Genre::Critique => "Critique",
    }
}
