//! Document scoring.
//!
//! A verdict is the sum of six bounded subscores plus a set of hard fails
//! that reject the document regardless of score. Everything here is a pure
//! function of `(document, genre, anchors)`.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use chatpress_config::{JudgingRules, LengthBands, RequiredSections, Thresholds};
use chatpress_types::{
    Counts, Coverage, Criterion, Genre, HardFail, JudgeVerdict, Section, Subscores, word_count,
};

use crate::anchors::{AnchorSet, citation_count, has_citation};
use crate::error::RulesError;
use crate::matcher::{Boundary, KeywordSet, PhraseScanner, compile, compile_all};
use crate::sections::SectionMatcher;

static BULLET_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*[-*][ \t]+").expect("valid bullet regex"));

#[derive(Debug, Clone)]
pub struct Judge {
    sections: SectionMatcher,
    required: RequiredSections,
    banned: PhraseScanner,
    thresholds: Thresholds,
    bands: LengthBands,
    command_line: Regex,
    command_block: Regex,
    command_flag: Regex,
    min_commands: usize,
    domain_terms: Regex,
    min_domain_terms: usize,
    local_tooling: KeywordSet,
    quantization: Regex,
    shipping_decision: Regex,
    research_tooling: KeywordSet,
    min_findings_bullets: usize,
    min_cited_findings: usize,
    stance: Vec<Regex>,
    consequences: KeywordSet,
    min_consequence_terms: usize,
}

/// Per-document measurements shared by scoring, hard fails and notes.
struct Measurements<'d> {
    words: usize,
    citations: usize,
    commands: Vec<&'d str>,
    banned: usize,
    present: BTreeSet<Section>,
    coverage: Coverage,
    shipping_decision: bool,
    domain_terms: usize,
}

impl Judge {
    pub fn new(
        rules: &JudgingRules,
        thresholds: &Thresholds,
        bands: &LengthBands,
        banned_phrases: &[String],
    ) -> Result<Self, RulesError> {
        Ok(Self {
            sections: SectionMatcher::new(&rules.sections)?,
            required: rules.required.clone(),
            banned: PhraseScanner::new(banned_phrases)?,
            thresholds: thresholds.clone(),
            bands: bands.clone(),
            command_line: compile("judging.command_line_pattern", &rules.command_line_pattern)?,
            command_block: compile("judging.command_block_pattern", &rules.command_block_pattern)?,
            command_flag: compile("judging.command_flag_pattern", &rules.command_flag_pattern)?,
            min_commands: rules.min_commands,
            domain_terms: compile("judging.domain_term_pattern", &rules.domain_term_pattern)?,
            min_domain_terms: rules.min_domain_terms,
            local_tooling: KeywordSet::new(
                "judging.local_tooling_terms",
                &rules.local_tooling_terms,
                Boundary::Word,
            )?,
            quantization: compile("judging.quantization_pattern", &rules.quantization_pattern)?,
            shipping_decision: compile(
                "judging.shipping_decision_pattern",
                &rules.shipping_decision_pattern,
            )?,
            research_tooling: KeywordSet::new(
                "judging.research_tooling_terms",
                &rules.research_tooling_terms,
                Boundary::Word,
            )?,
            min_findings_bullets: rules.min_findings_bullets,
            min_cited_findings: rules.min_cited_findings,
            stance: compile_all("judging.stance_patterns", &rules.stance_patterns)?,
            consequences: KeywordSet::new(
                "judging.consequence_terms",
                &rules.consequence_terms,
                Boundary::Word,
            )?,
            min_consequence_terms: rules.min_consequence_terms,
        })
    }

    pub(crate) fn sections(&self) -> &SectionMatcher {
        &self.sections
    }

    /// Lines and fenced blocks a reader could paste into a shell.
    pub(crate) fn runnable_commands<'d>(&self, document: &'d str) -> Vec<&'d str> {
        self.command_line
            .find_iter(document)
            .chain(self.command_block.find_iter(document))
            .map(|found| found.as_str())
            .collect()
    }

    pub(crate) fn is_command_line(&self, line: &str) -> bool {
        self.command_line.is_match(line)
    }

    #[must_use]
    pub fn judge(&self, document: &str, genre: Genre, anchors: &AnchorSet) -> JudgeVerdict {
        let m = self.measure(document, anchors);

        let subscores = Subscores::default()
            .with(
                Criterion::SectionCompleteness,
                self.section_completeness(genre, &m.present),
            )
            .with(
                Criterion::AnchorCoverage,
                coverage_points(m.coverage.coverage_pct()),
            )
            .with(
                Criterion::EvidenceDensity,
                evidence_points(m.citations, m.words),
            )
            .with(Criterion::ModeSpecific, self.mode_specific(document, genre, &m))
            .with(Criterion::FillerPenalty, filler_points(m.banned))
            .with(Criterion::LengthFit, self.length_points(genre, m.words));

        let hard_fails = self.hard_fails(genre, &m);
        let notes = self.notes(genre, anchors, &m, &subscores, &hard_fails);
        let counts = Counts {
            citations: m.citations,
            runnable_commands: m.commands.len(),
            distinct_sections_present: m.present.len(),
            banned_phrases: m.banned,
        };

        let verdict = JudgeVerdict::new(
            genre,
            subscores,
            hard_fails,
            m.coverage,
            counts,
            notes,
            self.thresholds.min_pass_score,
        );
        tracing::debug!(
            genre = %genre,
            score = verdict.score(),
            passed = verdict.passed(),
            hard_fails = verdict.hard_fails().len(),
            "document judged"
        );
        verdict
    }

    fn measure<'d>(&self, document: &'d str, anchors: &AnchorSet) -> Measurements<'d> {
        Measurements {
            words: word_count(document),
            citations: citation_count(document),
            commands: self.runnable_commands(document),
            banned: self.banned.find(document).len(),
            present: self.sections.present(document),
            coverage: anchors.coverage(document),
            shipping_decision: self.shipping_decision.is_match(document),
            domain_terms: self.domain_terms.find_iter(document).count(),
        }
    }

    fn section_completeness(&self, genre: Genre, present: &BTreeSet<Section>) -> i32 {
        let required = self.required.for_genre(genre);
        if required.is_empty() {
            return 25;
        }
        let found = required.iter().filter(|s| present.contains(*s)).count();
        (found * 25 / required.len()) as i32
    }

    fn mode_specific(&self, document: &str, genre: Genre, m: &Measurements<'_>) -> i32 {
        let points = match genre {
            Genre::TechnicalJournal => self.technical_journal_points(document, m),
            Genre::ResearchArticle => self.research_article_points(document, m),
            Genre::Critique => self.critique_points(document),
        };
        tracing::trace!(genre = %genre, points, "mode-specific points");
        points.min(25)
    }

    fn technical_journal_points(&self, document: &str, m: &Measurements<'_>) -> i32 {
        let mut points = 0;
        if m.commands.len() >= self.min_commands {
            points += 10;
            if m.commands.iter().any(|cmd| self.command_flag.is_match(cmd)) {
                points += 5;
            }
        }
        points += 5 * self.local_tooling.distinct_matches(document) as i32;
        if self.quantization.is_match(document) {
            points += 5;
        }
        if m.shipping_decision {
            points += 5;
        }
        points
    }

    fn research_article_points(&self, document: &str, m: &Measurements<'_>) -> i32 {
        let mut points = 0;
        if m.domain_terms >= self.min_domain_terms {
            points += 10;
        }
        if let Some(findings) = self.sections.body(document, Section::Findings) {
            let bullets: Vec<&str> = findings
                .lines()
                .filter(|line| BULLET_LINE.is_match(line))
                .collect();
            let cited = bullets.iter().filter(|line| has_citation(line)).count();
            if bullets.len() >= self.min_findings_bullets && cited >= self.min_cited_findings {
                points += 10;
            }
        }
        if self.research_tooling.is_match(document) {
            points += 5;
        }
        points
    }

    fn critique_points(&self, document: &str) -> i32 {
        let mut points = 0;
        if self.stance.iter().any(|regex| regex.is_match(document)) {
            points += 10;
        }
        if self
            .sections
            .body(document, Section::Counterpoints)
            .is_some_and(has_citation)
        {
            points += 10;
        }
        if self.consequences.distinct_matches(document) >= self.min_consequence_terms {
            points += 5;
        }
        points
    }

    fn length_points(&self, genre: Genre, words: usize) -> i32 {
        let band = self.bands.for_genre(genre);
        if band.contains(words) {
            return 10;
        }
        let (low, high) = self.bands.widened(genre);
        let words = words as f64;
        if (low..=high).contains(&words) { 5 } else { 0 }
    }

    fn hard_fails(&self, genre: Genre, m: &Measurements<'_>) -> BTreeSet<HardFail> {
        let t = &self.thresholds;
        let mut fails = BTreeSet::new();

        if m.citations < t.min_citations {
            fails.insert(HardFail::MissingCitations);
        }
        if m.coverage.coverage_pct() < t.min_coverage_pct {
            fails.insert(HardFail::LowAnchorCoverage);
        }
        if m.banned > 0 {
            fails.insert(HardFail::TemplateFillerDetected);
        }
        if m.words < t.min_words {
            fails.insert(HardFail::LengthExtremeShort);
        } else if m.words > t.max_words {
            fails.insert(HardFail::LengthExtremeLong);
        }

        let missing = |section: Section| !m.present.contains(&section);
        match genre {
            Genre::TechnicalJournal => {
                if missing(Section::DecisionLog) {
                    fails.insert(HardFail::MissingDecisionLog);
                }
                if m.commands.len() < self.min_commands {
                    fails.insert(HardFail::NoCommands);
                }
                if !m.shipping_decision {
                    fails.insert(HardFail::NoShippingDecision);
                }
            }
            Genre::ResearchArticle => {
                if missing(Section::Abstract) {
                    fails.insert(HardFail::MissingAbstract);
                }
                if missing(Section::ResearchQuestions) {
                    fails.insert(HardFail::MissingResearchQuestions);
                }
                if missing(Section::Findings) {
                    fails.insert(HardFail::MissingFindingsSection);
                }
                if m.domain_terms < self.min_domain_terms {
                    fails.insert(HardFail::InsufficientDomainTerms);
                }
            }
            Genre::Critique => {
                if missing(Section::Thesis) {
                    fails.insert(HardFail::MissingThesis);
                }
                if missing(Section::Counterpoints) {
                    fails.insert(HardFail::MissingCounterpoint);
                }
            }
        }
        fails
    }

    /// Hard-fail summary, then recovery opportunities, largest first.
    fn notes(
        &self,
        genre: Genre,
        anchors: &AnchorSet,
        m: &Measurements<'_>,
        subscores: &Subscores,
        hard_fails: &BTreeSet<HardFail>,
    ) -> Vec<String> {
        let mut notes = Vec::new();
        if !hard_fails.is_empty() {
            let codes: Vec<&str> = hard_fails.iter().map(|fail| fail.code()).collect();
            notes.push(format!("Hard fails: {}", codes.join(", ")));
        }

        let mut opportunities: Vec<(i32, String)> = Vec::new();

        let required = self.required.for_genre(genre);
        if !required.is_empty() {
            let per_section = (25 / required.len()) as i32;
            for section in required.iter().filter(|s| !m.present.contains(*s)) {
                opportunities.push((per_section, format!("Add a {} section", section.title())));
            }
        }

        let coverage_gap = 25 - subscores.get(Criterion::AnchorCoverage);
        if coverage_gap > 0 {
            let uncited: Vec<String> = anchors
                .message_indices()
                .difference(m.coverage.referenced_message_indices())
                .map(ToString::to_string)
                .collect();
            if !uncited.is_empty() {
                opportunities.push((
                    coverage_gap,
                    format!(
                        "Cite messages {} to raise anchor coverage ({:.1}% now)",
                        uncited.join(", "),
                        m.coverage.coverage_pct()
                    ),
                ));
            }
        }

        if m.citations < self.thresholds.min_citations {
            let needed = self.thresholds.min_citations - m.citations;
            // Short documents max out density on one citation; the hard fail still blocks.
            opportunities.push((
                (15 - subscores.get(Criterion::EvidenceDensity)).max(1),
                format!("Add {needed} more citations"),
            ));
        }

        if genre == Genre::TechnicalJournal && m.commands.len() < self.min_commands {
            let needed = self.min_commands - m.commands.len();
            opportunities.push((10, format!("Add {needed} more runnable commands")));
        }

        if m.banned > 0 {
            opportunities.push((
                -subscores.get(Criterion::FillerPenalty),
                format!("Remove template filler phrases ({} found)", m.banned),
            ));
        }

        let length_gap = 10 - subscores.get(Criterion::LengthFit);
        if length_gap > 0 {
            let band = self.bands.for_genre(genre);
            let note = if m.words < band.min {
                format!(
                    "Expand by {} words to reach the {}-{} word band",
                    band.min - m.words,
                    band.min,
                    band.max
                )
            } else {
                format!(
                    "Trim {} words to fit the {}-{} word band",
                    m.words - band.max,
                    band.min,
                    band.max
                )
            };
            opportunities.push((length_gap, note));
        }

        opportunities.retain(|(points, _)| *points > 0);
        opportunities.sort_by(|a, b| b.0.cmp(&a.0));
        notes.extend(opportunities.into_iter().map(|(_, note)| note));
        notes
    }
}

fn coverage_points(pct: f64) -> i32 {
    match pct {
        p if p >= 80.0 => 25,
        p if p >= 60.0 => 20,
        p if p >= 40.0 => 15,
        p if p >= 20.0 => 10,
        _ => 5,
    }
}

/// Citations per 200 words, times five, capped at 15.
fn evidence_points(citations: usize, words: usize) -> i32 {
    if words == 0 {
        return 0;
    }
    (citations * 1000 / words).min(15) as i32
}

fn filler_points(banned: usize) -> i32 {
    -5 * banned.min(2) as i32
}
