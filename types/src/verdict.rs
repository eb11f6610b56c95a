//! Judge verdict types.
//!
//! `JudgeVerdict` can only be built through [`JudgeVerdict::new`], which
//! clamps the score and derives `passed`. Holding a verdict means its
//! invariants hold: the score is in `[0, 100]` and a passing verdict carries
//! no hard fails.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::genre::Genre;

/// Scoring criteria and their point ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    SectionCompleteness,
    AnchorCoverage,
    EvidenceDensity,
    ModeSpecific,
    FillerPenalty,
    LengthFit,
}

impl Criterion {
    pub const ALL: [Criterion; 6] = [
        Criterion::SectionCompleteness,
        Criterion::AnchorCoverage,
        Criterion::EvidenceDensity,
        Criterion::ModeSpecific,
        Criterion::FillerPenalty,
        Criterion::LengthFit,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Criterion::SectionCompleteness => "section_completeness",
            Criterion::AnchorCoverage => "anchor_coverage",
            Criterion::EvidenceDensity => "evidence_density",
            Criterion::ModeSpecific => "mode_specific",
            Criterion::FillerPenalty => "filler_penalty",
            Criterion::LengthFit => "length_fit",
        }
    }

    /// Inclusive `(min, max)` points for this criterion.
    #[must_use]
    pub const fn range(self) -> (i32, i32) {
        match self {
            Criterion::SectionCompleteness | Criterion::AnchorCoverage | Criterion::ModeSpecific => {
                (0, 25)
            }
            Criterion::EvidenceDensity => (0, 15),
            Criterion::FillerPenalty => (-10, 0),
            Criterion::LengthFit => (0, 10),
        }
    }
}

/// Per-criterion points. Each value is clamped to its criterion's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Subscores {
    section_completeness: i32,
    anchor_coverage: i32,
    evidence_density: i32,
    mode_specific: i32,
    filler_penalty: i32,
    length_fit: i32,
}

impl Subscores {
    #[must_use]
    pub fn with(mut self, criterion: Criterion, points: i32) -> Self {
        let (min, max) = criterion.range();
        let points = points.clamp(min, max);
        match criterion {
            Criterion::SectionCompleteness => self.section_completeness = points,
            Criterion::AnchorCoverage => self.anchor_coverage = points,
            Criterion::EvidenceDensity => self.evidence_density = points,
            Criterion::ModeSpecific => self.mode_specific = points,
            Criterion::FillerPenalty => self.filler_penalty = points,
            Criterion::LengthFit => self.length_fit = points,
        }
        self
    }

    #[must_use]
    pub fn get(&self, criterion: Criterion) -> i32 {
        match criterion {
            Criterion::SectionCompleteness => self.section_completeness,
            Criterion::AnchorCoverage => self.anchor_coverage,
            Criterion::EvidenceDensity => self.evidence_density,
            Criterion::ModeSpecific => self.mode_specific,
            Criterion::FillerPenalty => self.filler_penalty,
            Criterion::LengthFit => self.length_fit,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, i32)> + '_ {
        Criterion::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    /// Raw sum before clamping to `[0, 100]`.
    #[must_use]
    pub fn total(&self) -> i32 {
        self.iter().map(|(_, points)| points).sum()
    }
}

/// Structural defects that force rejection regardless of score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HardFail {
    MissingCitations,
    LowAnchorCoverage,
    TemplateFillerDetected,
    LengthExtremeShort,
    LengthExtremeLong,
    MissingDecisionLog,
    NoCommands,
    NoShippingDecision,
    #[serde(rename = "missing_abstract_or_dek")]
    MissingAbstract,
    MissingResearchQuestions,
    MissingFindingsSection,
    InsufficientDomainTerms,
    MissingThesis,
    MissingCounterpoint,
}

impl HardFail {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            HardFail::MissingCitations => "missing_citations",
            HardFail::LowAnchorCoverage => "low_anchor_coverage",
            HardFail::TemplateFillerDetected => "template_filler_detected",
            HardFail::LengthExtremeShort => "length_extreme_short",
            HardFail::LengthExtremeLong => "length_extreme_long",
            HardFail::MissingDecisionLog => "missing_decision_log",
            HardFail::NoCommands => "no_commands",
            HardFail::NoShippingDecision => "no_shipping_decision",
            HardFail::MissingAbstract => "missing_abstract_or_dek",
            HardFail::MissingResearchQuestions => "missing_research_questions",
            HardFail::MissingFindingsSection => "missing_findings_section",
            HardFail::InsufficientDomainTerms => "insufficient_domain_terms",
            HardFail::MissingThesis => "missing_thesis",
            HardFail::MissingCounterpoint => "missing_counterpoint",
        }
    }
}

impl fmt::Display for HardFail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How much of the extracted anchor set a document cites.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coverage {
    total_anchors: usize,
    referenced_anchors: usize,
    coverage_pct: f64,
    referenced_message_indices: BTreeSet<usize>,
}

impl Coverage {
    /// `coverage_pct` is derived: `referenced / total * 100`, or 100 with no anchors.
    #[must_use]
    pub fn new(
        total_anchors: usize,
        referenced_anchors: usize,
        referenced_message_indices: BTreeSet<usize>,
    ) -> Self {
        let referenced_anchors = referenced_anchors.min(total_anchors);
        let coverage_pct = if total_anchors == 0 {
            100.0
        } else {
            referenced_anchors as f64 / total_anchors as f64 * 100.0
        };
        Self {
            total_anchors,
            referenced_anchors,
            coverage_pct,
            referenced_message_indices,
        }
    }

    #[must_use]
    pub fn total_anchors(&self) -> usize {
        self.total_anchors
    }

    #[must_use]
    pub fn referenced_anchors(&self) -> usize {
        self.referenced_anchors
    }

    #[must_use]
    pub fn coverage_pct(&self) -> f64 {
        self.coverage_pct
    }

    /// Message indices cited in the document, whether or not they carry anchors.
    #[must_use]
    pub fn referenced_message_indices(&self) -> &BTreeSet<usize> {
        &self.referenced_message_indices
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Counts {
    pub citations: usize,
    pub runnable_commands: usize,
    pub distinct_sections_present: usize,
    pub banned_phrases: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgeVerdict {
    genre: Genre,
    score: u8,
    passed: bool,
    hard_fails: BTreeSet<HardFail>,
    subscores: Subscores,
    coverage: Coverage,
    counts: Counts,
    notes: Vec<String>,
}

impl JudgeVerdict {
    /// Assemble a verdict. The score is the subscore sum clamped to `[0, 100]`;
    /// `passed` holds only with no hard fails and `score >= min_pass_score`.
    #[must_use]
    pub fn new(
        genre: Genre,
        subscores: Subscores,
        hard_fails: BTreeSet<HardFail>,
        coverage: Coverage,
        counts: Counts,
        notes: Vec<String>,
        min_pass_score: u8,
    ) -> Self {
        let score = subscores.total().clamp(0, 100) as u8;
        let passed = hard_fails.is_empty() && score >= min_pass_score;
        Self {
            genre,
            score,
            passed,
            hard_fails,
            subscores,
            coverage,
            counts,
            notes,
        }
    }

    #[must_use]
    pub fn genre(&self) -> Genre {
        self.genre
    }

    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    #[must_use]
    pub fn hard_fails(&self) -> &BTreeSet<HardFail> {
        &self.hard_fails
    }

    #[must_use]
    pub fn has_hard_fail(&self, fail: HardFail) -> bool {
        self.hard_fails.contains(&fail)
    }

    #[must_use]
    pub fn subscores(&self) -> &Subscores {
        &self.subscores
    }

    #[must_use]
    pub fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    #[must_use]
    pub fn counts(&self) -> &Counts {
        &self.counts
    }

    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{Counts, Coverage, Criterion, HardFail, JudgeVerdict, Subscores};
    use crate::genre::Genre;

    fn full_marks() -> Subscores {
        Subscores::default()
            .with(Criterion::SectionCompleteness, 25)
            .with(Criterion::AnchorCoverage, 25)
            .with(Criterion::EvidenceDensity, 15)
            .with(Criterion::ModeSpecific, 25)
            .with(Criterion::LengthFit, 10)
    }

    #[test]
    fn subscores_clamp_to_criterion_range() {
        let scores = Subscores::default()
            .with(Criterion::EvidenceDensity, 40)
            .with(Criterion::FillerPenalty, -25);
        assert_eq!(scores.get(Criterion::EvidenceDensity), 15);
        assert_eq!(scores.get(Criterion::FillerPenalty), -10);
    }

    #[test]
    fn coverage_is_full_without_anchors() {
        let coverage = Coverage::new(0, 0, BTreeSet::new());
        assert!((coverage.coverage_pct() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn coverage_never_exceeds_hundred() {
        let coverage = Coverage::new(4, 9, BTreeSet::new());
        assert_eq!(coverage.referenced_anchors(), 4);
        assert!(coverage.coverage_pct() <= 100.0);
    }

    #[test]
    fn hard_fail_blocks_pass_even_at_full_score() {
        let fails: BTreeSet<HardFail> = [HardFail::MissingCitations].into_iter().collect();
        let verdict = JudgeVerdict::new(
            Genre::Critique,
            full_marks(),
            fails,
            Coverage::new(0, 0, BTreeSet::new()),
            Counts::default(),
            Vec::new(),
            80,
        );
        assert_eq!(verdict.score(), 100);
        assert!(!verdict.passed());
    }

    #[test]
    fn pass_requires_threshold() {
        let scores = Subscores::default().with(Criterion::SectionCompleteness, 25);
        let verdict = JudgeVerdict::new(
            Genre::Critique,
            scores,
            BTreeSet::new(),
            Coverage::new(0, 0, BTreeSet::new()),
            Counts::default(),
            Vec::new(),
            80,
        );
        assert_eq!(verdict.score(), 25);
        assert!(!verdict.passed());
    }

    #[test]
    fn negative_total_clamps_to_zero() {
        let scores = Subscores::default().with(Criterion::FillerPenalty, -10);
        let verdict = JudgeVerdict::new(
            Genre::ResearchArticle,
            scores,
            BTreeSet::new(),
            Coverage::new(0, 0, BTreeSet::new()),
            Counts::default(),
            Vec::new(),
            80,
        );
        assert_eq!(verdict.score(), 0);
    }

    #[test]
    fn hard_fail_codes_serialize_stably() {
        let json = serde_json::to_string(&HardFail::MissingAbstract).unwrap();
        assert_eq!(json, "\"missing_abstract_or_dek\"");
        assert_eq!(HardFail::NoCommands.to_string(), "no_commands");
    }
}
