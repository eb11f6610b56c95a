//! Single-shot repair: pick one deterministic patch, re-judge once, keep the
//! patched document only when it scores strictly higher.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use chatpress_config::RepairTemplates;
use chatpress_types::{
    Anchor, AnchorKind, Genre, HardFail, JudgeVerdict, Message, Section, truncate_with_ellipsis,
};

use crate::anchors::{AnchorExtractor, AnchorSet};
use crate::judge::Judge;

/// Longest quoted anchor context, in characters.
const QUOTE_CHARS: usize = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Patch {
    ExpandContent,
    InjectDecisionLog,
    AppendCommands,
    StrengthenThesis,
    InjectCounterpoints,
}

impl Patch {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Patch::ExpandContent => "expand_content",
            Patch::InjectDecisionLog => "inject_decision_log",
            Patch::AppendCommands => "append_commands",
            Patch::StrengthenThesis => "strengthen_thesis",
            Patch::InjectCounterpoints => "inject_counterpoints",
        }
    }

    /// Choose the patch for a failing verdict.
    ///
    /// Underlength wins over everything, then genre-specific structural
    /// gaps, then a per-genre fallback.
    #[must_use]
    pub fn select(verdict: &JudgeVerdict, genre: Genre) -> Patch {
        if verdict.has_hard_fail(HardFail::LengthExtremeShort) {
            return Patch::ExpandContent;
        }
        match genre {
            Genre::TechnicalJournal => {
                if verdict.has_hard_fail(HardFail::MissingDecisionLog) {
                    return Patch::InjectDecisionLog;
                }
                if verdict.has_hard_fail(HardFail::NoCommands) {
                    return Patch::AppendCommands;
                }
                Patch::InjectDecisionLog
            }
            Genre::Critique => {
                if verdict.has_hard_fail(HardFail::MissingThesis) {
                    return Patch::StrengthenThesis;
                }
                if verdict.has_hard_fail(HardFail::MissingCounterpoint) {
                    return Patch::InjectCounterpoints;
                }
                Patch::ExpandContent
            }
            Genre::ResearchArticle => Patch::ExpandContent,
        }
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one [`Repairer::improve`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairOutcome {
    document: String,
    original: JudgeVerdict,
    verdict: JudgeVerdict,
    patch: Option<Patch>,
    accepted: bool,
}

impl RepairOutcome {
    fn unchanged(document: &str, verdict: JudgeVerdict, patch: Option<Patch>) -> Self {
        Self {
            document: document.to_string(),
            original: verdict.clone(),
            verdict,
            patch,
            accepted: false,
        }
    }

    /// The returned document: the patched one if accepted, else the input.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    #[must_use]
    pub fn into_document(self) -> String {
        self.document
    }

    #[must_use]
    pub fn original_verdict(&self) -> &JudgeVerdict {
        &self.original
    }

    /// Verdict for [`document`](Self::document).
    #[must_use]
    pub fn verdict(&self) -> &JudgeVerdict {
        &self.verdict
    }

    #[must_use]
    pub fn patch(&self) -> Option<Patch> {
        self.patch
    }

    #[must_use]
    pub fn accepted(&self) -> bool {
        self.accepted
    }
}

#[derive(Debug, Clone)]
pub struct Repairer {
    extractor: Arc<AnchorExtractor>,
    judge: Arc<Judge>,
    templates: RepairTemplates,
    min_repair_score: u8,
}

impl Repairer {
    #[must_use]
    pub fn new(
        extractor: Arc<AnchorExtractor>,
        judge: Arc<Judge>,
        templates: RepairTemplates,
        min_repair_score: u8,
    ) -> Self {
        Self {
            extractor,
            judge,
            templates,
            min_repair_score,
        }
    }

    #[must_use]
    pub fn improve(&self, document: &str, genre: Genre, messages: &[Message]) -> RepairOutcome {
        let anchors = self.extractor.extract(messages);
        let original = self.judge.judge(document, genre, &anchors);

        if original.passed() {
            return RepairOutcome::unchanged(document, original, None);
        }
        if original.score() < self.min_repair_score {
            tracing::debug!(
                score = original.score(),
                floor = self.min_repair_score,
                "below repair floor, not patching"
            );
            return RepairOutcome::unchanged(document, original, None);
        }

        let patch = Patch::select(&original, genre);
        let candidate = self.apply(patch, document, &anchors);
        let repaired = self.judge.judge(&candidate, genre, &anchors);
        let accepted = repaired.score() > original.score();
        tracing::debug!(
            patch = %patch,
            before = original.score(),
            after = repaired.score(),
            accepted,
            "repair attempted"
        );

        if accepted {
            RepairOutcome {
                document: candidate,
                original,
                verdict: repaired,
                patch: Some(patch),
                accepted,
            }
        } else {
            RepairOutcome::unchanged(document, original, Some(patch))
        }
    }

    /// Produce the patched document. Deterministic in its inputs.
    #[must_use]
    pub fn apply(&self, patch: Patch, document: &str, anchors: &AnchorSet) -> String {
        match patch {
            Patch::ExpandContent => self.expand_content(document, anchors),
            Patch::InjectDecisionLog => self.inject_decision_log(document, anchors),
            Patch::AppendCommands => self.append_commands(document, anchors),
            Patch::StrengthenThesis => self.strengthen_thesis(document, anchors),
            Patch::InjectCounterpoints => self.inject_counterpoints(document, anchors),
        }
    }

    fn expand_content(&self, document: &str, anchors: &AnchorSet) -> String {
        let t = &self.templates;
        let mut section = format!("## {}\n\n", t.expansion_heading);
        for anchor in first_per_message(anchors.iter(), t.max_entries) {
            section.push_str(&format!("- {}\n", quote(anchor)));
        }
        section.push_str(&format!("\n{}\n", t.expansion_paragraph));
        append_block(document, &section)
    }

    fn inject_decision_log(&self, document: &str, anchors: &AnchorSet) -> String {
        let t = &self.templates;
        let decisions = first_per_message(anchors.of_kind(AnchorKind::Decision), t.max_entries);
        let mut section = format!("## {}\n\n", t.decision_log_heading);
        if decisions.is_empty() {
            section.push_str(&format!("1. {} (msg 0)\n", t.fallback_decision));
        } else {
            for (n, anchor) in decisions.iter().enumerate() {
                section.push_str(&format!("{}. {}\n", n + 1, quote(anchor)));
            }
        }
        section.push('\n');

        match self.judge.sections().span(document, Section::Tldr) {
            Some(tldr) => insert_block(document, tldr.body.end, &section),
            None => append_block(document, &section),
        }
    }

    fn append_commands(&self, document: &str, anchors: &AnchorSet) -> String {
        let t = &self.templates;
        let mut commands: Vec<String> = Vec::new();
        for anchor in anchors.of_kind(AnchorKind::Command) {
            if commands.len() >= t.max_entries {
                break;
            }
            let Some(line) = anchor.matched_text().lines().next() else {
                continue;
            };
            let line = line.trim();
            if self.judge.is_command_line(line) && !commands.iter().any(|c| c == line) {
                commands.push(line.to_string());
            }
        }
        for fallback in &t.fallback_commands {
            if commands.len() >= 2 {
                break;
            }
            if !commands.contains(fallback) {
                commands.push(fallback.clone());
            }
        }

        let section = format!(
            "## {}\n\n```bash\n{}\n```\n",
            Section::Commands.title(),
            commands.join("\n")
        );
        append_block(document, &section)
    }

    fn strengthen_thesis(&self, document: &str, anchors: &AnchorSet) -> String {
        let mut statement = self.templates.thesis_statement.clone();
        if let Some(opinion) = anchors.of_kind(AnchorKind::Opinion).next() {
            statement.push_str(&format!(" (msg {})", opinion.message_index()));
        }

        match self.judge.sections().span(document, Section::Thesis) {
            Some(span) => {
                let existing = document[span.body.clone()].trim();
                let body = if existing.is_empty() {
                    format!("\n{statement}\n\n")
                } else {
                    format!("\n{statement}\n\n{existing}\n\n")
                };
                replace_range(document, span.body, &body)
            }
            None => {
                let section = format!("## {}\n\n{statement}\n", Section::Thesis.title());
                match first_heading(document) {
                    Some(at) => insert_block(document, at, &format!("{section}\n")),
                    None => append_block(document, &section),
                }
            }
        }
    }

    fn inject_counterpoints(&self, document: &str, anchors: &AnchorSet) -> String {
        let t = &self.templates;
        let mut points: Vec<String> =
            first_per_message(anchors.of_kind(AnchorKind::Opinion), t.max_entries)
                .into_iter()
                .map(quote)
                .collect();
        for canned in &t.counterpoints {
            if points.len() >= 3 {
                break;
            }
            points.push(canned.clone());
        }
        let list = points
            .iter()
            .enumerate()
            .map(|(n, point)| format!("{}. {point}\n", n + 1))
            .collect::<String>();

        match self.judge.sections().span(document, Section::Counterpoints) {
            Some(span) => replace_range(document, span.body, &format!("\n{list}\n")),
            None => {
                let section = format!("## {}\n\n{list}", Section::Counterpoints.title());
                append_block(document, &section)
            }
        }
    }
}

/// First anchor for each distinct message, in order, at most `limit`.
fn first_per_message<'a>(
    anchors: impl Iterator<Item = &'a Anchor>,
    limit: usize,
) -> Vec<&'a Anchor> {
    let mut seen = BTreeSet::new();
    anchors
        .filter(|anchor| seen.insert(anchor.message_index()))
        .take(limit)
        .collect()
}

fn quote(anchor: &Anchor) -> String {
    format!(
        "{} (msg {})",
        truncate_with_ellipsis(anchor.context(), QUOTE_CHARS),
        anchor.message_index()
    )
}

fn first_heading(document: &str) -> Option<usize> {
    if document.starts_with("##") {
        return Some(0);
    }
    document.find("\n##").map(|idx| idx + 1)
}

fn append_block(document: &str, block: &str) -> String {
    let trimmed = document.trim_end();
    if trimmed.is_empty() {
        block.to_string()
    } else {
        format!("{trimmed}\n\n{block}")
    }
}

fn insert_block(document: &str, at: usize, block: &str) -> String {
    let (head, tail) = document.split_at(at);
    let separator = if head.is_empty() || head.ends_with("\n\n") {
        ""
    } else if head.ends_with('\n') {
        "\n"
    } else {
        "\n\n"
    };
    format!("{head}{separator}{block}{tail}")
}

fn replace_range(document: &str, range: Range<usize>, replacement: &str) -> String {
    format!(
        "{}{replacement}{}",
        &document[..range.start],
        &document[range.end..]
    )
}
