//! End-to-end classification and judging of representative conversations.

use chatpress_types::{AnchorKind, Genre, HardFail, Message, RoutingDecision, Transcript};

use crate::common::{
    TECHNICAL_JOURNAL, critique_transcript, gate, ollama_transcript, research_transcript,
    strip_citations,
};

#[test]
fn ollama_exchange_routes_to_technical_journal() {
    let gate = gate();
    let classification = gate.classify(&ollama_transcript());

    assert_eq!(
        classification.decision,
        RoutingDecision::routed(Genre::TechnicalJournal)
    );
    assert_eq!(classification.anchors.len(), 5);
    assert_eq!(classification.anchors.count(AnchorKind::Model), 3);
    assert_eq!(classification.anchors.count(AnchorKind::Command), 1);
    assert!(classification.anchors.has_decision());
}

#[test]
fn critique_exchange_routes_to_critique() {
    let classification = gate().classify(&critique_transcript());
    assert_eq!(classification.decision.genre(), Some(Genre::Critique));
    assert_eq!(classification.anchors.count(AnchorKind::Opinion), 3);
}

#[test]
fn research_exchange_routes_to_research_article() {
    let classification = gate().classify(&research_transcript());
    assert_eq!(classification.decision.genre(), Some(Genre::ResearchArticle));
}

#[test]
fn greeting_is_blocked_with_reason() {
    let transcript = Transcript::new(vec![Message::user("hello")]).unwrap();
    let classification = gate().classify(&transcript);

    assert!(classification.decision.is_blocked());
    assert_eq!(
        classification.decision.label(),
        "BLOCKED: Unclear genre (insufficient signals)"
    );
}

#[test]
fn grounded_technical_journal_scores_full_marks() {
    let gate = gate();
    let anchors = gate.extract(&ollama_transcript());
    let verdict = gate.judge(TECHNICAL_JOURNAL, Genre::TechnicalJournal, &anchors);

    assert!(verdict.passed(), "notes: {:?}", verdict.notes());
    assert_eq!(verdict.score(), 100);
    assert!(verdict.hard_fails().is_empty());
    assert_eq!(verdict.counts().citations, 5);
    assert_eq!(verdict.counts().runnable_commands, 3);
    assert!((verdict.coverage().coverage_pct() - 100.0).abs() < f64::EPSILON);
}

#[test]
fn uncited_document_never_passes() {
    let gate = gate();
    let anchors = gate.extract(&ollama_transcript());
    let verdict = gate.judge(
        &strip_citations(TECHNICAL_JOURNAL),
        Genre::TechnicalJournal,
        &anchors,
    );

    assert!(!verdict.passed());
    assert!(verdict.has_hard_fail(HardFail::MissingCitations));
    assert_eq!(verdict.score(), 65);
    assert_eq!(verdict.counts().citations, 0);
}

#[test]
fn uncited_document_hard_fails() {
    let gate = gate();
    let anchors = gate.extract(&ollama_transcript());
    let verdict = gate.judge(
        &strip_citations(TECHNICAL_JOURNAL),
        Genre::TechnicalJournal,
        &anchors,
    );
    let codes: Vec<&str> = verdict.hard_fails().iter().map(|fail| fail.code()).collect();
    insta::assert_snapshot!(codes.join(", "), @"missing_citations, low_anchor_coverage");
}

#[test]
fn bare_technical_journal_hard_fails() {
    let gate = gate();
    let anchors = gate.extract(&ollama_transcript());
    let verdict = gate.judge("Some notes.", Genre::TechnicalJournal, &anchors);
    let codes: Vec<&str> = verdict.hard_fails().iter().map(|fail| fail.code()).collect();
    insta::assert_snapshot!(
        codes.join(", "),
        @"missing_citations, low_anchor_coverage, length_extreme_short, missing_decision_log, no_commands, no_shipping_decision"
    );
    assert!(verdict.notes()[0].starts_with("Hard fails: missing_citations"));
}

#[test]
fn missing_decision_log_is_the_only_defect() {
    let gate = gate();
    let anchors = gate.extract(&ollama_transcript());
    let document = crate::common::technical_journal_without_decision_log();
    let verdict = gate.judge(&document, Genre::TechnicalJournal, &anchors);

    assert_eq!(verdict.score(), 95);
    assert_eq!(
        verdict.hard_fails().iter().copied().collect::<Vec<_>>(),
        vec![HardFail::MissingDecisionLog]
    );
}
