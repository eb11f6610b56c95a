//! Full classify, generate, judge and repair runs through `Gate::process`.

use chatpress_core::{AnchorSet, Patch, PipelineOutcome};
use chatpress_types::{Genre, Transcript};

use crate::common::{
    CRITIQUE_WITHOUT_COUNTERPOINTS, SHORT_CRITIQUE, TECHNICAL_JOURNAL, critique_transcript, gate,
    ollama_transcript, technical_journal_without_decision_log,
};

fn fixed(document: String) -> impl Fn(Genre, &Transcript, &AnchorSet) -> String {
    move |_, _, _| document.clone()
}

#[test]
fn passing_draft_is_published_untouched() {
    let outcome = gate().process(&ollama_transcript(), &fixed(TECHNICAL_JOURNAL.to_string()));

    let PipelineOutcome::Published {
        genre,
        document,
        verdict,
        repaired,
    } = outcome
    else {
        panic!("expected publication, got {outcome:?}");
    };
    assert_eq!(genre, Genre::TechnicalJournal);
    assert_eq!(document, TECHNICAL_JOURNAL);
    assert_eq!(verdict.score(), 100);
    assert!(!repaired);
}

#[test]
fn missing_decision_log_is_repaired_then_published() {
    let outcome = gate().process(
        &ollama_transcript(),
        &fixed(technical_journal_without_decision_log()),
    );

    let PipelineOutcome::Published {
        document,
        verdict,
        repaired,
        ..
    } = outcome
    else {
        panic!("expected publication, got {outcome:?}");
    };
    assert!(repaired);
    assert_eq!(verdict.score(), 100);
    assert!(document.contains("## Key Engineering Decisions\n\n1. Let's use Ollama. (msg 0)\n"));
    let tldr = document.find("## TL;DR").unwrap();
    let log = document.find("## Key Engineering Decisions").unwrap();
    let commands = document.find("## Commands").unwrap();
    assert!(tldr < log && log < commands);
}

#[test]
fn critique_without_counterpoints_gains_them() {
    let gate = gate();
    let outcome = gate.improve(
        CRITIQUE_WITHOUT_COUNTERPOINTS,
        Genre::Critique,
        &critique_transcript(),
    );

    assert_eq!(outcome.original_verdict().score(), 81);
    assert_eq!(outcome.patch(), Some(Patch::InjectCounterpoints));
    assert!(outcome.accepted());
    assert_eq!(outcome.verdict().score(), 100);
    assert!(outcome.document().contains("## Counterpoints"));

    let published = gate.process(
        &critique_transcript(),
        &fixed(CRITIQUE_WITHOUT_COUNTERPOINTS.to_string()),
    );
    assert!(published.is_published());
}

#[test]
fn short_critique_is_expanded() {
    let outcome = gate().improve(SHORT_CRITIQUE, Genre::Critique, &critique_transcript());

    assert_eq!(outcome.original_verdict().score(), 85);
    assert_eq!(outcome.patch(), Some(Patch::ExpandContent));
    assert!(outcome.accepted());
    assert_eq!(outcome.verdict().score(), 95);
    assert!(outcome.verdict().passed());
    assert!(outcome.document().starts_with(SHORT_CRITIQUE));
    assert!(outcome.document().contains("## Additional Context"));
}

#[test]
fn hopeless_draft_is_rejected_without_patching() {
    let outcome = gate().process(&ollama_transcript(), &fixed("Some notes.".to_string()));

    let PipelineOutcome::Rejected {
        genre,
        document,
        verdict,
    } = outcome
    else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(genre, Genre::TechnicalJournal);
    assert_eq!(document, "Some notes.");
    assert!(!verdict.passed());
    assert!(verdict.score() < gate().config().thresholds.min_repair_score);
}
