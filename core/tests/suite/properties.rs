//! Properties that hold for every input rather than for one fixture.

use std::io::Write;

use chatpress_core::{Gate, GateConfig};
use chatpress_types::{Genre, HardFail};

use crate::common::{
    CRITIQUE_WITHOUT_COUNTERPOINTS, SHORT_CRITIQUE, TECHNICAL_JOURNAL, critique_transcript, gate,
    ollama_transcript, strip_citations, technical_journal_without_decision_log,
};

fn documents() -> Vec<String> {
    vec![
        TECHNICAL_JOURNAL.to_string(),
        strip_citations(TECHNICAL_JOURNAL),
        technical_journal_without_decision_log(),
        CRITIQUE_WITHOUT_COUNTERPOINTS.to_string(),
        SHORT_CRITIQUE.to_string(),
        "Some notes.".to_string(),
        String::new(),
    ]
}

#[test]
fn classification_and_judging_are_deterministic() {
    let gate = gate();
    let transcript = ollama_transcript();
    let first = gate.classify(&transcript);
    let second = gate.classify(&transcript);
    assert_eq!(first, second);

    for document in documents() {
        for genre in Genre::ALL {
            let a = gate.judge(&document, genre, &first.anchors);
            let b = gate.judge(&document, genre, &first.anchors);
            assert_eq!(a, b);
        }
    }
}

#[test]
fn extraction_is_idempotent_over_identical_input() {
    let gate = gate();
    let transcript = critique_transcript();
    assert_eq!(gate.extract(&transcript), gate.extract(&transcript));
}

#[test]
fn scores_and_coverage_stay_in_bounds() {
    let gate = gate();
    let anchors = gate.extract(&ollama_transcript());
    let min_pass = gate.config().thresholds.min_pass_score;

    for document in documents() {
        for genre in Genre::ALL {
            let verdict = gate.judge(&document, genre, &anchors);
            let pct = verdict.coverage().coverage_pct();
            assert!(verdict.score() <= 100);
            assert!((0.0..=100.0).contains(&pct), "coverage {pct}");
            assert!(verdict.coverage().referenced_anchors() <= verdict.coverage().total_anchors());
            assert_eq!(
                verdict.passed(),
                verdict.hard_fails().is_empty() && verdict.score() >= min_pass
            );
            if verdict.counts().citations == 0 {
                assert!(verdict.has_hard_fail(HardFail::MissingCitations));
                assert!(!verdict.passed());
            }
        }
    }
}

#[test]
fn repair_never_lowers_the_score() {
    let gate = gate();
    let transcripts = [ollama_transcript(), critique_transcript()];

    for transcript in &transcripts {
        for document in documents() {
            for genre in Genre::ALL {
                let outcome = gate.improve(&document, genre, transcript);
                assert!(outcome.verdict().score() >= outcome.original_verdict().score());
                if outcome.accepted() {
                    assert!(outcome.verdict().score() > outcome.original_verdict().score());
                    assert!(outcome.patch().is_some());
                } else {
                    assert_eq!(outcome.document(), document);
                    assert_eq!(outcome.verdict(), outcome.original_verdict());
                }
            }
        }
    }
}

#[test]
fn shared_gate_gives_identical_verdicts_across_threads() {
    let gate = gate();
    let transcript = ollama_transcript();
    let baseline = gate.judge(
        TECHNICAL_JOURNAL,
        Genre::TechnicalJournal,
        &gate.extract(&transcript),
    );

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let classification = gate.classify(&transcript);
                    gate.judge(
                        TECHNICAL_JOURNAL,
                        Genre::TechnicalJournal,
                        &classification.anchors,
                    )
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), baseline);
        }
    });
}

#[test]
fn loaded_config_drives_the_judge() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"banned_phrases = ["local inference setup"]

[thresholds]
min_pass_score = 90
"#
    )
    .unwrap();

    let config = GateConfig::load(file.path()).unwrap();
    assert_eq!(config.thresholds.min_pass_score, 90);
    let gate = Gate::new(config).unwrap();

    let anchors = gate.extract(&ollama_transcript());
    let verdict = gate.judge(TECHNICAL_JOURNAL, Genre::TechnicalJournal, &anchors);
    assert!(verdict.has_hard_fail(HardFail::TemplateFillerDetected));
    assert_eq!(verdict.counts().banned_phrases, 1);
    assert!(!verdict.passed());
}

#[test]
fn verdict_serializes_with_stable_codes() {
    let gate = gate();
    let anchors = gate.extract(&ollama_transcript());
    let verdict = gate.judge(
        &strip_citations(TECHNICAL_JOURNAL),
        Genre::TechnicalJournal,
        &anchors,
    );

    let json = serde_json::to_value(&verdict).unwrap();
    assert_eq!(json["genre"], "technical_journal");
    assert_eq!(json["score"], 65);
    assert_eq!(json["passed"], false);
    assert_eq!(
        json["hard_fails"],
        serde_json::json!(["missing_citations", "low_anchor_coverage"])
    );
    assert_eq!(json["counts"]["citations"], 0);
}
