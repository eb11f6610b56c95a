//! Shared transcripts and documents for integration tests.

#![allow(dead_code)]

use chatpress_core::Gate;
use chatpress_types::{Message, Transcript};

pub fn gate() -> Gate {
    Gate::with_defaults().expect("default rules compile")
}

/// Three-message exchange settling on local model tooling.
pub fn ollama_transcript() -> Transcript {
    Transcript::new(vec![
        Message::user("Let's use Ollama."),
        Message::assistant("Run: ollama pull llama2"),
        Message::user("Done, ollama serve works"),
    ])
    .unwrap()
}

pub fn critique_transcript() -> Transcript {
    Transcript::new(vec![
        Message::user("I think the rewrite to microservices was a mistake."),
        Message::assistant("However, the monolith could not scale past one team."),
        Message::user("I disagree: the cost of coordination now outweighs that benefit."),
    ])
    .unwrap()
}

/// Two research-term anchors come from the decision battery and one from
/// the citation battery.
pub fn research_transcript() -> Transcript {
    Transcript::new(vec![
        Message::user("Which paper proposes the GraphRAG method?"),
        Message::assistant("The study compares a graph architecture against a plain RAG baseline."),
        Message::user("Does it report results on more than one dataset?"),
    ])
    .unwrap()
}

pub const TECHNICAL_JOURNAL: &str = r"# Running local models with Ollama

## TL;DR
We shipped a local inference setup built on ollama with a litellm proxy in front of it (msg 0). The quantized llama2 build runs well on a laptop and answers through the same API our hosted models use.

## Decision Log
- We decided to serve models locally with ollama instead of paying for a hosted endpoint (msg 0).
- We chose to put litellm in front so existing clients keep one OpenAI-compatible interface (msg 1).

## Commands
ollama pull llama2
ollama serve --host 127.0.0.1
litellm --model ollama/llama2 --port 4000

## Open Questions
- How does the quantized model hold up on longer prompts once the serve process has been running for hours (msg 2)?
- Should the proxy cache responses for repeated evaluation runs, or is that premature (msg 1)?

## Tags
local-inference, ollama, litellm
";

pub const DECISION_LOG_SECTION: &str = r"## Decision Log
- We decided to serve models locally with ollama instead of paying for a hosted endpoint (msg 0).
- We chose to put litellm in front so existing clients keep one OpenAI-compatible interface (msg 1).

";

pub fn technical_journal_without_decision_log() -> String {
    TECHNICAL_JOURNAL.replace(DECISION_LOG_SECTION, "")
}

/// A critique with a thesis and tags but no counterpoints section.
pub const CRITIQUE_WITHOUT_COUNTERPOINTS: &str = r"# The microservices rewrite

## Thesis
I argue the rewrite traded one scaling problem for a worse one (msg 0). The monolith did block parallel work (msg 1), yet the cost of coordinating twelve services now eats most of the time the split was meant to free up (msg 2). The risk was visible before the first service was carved out, and the benefit has not shown up in delivery speed. A modular monolith with clear ownership boundaries would have solved the team problem without a network hop between every pair of modules, and it would still leave room to extract the one or two services that truly need to scale alone.

## Tags
architecture, microservices, critique
";

/// Structurally complete but far too short.
pub const SHORT_CRITIQUE: &str = "## Thesis\nI think it was a mistake (msg 0) (msg 1) (msg 2).\n## Counterpoints\n- the cost (msg 2)\n## Tags\nx\n";

pub fn strip_citations(document: &str) -> String {
    let marker = regex::Regex::new(r" \(msg \d+\)").unwrap();
    marker.replace_all(document, "").into_owned()
}
