//! Deterministic classification and publish gate for conversational text.
//!
//! The pipeline has four stages:
//!
//! 1. [`AnchorExtractor`] tags spans of the conversation with signal kinds.
//! 2. [`Router`] assigns a [`Genre`] or blocks the conversation.
//! 3. [`Judge`] scores a generated document for that genre.
//! 4. [`Repairer`] applies at most one patch and re-judges once.
//!
//! [`Gate`] compiles a [`GateConfig`] into all four and runs them in order.
//! Every stage is a pure function of its inputs, so a `Gate` can be shared
//! across threads without locking.

mod anchors;
mod error;
mod judge;
mod matcher;
mod repair;
mod router;
mod sections;

use std::sync::Arc;

pub use anchors::{AnchorExtractor, AnchorSet};
pub use chatpress_config::GateConfig;
pub use error::RulesError;
pub use judge::Judge;
pub use repair::{Patch, RepairOutcome, Repairer};
pub use router::{GenreScores, RouteConfidence, Router};

use chatpress_types::{Genre, JudgeVerdict, Message, RoutingDecision, Transcript};

/// Anchors and routing decision for one transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub anchors: AnchorSet,
    pub decision: RoutingDecision,
}

/// Produces genre-specific prose for a routed transcript.
///
/// Prose generation lives outside the gate; this is the seam it plugs into.
pub trait DocumentGenerator {
    fn generate(&self, genre: Genre, transcript: &Transcript, anchors: &AnchorSet) -> String;
}

impl<F> DocumentGenerator for F
where
    F: Fn(Genre, &Transcript, &AnchorSet) -> String,
{
    fn generate(&self, genre: Genre, transcript: &Transcript, anchors: &AnchorSet) -> String {
        self(genre, transcript, anchors)
    }
}

/// Terminal result of [`Gate::process`].
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// The router could not assign a genre.
    Blocked { reason: String },
    /// The document passed, possibly after a repair.
    Published {
        genre: Genre,
        document: String,
        verdict: JudgeVerdict,
        repaired: bool,
    },
    /// The document still failed after the single repair attempt.
    Rejected {
        genre: Genre,
        document: String,
        verdict: JudgeVerdict,
    },
}

impl PipelineOutcome {
    #[must_use]
    pub fn is_published(&self) -> bool {
        matches!(self, PipelineOutcome::Published { .. })
    }

    #[must_use]
    pub fn verdict(&self) -> Option<&JudgeVerdict> {
        match self {
            PipelineOutcome::Blocked { .. } => None,
            PipelineOutcome::Published { verdict, .. }
            | PipelineOutcome::Rejected { verdict, .. } => Some(verdict),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Gate {
    config: GateConfig,
    extractor: Arc<AnchorExtractor>,
    router: Router,
    judge: Arc<Judge>,
    repairer: Repairer,
}

impl Gate {
    /// Validate `config` and compile every rule table it carries.
    pub fn new(config: GateConfig) -> Result<Self, RulesError> {
        config.validate()?;
        let extractor = Arc::new(AnchorExtractor::new(&config.anchors)?);
        let router = Router::new(&config.routing)?;
        let judge = Arc::new(Judge::new(
            &config.judging,
            &config.thresholds,
            &config.length_bands,
            &config.banned_phrases,
        )?);
        let repairer = Repairer::new(
            Arc::clone(&extractor),
            Arc::clone(&judge),
            config.repair.clone(),
            config.thresholds.min_repair_score,
        );
        tracing::debug!(
            banned_phrases = config.banned_phrases.len(),
            min_pass_score = config.thresholds.min_pass_score,
            "gate compiled"
        );
        Ok(Self {
            config,
            extractor,
            router,
            judge,
            repairer,
        })
    }

    pub fn with_defaults() -> Result<Self, RulesError> {
        Self::new(GateConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    #[must_use]
    pub fn extract(&self, messages: &[Message]) -> AnchorSet {
        self.extractor.extract(messages)
    }

    #[must_use]
    pub fn route(&self, primary_text: &str, anchors: &AnchorSet) -> RoutingDecision {
        self.router.route(primary_text, anchors)
    }

    #[must_use]
    pub fn route_confidence(&self, primary_text: &str, anchors: &AnchorSet) -> RouteConfidence {
        self.router.confidence(primary_text, anchors)
    }

    /// Extract anchors and route on the newline-joined text of every message.
    #[must_use]
    pub fn classify(&self, transcript: &Transcript) -> Classification {
        let anchors = self.extract(transcript);
        let decision = self.route(&transcript.joined_text(), &anchors);
        Classification { anchors, decision }
    }

    #[must_use]
    pub fn judge(&self, document: &str, genre: Genre, anchors: &AnchorSet) -> JudgeVerdict {
        self.judge.judge(document, genre, anchors)
    }

    #[must_use]
    pub fn improve(&self, document: &str, genre: Genre, messages: &[Message]) -> RepairOutcome {
        self.repairer.improve(document, genre, messages)
    }

    /// Classify, generate, judge and repair once.
    pub fn process<G>(&self, transcript: &Transcript, generator: &G) -> PipelineOutcome
    where
        G: DocumentGenerator + ?Sized,
    {
        let Classification { anchors, decision } = self.classify(transcript);
        let genre = match decision {
            RoutingDecision::Routed { genre } => genre,
            RoutingDecision::Blocked { reason } => {
                tracing::info!(%reason, "transcript blocked");
                return PipelineOutcome::Blocked { reason };
            }
        };

        let draft = generator.generate(genre, transcript, &anchors);
        let outcome = self.improve(&draft, genre, transcript);
        let repaired = outcome.accepted();
        let verdict = outcome.verdict().clone();
        let document = outcome.into_document();

        if verdict.passed() {
            tracing::info!(genre = %genre, score = verdict.score(), repaired, "document published");
            PipelineOutcome::Published {
                genre,
                document,
                verdict,
                repaired,
            }
        } else {
            tracing::info!(
                genre = %genre,
                score = verdict.score(),
                hard_fails = verdict.hard_fails().len(),
                "document rejected"
            );
            PipelineOutcome::Rejected {
                genre,
                document,
                verdict,
            }
        }
    }
}
