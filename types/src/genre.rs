//! Genres, routing decisions and the document sections each genre expects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content genres the router can assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    TechnicalJournal,
    ResearchArticle,
    Critique,
}

impl Genre {
    pub const ALL: [Genre; 3] = [
        Genre::TechnicalJournal,
        Genre::ResearchArticle,
        Genre::Critique,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Genre::TechnicalJournal => "technical_journal",
            Genre::ResearchArticle => "research_article",
            Genre::Critique => "critique",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown genre label: {0}")]
pub struct UnknownGenreError(pub String);

impl FromStr for Genre {
    type Err = UnknownGenreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .into_iter()
            .find(|genre| genre.as_str() == s.trim())
            .ok_or_else(|| UnknownGenreError(s.to_string()))
    }
}

/// Router output: a genre, or a block with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RoutingDecision {
    Routed { genre: Genre },
    Blocked { reason: String },
}

impl RoutingDecision {
    #[must_use]
    pub fn routed(genre: Genre) -> Self {
        Self::Routed { genre }
    }

    #[must_use]
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self::Blocked {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn genre(&self) -> Option<Genre> {
        match self {
            Self::Routed { genre } => Some(*genre),
            Self::Blocked { .. } => None,
        }
    }

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// Label exchanged with collaborators: the genre name or `BLOCKED: <reason>`.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Routed { genre } => genre.as_str().to_string(),
            Self::Blocked { reason } => format!("BLOCKED: {reason}"),
        }
    }
}

/// Document sections the judge knows how to detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Tldr,
    DecisionLog,
    Commands,
    OpenQuestions,
    Tags,
    Abstract,
    ResearchQuestions,
    Findings,
    Thesis,
    Counterpoints,
}

impl Section {
    pub const ALL: [Section; 10] = [
        Section::Tldr,
        Section::DecisionLog,
        Section::Commands,
        Section::OpenQuestions,
        Section::Tags,
        Section::Abstract,
        Section::ResearchQuestions,
        Section::Findings,
        Section::Thesis,
        Section::Counterpoints,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Section::Tldr => "tldr",
            Section::DecisionLog => "decision_log",
            Section::Commands => "commands",
            Section::OpenQuestions => "open_questions",
            Section::Tags => "tags",
            Section::Abstract => "abstract",
            Section::ResearchQuestions => "research_questions",
            Section::Findings => "findings",
            Section::Thesis => "thesis",
            Section::Counterpoints => "counterpoints",
        }
    }

    /// Heading used in notes and when a patch has to create the section.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Section::Tldr => "TL;DR",
            Section::DecisionLog => "Decision Log",
            Section::Commands => "Commands",
            Section::OpenQuestions => "Open Questions",
            Section::Tags => "Tags",
            Section::Abstract => "Abstract",
            Section::ResearchQuestions => "Research Questions",
            Section::Findings => "Findings",
            Section::Thesis => "Thesis",
            Section::Counterpoints => "Counterpoints",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Genre, RoutingDecision};

    #[test]
    fn genre_parses_labels() {
        assert_eq!(
            "technical_journal".parse::<Genre>().unwrap(),
            Genre::TechnicalJournal
        );
        assert_eq!(" critique ".parse::<Genre>().unwrap(), Genre::Critique);
        assert!("poetry".parse::<Genre>().is_err());
    }

    #[test]
    fn blocked_label_carries_reason() {
        let decision = RoutingDecision::blocked("Unclear genre (insufficient signals)");
        assert!(decision.is_blocked());
        assert_eq!(decision.genre(), None);
        assert_eq!(
            decision.label(),
            "BLOCKED: Unclear genre (insufficient signals)"
        );
    }

    #[test]
    fn routed_label_is_genre_name() {
        let decision = RoutingDecision::routed(Genre::ResearchArticle);
        assert_eq!(decision.label(), "research_article");
        let json = serde_json::to_string(&decision).unwrap();
        assert_eq!(json, r#"{"status":"routed","genre":"research_article"}"#);
    }
}
