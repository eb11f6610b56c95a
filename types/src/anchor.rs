//! Anchors: tagged spans of conversation text.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical signal types an anchor can carry.
///
/// Kinds are not exclusive: one region of text may match several kinds and
/// produce one anchor per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorKind {
    Decision,
    Command,
    Citation,
    Error,
    Model,
    ShipAction,
    ResearchNoun,
    Opinion,
}

impl AnchorKind {
    /// Extraction order. Anchors of one kind keep source order within it.
    pub const ALL: [AnchorKind; 8] = [
        AnchorKind::Decision,
        AnchorKind::Command,
        AnchorKind::Citation,
        AnchorKind::Error,
        AnchorKind::Model,
        AnchorKind::ShipAction,
        AnchorKind::ResearchNoun,
        AnchorKind::Opinion,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AnchorKind::Decision => "decision",
            AnchorKind::Command => "command",
            AnchorKind::Citation => "citation",
            AnchorKind::Error => "error",
            AnchorKind::Model => "model",
            AnchorKind::ShipAction => "ship_action",
            AnchorKind::ResearchNoun => "research_noun",
            AnchorKind::Opinion => "opinion",
        }
    }
}

impl fmt::Display for AnchorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    message_index: usize,
    kind: AnchorKind,
    matched_text: String,
    tags: BTreeSet<String>,
    context: String,
}

impl Anchor {
    #[must_use]
    pub fn new(
        message_index: usize,
        kind: AnchorKind,
        matched_text: impl Into<String>,
        tags: BTreeSet<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            message_index,
            kind,
            matched_text: matched_text.into(),
            tags,
            context: context.into(),
        }
    }

    #[must_use]
    pub fn message_index(&self) -> usize {
        self.message_index
    }

    #[must_use]
    pub fn kind(&self) -> AnchorKind {
        self.kind
    }

    #[must_use]
    pub fn matched_text(&self) -> &str {
        &self.matched_text
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Surrounding text of the match, trimmed.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{Anchor, AnchorKind};

    #[test]
    fn kind_names_are_snake_case() {
        let names: Vec<&str> = AnchorKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            [
                "decision",
                "command",
                "citation",
                "error",
                "model",
                "ship_action",
                "research_noun",
                "opinion"
            ]
        );
        let json = serde_json::to_string(&AnchorKind::ShipAction).unwrap();
        assert_eq!(json, "\"ship_action\"");
    }

    #[test]
    fn anchor_exposes_tags() {
        let tags: BTreeSet<String> = ["container".to_string()].into_iter().collect();
        let anchor = Anchor::new(3, AnchorKind::Command, "docker run x", tags, "ctx");
        assert!(anchor.has_tag("container"));
        assert!(!anchor.has_tag("api"));
        assert_eq!(anchor.message_index(), 3);
        assert_eq!(anchor.kind(), AnchorKind::Command);
    }
}
