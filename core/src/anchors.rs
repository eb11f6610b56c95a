//! Anchor extraction and the aggregate queries the router and judge run over it.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use chatpress_config::AnchorRules;
use chatpress_types::{Anchor, AnchorKind, Coverage, Message};

use crate::error::RulesError;
use crate::matcher::compile_all;

static CITATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(msg\s+(\d+)\)").expect("valid citation regex"));

/// Number of `(msg N)` markers in `text`, repeats included.
pub(crate) fn citation_count(text: &str) -> usize {
    CITATION_MARKER.find_iter(text).count()
}

pub(crate) fn has_citation(text: &str) -> bool {
    CITATION_MARKER.is_match(text)
}

/// Message indices named by `(msg N)` markers in `text`.
pub(crate) fn cited_indices(text: &str) -> BTreeSet<usize> {
    CITATION_MARKER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect()
}

#[derive(Debug, Clone)]
struct TagMatcher {
    kind: AnchorKind,
    needle: String,
    tag: String,
    case_sensitive: bool,
}

impl TagMatcher {
    fn applies(&self, kind: AnchorKind, text: &str, lowered: &str) -> bool {
        self.kind == kind
            && if self.case_sensitive {
                text.contains(&self.needle)
            } else {
                lowered.contains(&self.needle)
            }
    }
}

/// Tags spans of conversation text with canonical signal kinds.
#[derive(Debug, Clone)]
pub struct AnchorExtractor {
    batteries: Vec<(AnchorKind, Vec<Regex>)>,
    tags: Vec<TagMatcher>,
    context_radius: usize,
}

impl AnchorExtractor {
    pub fn new(rules: &AnchorRules) -> Result<Self, RulesError> {
        let batteries = AnchorKind::ALL
            .into_iter()
            .map(|kind| {
                let rule = format!("anchors.patterns.{kind}");
                compile_all(&rule, rules.patterns.for_kind(kind)).map(|regexes| (kind, regexes))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tags = rules
            .tags
            .iter()
            .map(|rule| TagMatcher {
                kind: rule.kind,
                needle: if rule.case_sensitive {
                    rule.needle.clone()
                } else {
                    rule.needle.to_lowercase()
                },
                tag: rule.tag.clone(),
                case_sensitive: rule.case_sensitive,
            })
            .collect();

        Ok(Self {
            batteries,
            tags,
            context_radius: rules.context_radius,
        })
    }

    /// Extract every anchor from `messages`.
    ///
    /// Output is ordered by message, then kind, then pattern, then match
    /// position, so anchors of one kind keep source order.
    #[must_use]
    pub fn extract(&self, messages: &[Message]) -> AnchorSet {
        let mut anchors = Vec::new();
        for (index, message) in messages.iter().enumerate() {
            let text = message.text();
            let lowered = text.to_lowercase();
            for (kind, patterns) in &self.batteries {
                let tags = self.tags_for(*kind, text, &lowered);
                for (pattern_idx, pattern) in patterns.iter().enumerate() {
                    for found in pattern.find_iter(text) {
                        tracing::trace!(
                            message = index,
                            kind = %kind,
                            pattern = pattern_idx,
                            "anchor match"
                        );
                        let context =
                            context_window(text, found.start(), found.end(), self.context_radius);
                        anchors.push(Anchor::new(
                            index,
                            *kind,
                            found.as_str(),
                            tags.clone(),
                            context,
                        ));
                    }
                }
            }
        }
        tracing::debug!(
            messages = messages.len(),
            anchors = anchors.len(),
            "anchors extracted"
        );
        AnchorSet::new(anchors)
    }

    fn tags_for(&self, kind: AnchorKind, text: &str, lowered: &str) -> BTreeSet<String> {
        self.tags
            .iter()
            .filter(|rule| rule.applies(kind, text, lowered))
            .map(|rule| rule.tag.clone())
            .collect()
    }
}

/// Up to `radius` characters either side of `start..end`, trimmed.
fn context_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let begin = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(start, |(idx, _)| idx);
    let finish = text[end..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(idx, _)| end + idx);
    text[begin..finish].trim()
}

/// Immutable result of one extraction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnchorSet {
    anchors: Vec<Anchor>,
}

impl AnchorSet {
    #[must_use]
    pub fn new(anchors: Vec<Anchor>) -> Self {
        Self { anchors }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Anchor> {
        self.anchors.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn of_kind(&self, kind: AnchorKind) -> impl Iterator<Item = &Anchor> + '_ {
        self.anchors.iter().filter(move |anchor| anchor.kind() == kind)
    }

    #[must_use]
    pub fn count(&self, kind: AnchorKind) -> usize {
        self.of_kind(kind).count()
    }

    #[must_use]
    pub fn has(&self, kind: AnchorKind) -> bool {
        self.of_kind(kind).next().is_some()
    }

    #[must_use]
    pub fn has_decision(&self) -> bool {
        self.has(AnchorKind::Decision)
    }

    #[must_use]
    pub fn has_opinion(&self) -> bool {
        self.has(AnchorKind::Opinion)
    }

    /// Citation or reading-list anchor present.
    #[must_use]
    pub fn has_citation(&self) -> bool {
        self.has(AnchorKind::Citation)
    }

    /// Whether any anchor's matched text contains `term`, ignoring case.
    #[must_use]
    pub fn mentions(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.anchors
            .iter()
            .any(|anchor| anchor.matched_text().to_lowercase().contains(&term))
    }

    /// Number of anchors whose matched text matches `pattern`.
    #[must_use]
    pub fn count_matching(&self, pattern: &Regex) -> usize {
        self.anchors
            .iter()
            .filter(|anchor| pattern.is_match(anchor.matched_text()))
            .count()
    }

    #[must_use]
    pub fn message_indices(&self) -> BTreeSet<usize> {
        self.anchors.iter().map(Anchor::message_index).collect()
    }

    /// Cross-reference the `(msg N)` markers in `text` against anchor messages.
    #[must_use]
    pub fn coverage(&self, text: &str) -> Coverage {
        let cited = cited_indices(text);
        let referenced = self
            .anchors
            .iter()
            .filter(|anchor| cited.contains(&anchor.message_index()))
            .count();
        Coverage::new(self.anchors.len(), referenced, cited)
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Anchor> {
        self.anchors
    }
}

impl<'a> IntoIterator for &'a AnchorSet {
    type Item = &'a Anchor;
    type IntoIter = std::slice::Iter<'a, Anchor>;

    fn into_iter(self) -> Self::IntoIter {
        self.anchors.iter()
    }
}
