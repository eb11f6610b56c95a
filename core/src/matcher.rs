//! Compiled matchers shared by the extractor, router and judge.

use std::collections::BTreeSet;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use regex::{Regex, RegexSet};

use crate::error::RulesError;

pub(crate) fn compile(rule: &str, pattern: &str) -> Result<Regex, RulesError> {
    Regex::new(pattern).map_err(|source| RulesError::Pattern {
        rule: rule.to_string(),
        source,
    })
}

pub(crate) fn compile_all(rule: &str, patterns: &[String]) -> Result<Vec<Regex>, RulesError> {
    patterns
        .iter()
        .map(|pattern| compile(rule, pattern))
        .collect()
}

/// How far a keyword must be delimited by word boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Boundary {
    /// `\b` before the keyword only: `build` also hits `building`.
    Prefix,
    /// `\b` on both sides.
    Word,
}

/// A keyword list matched case-insensitively as literal phrases.
///
/// Uses a `RegexSet` so one pass over the text reports every keyword
/// present. Whitespace inside a keyword matches any whitespace run.
#[derive(Debug, Clone)]
pub(crate) struct KeywordSet {
    set: RegexSet,
}

impl KeywordSet {
    pub(crate) fn new(rule: &str, keywords: &[String], boundary: Boundary) -> Result<Self, RulesError> {
        let patterns: Vec<String> = keywords
            .iter()
            .map(|keyword| keyword_pattern(keyword, boundary))
            .collect();
        let set = RegexSet::new(&patterns).map_err(|source| RulesError::Pattern {
            rule: rule.to_string(),
            source,
        })?;
        Ok(Self { set })
    }

    /// Number of distinct keywords present in `text`.
    pub(crate) fn distinct_matches(&self, text: &str) -> usize {
        self.set.matches(text).iter().count()
    }

    pub(crate) fn is_match(&self, text: &str) -> bool {
        self.set.is_match(text)
    }
}

fn keyword_pattern(keyword: &str, boundary: Boundary) -> String {
    let body = keyword
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    match boundary {
        Boundary::Prefix => format!(r"(?i)\b{body}"),
        Boundary::Word => format!(r"(?i)\b{body}\b"),
    }
}

/// Case-insensitive substring scan for the banned-phrase deny-list.
#[derive(Debug, Clone)]
pub(crate) struct PhraseScanner {
    phrases: Vec<String>,
    automaton: AhoCorasick,
}

impl PhraseScanner {
    pub(crate) fn new(phrases: &[String]) -> Result<Self, RulesError> {
        // Standard semantics so overlapping phrases are each reported.
        let automaton = AhoCorasickBuilder::new()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(phrases)?;
        Ok(Self {
            phrases: phrases.to_vec(),
            automaton,
        })
    }

    /// Distinct phrases present in `text`, in deny-list order.
    pub(crate) fn find<'a>(&'a self, text: &str) -> Vec<&'a str> {
        let hits: BTreeSet<usize> = self
            .automaton
            .find_overlapping_iter(text)
            .map(|m| m.pattern().as_usize())
            .collect();
        hits.into_iter()
            .map(|idx| self.phrases[idx].as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Boundary, KeywordSet, PhraseScanner, compile};
    use crate::error::RulesError;

    fn keywords(items: &[&str], boundary: Boundary) -> KeywordSet {
        let items: Vec<String> = items.iter().map(|s| (*s).to_string()).collect();
        KeywordSet::new("test", &items, boundary).unwrap()
    }

    #[test]
    fn prefix_keywords_match_word_starts_only() {
        let set = keywords(&["build", "but"], Boundary::Prefix);
        assert_eq!(set.distinct_matches("we are building it"), 1);
        assert_eq!(set.distinct_matches("a distributed rebuild"), 0);
    }

    #[test]
    fn keywords_count_distinct_not_occurrences() {
        let set = keywords(&["pipeline", "system"], Boundary::Prefix);
        assert_eq!(
            set.distinct_matches("pipeline, pipeline, PIPELINE and a System"),
            2
        );
    }

    #[test]
    fn multiword_keywords_span_any_whitespace() {
        let set = keywords(&["golden set"], Boundary::Prefix);
        assert!(set.is_match("the Golden\n set is stale"));
    }

    #[test]
    fn word_boundary_rejects_longer_words() {
        let set = keywords(&["risk", "trade-off"], Boundary::Word);
        assert_eq!(set.distinct_matches("risky trade-offs"), 0);
        assert_eq!(set.distinct_matches("a real risk and a trade-off"), 2);
    }

    #[test]
    fn keyword_metacharacters_are_literal() {
        let set = keywords(&["let's use", "c++"], Boundary::Prefix);
        assert!(set.is_match("OK, let's use it"));
        assert!(!set.is_match("lets use it"));
    }

    #[test]
    fn phrase_scanner_reports_overlapping_phrases() {
        let phrases = vec![
            "comprehensive discussion and analysis".to_string(),
            "through comprehensive discussion and analysis".to_string(),
        ];
        let scanner = PhraseScanner::new(&phrases).unwrap();
        let found = scanner.find("Reached THROUGH comprehensive discussion and analysis.");
        assert_eq!(found.len(), 2);
        assert!(scanner.find("nothing to see").is_empty());
    }

    #[test]
    fn empty_phrase_list_finds_nothing() {
        let scanner = PhraseScanner::new(&[]).unwrap();
        assert!(scanner.find("anything").is_empty());
    }

    #[test]
    fn invalid_pattern_names_rule() {
        let err = compile("judging.quantization_pattern", "(unclosed").unwrap_err();
        assert!(matches!(err, RulesError::Pattern { ref rule, .. } if rule == "judging.quantization_pattern"));
    }
}
