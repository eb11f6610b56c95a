//! `##` heading detection and section spans.

use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use chatpress_config::SectionHeadings;
use chatpress_types::Section;

use crate::error::RulesError;
use crate::matcher::compile;

static ANY_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^##").expect("valid heading regex"));

/// Byte ranges of one section inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SectionSpan {
    /// The heading line, including its newline when present.
    pub(crate) heading: Range<usize>,
    /// Everything after the heading line up to the next `##` heading.
    pub(crate) body: Range<usize>,
}

#[derive(Debug, Clone)]
pub(crate) struct SectionMatcher {
    headings: Vec<(Section, Regex)>,
}

impl SectionMatcher {
    pub(crate) fn new(synonyms: &SectionHeadings) -> Result<Self, RulesError> {
        let headings = Section::ALL
            .into_iter()
            .map(|section| {
                let pattern = heading_pattern(synonyms.for_section(section));
                let rule = format!("judging.sections.{}", section.as_str());
                compile(&rule, &pattern).map(|regex| (section, regex))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headings })
    }

    fn regex(&self, section: Section) -> Option<&Regex> {
        self.headings
            .iter()
            .find(|(candidate, _)| *candidate == section)
            .map(|(_, regex)| regex)
    }

    pub(crate) fn is_present(&self, document: &str, section: Section) -> bool {
        self.regex(section)
            .is_some_and(|regex| regex.is_match(document))
    }

    /// Every section with at least one matching heading.
    pub(crate) fn present(&self, document: &str) -> BTreeSet<Section> {
        self.headings
            .iter()
            .filter(|(_, regex)| regex.is_match(document))
            .map(|(section, _)| *section)
            .collect()
    }

    /// Span of the first heading for `section`.
    pub(crate) fn span(&self, document: &str, section: Section) -> Option<SectionSpan> {
        let found = self.regex(section)?.find(document)?;
        let heading_end = document[found.end()..]
            .find('\n')
            .map_or(document.len(), |offset| found.end() + offset + 1);
        let body_end = ANY_HEADING
            .find_at(document, heading_end)
            .map_or(document.len(), |next| next.start());
        Some(SectionSpan {
            heading: found.start()..heading_end,
            body: heading_end..body_end,
        })
    }

    pub(crate) fn body<'a>(&self, document: &'a str, section: Section) -> Option<&'a str> {
        self.span(document, section)
            .map(|span| &document[span.body])
    }
}

fn heading_pattern(synonyms: &[String]) -> String {
    let alternatives = synonyms
        .iter()
        .map(|synonym| {
            synonym
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect::<Vec<_>>()
        .join("|");
    format!(r"(?mi)^##[ \t]*(?:{alternatives})\b")
}
