//! Applicability of suggestions and corrections against the live document.
//!
//! Pure functions, re-evaluated on every render. Nothing here is cached.

use shared_types::{Applicability, Correction, Suggestion};
use ts_rs::TS;

fn span_applicability(document: &str, target: Option<&str>, replacement: Option<&str>) -> Applicability {
    match (target, replacement) {
        // empty target would match everywhere
        (Some(target), Some(_)) if !target.is_empty() => {
            if document.contains(target) {
                Applicability::Open
            } else {
                Applicability::Resolved
            }
        }
        _ => Applicability::Informational,
    }
}

pub fn suggestion_applicability(document: &str, suggestion: &Suggestion) -> Applicability {
    span_applicability(
        document,
        suggestion.target_span.as_deref(),
        suggestion.replacement_span.as_deref(),
    )
}

pub fn correction_applicability(document: &str, correction: &Correction) -> Applicability {
    span_applicability(
        document,
        Some(correction.original.as_str()),
        Some(correction.replacement.as_str()),
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct ApplicabilityTally {
    pub open: usize,
    pub resolved: usize,
    pub informational: usize,
}

impl ApplicabilityTally {
    pub fn record(&mut self, state: Applicability) {
        match state {
            Applicability::Open => self.open += 1,
            Applicability::Resolved => self.resolved += 1,
            Applicability::Informational => self.informational += 1,
        }
    }

    pub fn actionable(&self) -> usize {
        self.open + self.resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{CorrectionKind, SuggestionSource};

    fn correction(original: &str, replacement: &str) -> Correction {
        Correction {
            original: original.to_string(),
            replacement: replacement.to_string(),
            kind: CorrectionKind::Grammar,
            explanation: "Subject-verb agreement".to_string(),
        }
    }

    fn tip(target: Option<&str>, replacement: Option<&str>) -> Suggestion {
        Suggestion {
            id: "tip-1".to_string(),
            source: SuggestionSource::Tip,
            display_text: "Use a more precise verb".to_string(),
            detail_text: String::new(),
            example_text: None,
            target_span: target.map(ToString::to_string),
            replacement_span: replacement.map(ToString::to_string),
            priority: None,
            category: None,
            category_tag: None,
        }
    }

    #[test]
    fn correction_open_until_original_disappears() {
        let fix = correction("has", "have");
        assert_eq!(correction_applicability("I has a dog", &fix), Applicability::Open);
        assert_eq!(correction_applicability("I have a dog", &fix), Applicability::Resolved);
    }

    #[test]
    fn empty_target_is_always_informational() {
        let item = tip(Some(""), Some("anything"));
        for doc in ["", "text", "a much longer document"] {
            assert_eq!(suggestion_applicability(doc, &item), Applicability::Informational);
        }
        assert_eq!(
            correction_applicability("text", &correction("", "x")),
            Applicability::Informational
        );
    }

    #[test]
    fn missing_span_is_informational() {
        assert_eq!(
            suggestion_applicability("get a job", &tip(Some("get"), None)),
            Applicability::Informational
        );
        assert_eq!(
            suggestion_applicability("get a job", &tip(None, Some("obtain"))),
            Applicability::Informational
        );
        assert_eq!(
            suggestion_applicability("get a job", &tip(Some("get"), Some("obtain"))),
            Applicability::Open
        );
    }

    #[test]
    fn tally_counts_each_state() {
        let mut tally = ApplicabilityTally::default();
        tally.record(Applicability::Open);
        tally.record(Applicability::Resolved);
        tally.record(Applicability::Resolved);
        tally.record(Applicability::Informational);
        assert_eq!(tally.open, 1);
        assert_eq!(tally.resolved, 2);
        assert_eq!(tally.actionable(), 3);
    }
}
