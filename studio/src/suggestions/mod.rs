//! Suggestion registry: the suggestions and corrections of the current analysis.
//!
//! Installing a result replaces the previous one wholesale. Prioritized
//! suggestions, vocabulary items and category tips are flattened into one
//! ordered `Suggestion` list with fresh ids, so ids never collide with (or
//! correlate to) those of an earlier analysis.

pub mod applicability;

use chrono::{DateTime, Utc};
use shared_types::{
    AnalysisResult, CategoryFeedback, Correction, FeedbackCategory, SpanEdit, Suggestion,
    SuggestionSource,
};

pub use applicability::{correction_applicability, suggestion_applicability, ApplicabilityTally};

#[derive(Debug, Clone)]
struct InstalledResult {
    result: AnalysisResult,
    suggestions: Vec<Suggestion>,
    installed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SuggestionRegistry {
    current: Option<InstalledResult>,
}

impl SuggestionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, result: AnalysisResult) {
        let suggestions = flatten_suggestions(&result);
        tracing::debug!(
            suggestions = suggestions.len(),
            corrections = result.corrections.len(),
            band_score = result.band_score,
            "Installed analysis result"
        );
        self.current = Some(InstalledResult {
            result,
            suggestions,
            installed_at: Utc::now(),
        });
    }

    /// Suggestions and corrections of the current result, in analysis order.
    pub fn all(&self) -> (&[Suggestion], &[Correction]) {
        (self.suggestions(), self.corrections())
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        self.current
            .as_ref()
            .map(|installed| installed.suggestions.as_slice())
            .unwrap_or(&[])
    }

    pub fn corrections(&self) -> &[Correction] {
        self.current
            .as_ref()
            .map(|installed| installed.result.corrections.as_slice())
            .unwrap_or(&[])
    }

    pub fn suggestion(&self, id: &str) -> Option<&Suggestion> {
        self.suggestions().iter().find(|suggestion| suggestion.id == id)
    }

    pub fn correction(&self, index: usize) -> Option<&Correction> {
        self.corrections().get(index)
    }

    pub fn suggestions_in(&self, category: FeedbackCategory) -> Vec<&Suggestion> {
        self.suggestions()
            .iter()
            .filter(|suggestion| suggestion.category == Some(category))
            .collect()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.current.as_ref().map(|installed| &installed.result)
    }

    pub fn band_score(&self) -> Option<f32> {
        self.result().map(|result| result.band_score)
    }

    pub fn general_comment(&self) -> Option<&str> {
        self.result().map(|result| result.general_comment.as_str())
    }

    pub fn feedback(&self, category: FeedbackCategory) -> Option<&CategoryFeedback> {
        self.result().map(|result| result.feedback.get(category))
    }

    pub fn installed_at(&self) -> Option<DateTime<Utc>> {
        self.current.as_ref().map(|installed| installed.installed_at)
    }
}

/// Map a free-form category tag ("Lexical Resource", "grammar", ...) onto a criterion.
pub fn category_from_tag(tag: &str) -> Option<FeedbackCategory> {
    let normalized: String = tag
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    match normalized.as_str() {
        "taskachievement" | "taskresponse" | "task" => Some(FeedbackCategory::TaskAchievement),
        "coherencecohesion" | "coherenceandcohesion" | "coherence" | "cohesion" => {
            Some(FeedbackCategory::CoherenceCohesion)
        }
        "lexicalresource" | "lexical" | "vocabulary" => Some(FeedbackCategory::LexicalResource),
        "grammar"
        | "grammaticalrange"
        | "grammaticalaccuracy"
        | "grammaticalrangeaccuracy"
        | "grammaticalrangeandaccuracy" => Some(FeedbackCategory::Grammar),
        _ => None,
    }
}

fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", ulid::Ulid::new())
}

fn split_edit(edit: Option<&SpanEdit>) -> (Option<String>, Option<String>) {
    match edit {
        Some(edit) => (
            Some(edit.target_span.clone()),
            Some(edit.replacement_span.clone()),
        ),
        None => (None, None),
    }
}

fn flatten_suggestions(result: &AnalysisResult) -> Vec<Suggestion> {
    let mut out = Vec::with_capacity(result.suggestions.len() + result.vocabulary.len());

    for item in &result.suggestions {
        let (target_span, replacement_span) = split_edit(item.edit.as_ref());
        out.push(Suggestion {
            id: new_id("sug"),
            source: SuggestionSource::Prioritized,
            display_text: item.issue.clone(),
            detail_text: item.suggestion.clone(),
            example_text: item.example.clone(),
            target_span,
            replacement_span,
            priority: Some(item.priority),
            category: category_from_tag(&item.category),
            category_tag: Some(item.category.clone()),
        });
    }

    for item in &result.vocabulary {
        let (target_span, replacement_span) = split_edit(item.edit.as_ref());
        let mut detail_text = item.definition.clone();
        if !item.usage.trim().is_empty() {
            detail_text.push_str("\nUsage: ");
            detail_text.push_str(item.usage.trim());
        }
        out.push(Suggestion {
            id: new_id("voc"),
            source: SuggestionSource::Vocabulary,
            display_text: format!("{} {} ({})", item.word, item.phonetic, item.part_of_speech)
                .trim()
                .to_string(),
            detail_text,
            example_text: Some(item.example.clone()).filter(|example| !example.trim().is_empty()),
            target_span,
            replacement_span,
            priority: None,
            category: Some(FeedbackCategory::LexicalResource),
            category_tag: None,
        });
    }

    for category in FeedbackCategory::ALL {
        let block = result.feedback.get(category);
        for tip in &block.tips {
            let (target_span, replacement_span) = split_edit(tip.edit.as_ref());
            out.push(Suggestion {
                id: new_id("tip"),
                source: SuggestionSource::Tip,
                display_text: tip.text.clone(),
                detail_text: block.summary.clone(),
                example_text: tip.example.clone(),
                target_span,
                replacement_span,
                priority: None,
                category: Some(category),
                category_tag: Some(category.as_str().to_string()),
            });
        }
    }

    out
}
