//! Wire shape of the analysis response and its validation.
//!
//! Every field is optional on the wire and `null` lists read as empty.
//! `validate` turns the loose shape into a strict `AnalysisResult` or rejects
//! the whole response; partial results are never produced.

use serde::Deserialize;
use shared_types::{
    AnalysisResult, CategoryFeedback, CategoryFeedbackSet, Correction, CorrectionKind,
    PrioritizedSuggestion, Priority, SpanEdit, Tip, VocabularyItem,
};

use super::AnalysisError;

pub const MAX_BAND_SCORE: f64 = 9.0;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAnalysisResponse {
    pub band_score: Option<f64>,
    pub suggestions: Option<Vec<RawSuggestion>>,
    #[serde(alias = "vocabulary")]
    pub vocabulary_enhancements: Option<Vec<RawVocabularyItem>>,
    pub feedback: Option<RawFeedback>,
    pub corrections: Option<Vec<RawCorrection>>,
    #[serde(alias = "generalFeedback")]
    pub general_comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSuggestion {
    pub priority: Option<String>,
    pub category: Option<String>,
    pub issue: Option<String>,
    pub suggestion: Option<String>,
    pub example: Option<String>,
    pub target_span: Option<String>,
    pub replacement_span: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawVocabularyItem {
    pub word: Option<String>,
    pub phonetic: Option<String>,
    pub part_of_speech: Option<String>,
    pub definition: Option<String>,
    pub example: Option<String>,
    pub usage: Option<String>,
    pub target_span: Option<String>,
    pub replacement_span: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFeedback {
    pub task_achievement: Option<RawCategoryFeedback>,
    pub coherence_cohesion: Option<RawCategoryFeedback>,
    pub lexical_resource: Option<RawCategoryFeedback>,
    pub grammar: Option<RawCategoryFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCategoryFeedback {
    pub summary: Option<String>,
    pub tips: Option<Vec<RawTip>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTip {
    #[serde(alias = "tip")]
    pub text: Option<String>,
    pub example: Option<String>,
    pub target_span: Option<String>,
    pub replacement_span: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCorrection {
    pub original: Option<String>,
    pub replacement: Option<String>,
    #[serde(alias = "type")]
    pub kind: Option<String>,
    pub explanation: Option<String>,
}

fn malformed(message: impl Into<String>) -> AnalysisError {
    AnalysisError::Malformed(message.into())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Blank targets count as missing; an empty replacement is a deletion.
fn span_edit(target: Option<String>, replacement: Option<String>) -> Option<SpanEdit> {
    match (non_blank(target), replacement) {
        (Some(target_span), Some(replacement_span)) => Some(SpanEdit {
            target_span,
            replacement_span,
        }),
        _ => None,
    }
}

fn parse_priority(raw: Option<&str>, index: usize) -> Result<Priority, AnalysisError> {
    match raw.map(|value| value.trim().to_ascii_lowercase()) {
        None => Ok(Priority::Medium),
        Some(value) => match value.as_str() {
            "" | "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "low" => Ok(Priority::Low),
            other => Err(malformed(format!(
                "suggestion {index}: unknown priority '{other}'"
            ))),
        },
    }
}

fn parse_kind(raw: Option<&str>, index: usize) -> Result<CorrectionKind, AnalysisError> {
    let value = raw
        .map(|value| value.trim().to_ascii_lowercase())
        .ok_or_else(|| malformed(format!("correction {index}: missing kind")))?;
    match value.as_str() {
        "grammar" => Ok(CorrectionKind::Grammar),
        "vocabulary" | "lexical" => Ok(CorrectionKind::Vocabulary),
        "coherence" | "cohesion" => Ok(CorrectionKind::Coherence),
        other => Err(malformed(format!("correction {index}: unknown kind '{other}'"))),
    }
}

fn category_block(
    raw: Option<RawCategoryFeedback>,
    name: &str,
) -> Result<CategoryFeedback, AnalysisError> {
    let raw = raw.ok_or_else(|| malformed(format!("missing feedback block '{name}'")))?;
    let raw_tips = raw.tips.unwrap_or_default();
    let mut tips = Vec::with_capacity(raw_tips.len());
    for (index, tip) in raw_tips.into_iter().enumerate() {
        let text = non_blank(tip.text)
            .ok_or_else(|| malformed(format!("{name} tip {index}: missing text")))?;
        tips.push(Tip {
            text,
            example: non_blank(tip.example),
            edit: span_edit(tip.target_span, tip.replacement_span),
        });
    }
    Ok(CategoryFeedback {
        summary: raw.summary.unwrap_or_default(),
        tips,
    })
}

pub fn validate(raw: RawAnalysisResponse) -> Result<AnalysisResult, AnalysisError> {
    let band_score = raw
        .band_score
        .ok_or_else(|| malformed("missing band score"))?;
    if !band_score.is_finite() || !(0.0..=MAX_BAND_SCORE).contains(&band_score) {
        return Err(malformed(format!("band score {band_score} out of range")));
    }

    let feedback = raw.feedback.ok_or_else(|| malformed("missing feedback"))?;
    let feedback = CategoryFeedbackSet {
        task_achievement: category_block(feedback.task_achievement, "taskAchievement")?,
        coherence_cohesion: category_block(feedback.coherence_cohesion, "coherenceCohesion")?,
        lexical_resource: category_block(feedback.lexical_resource, "lexicalResource")?,
        grammar: category_block(feedback.grammar, "grammar")?,
    };

    let raw_suggestions = raw.suggestions.unwrap_or_default();
    let mut suggestions = Vec::with_capacity(raw_suggestions.len());
    for (index, item) in raw_suggestions.into_iter().enumerate() {
        let priority = parse_priority(item.priority.as_deref(), index)?;
        let issue = non_blank(item.issue)
            .ok_or_else(|| malformed(format!("suggestion {index}: missing issue")))?;
        suggestions.push(PrioritizedSuggestion {
            priority,
            category: item.category.unwrap_or_default(),
            issue,
            suggestion: item.suggestion.unwrap_or_default(),
            example: non_blank(item.example),
            edit: span_edit(item.target_span, item.replacement_span),
        });
    }

    let raw_vocabulary = raw.vocabulary_enhancements.unwrap_or_default();
    let mut vocabulary = Vec::with_capacity(raw_vocabulary.len());
    for (index, item) in raw_vocabulary.into_iter().enumerate() {
        let word = non_blank(item.word)
            .ok_or_else(|| malformed(format!("vocabulary {index}: missing word")))?;
        vocabulary.push(VocabularyItem {
            word,
            phonetic: item.phonetic.unwrap_or_default(),
            part_of_speech: item.part_of_speech.unwrap_or_default(),
            definition: item.definition.unwrap_or_default(),
            example: item.example.unwrap_or_default(),
            usage: item.usage.unwrap_or_default(),
            edit: span_edit(item.target_span, item.replacement_span),
        });
    }

    let raw_corrections = raw.corrections.unwrap_or_default();
    let mut corrections = Vec::with_capacity(raw_corrections.len());
    for (index, item) in raw_corrections.into_iter().enumerate() {
        let kind = parse_kind(item.kind.as_deref(), index)?;
        let original = item
            .original
            .filter(|original| !original.trim().is_empty())
            .ok_or_else(|| malformed(format!("correction {index}: missing original")))?;
        let replacement = item
            .replacement
            .ok_or_else(|| malformed(format!("correction {index}: missing replacement")))?;
        corrections.push(Correction {
            original,
            replacement,
            kind,
            explanation: item.explanation.unwrap_or_default(),
        });
    }

    Ok(AnalysisResult {
        band_score: band_score as f32,
        suggestions,
        vocabulary,
        feedback,
        corrections,
        general_comment: raw.general_comment.unwrap_or_default(),
    })
}

/// Parse and validate a response body.
pub fn parse_response(body: &[u8]) -> Result<AnalysisResult, AnalysisError> {
    let raw: RawAnalysisResponse = serde_json::from_slice(body)
        .map_err(|e| malformed(format!("invalid response JSON: {e}")))?;
    validate(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn feedback_block() -> serde_json::Value {
        json!({ "summary": "ok", "tips": [] })
    }

    fn valid_response() -> serde_json::Value {
        json!({
            "bandScore": 6.5,
            "suggestions": [{
                "priority": "High",
                "category": "Grammar",
                "issue": "Agreement errors",
                "suggestion": "Match verbs to subjects",
                "targetSpan": "I has",
                "replacementSpan": "I have"
            }],
            "vocabularyEnhancements": [{
                "word": "crucial",
                "phonetic": "/ˈkruːʃl/",
                "partOfSpeech": "adjective",
                "definition": "extremely important",
                "example": "Planning is crucial.",
                "usage": "formal",
                "targetSpan": "   ",
                "replacementSpan": "crucial"
            }],
            "feedback": {
                "taskAchievement": feedback_block(),
                "coherenceCohesion": feedback_block(),
                "lexicalResource": feedback_block(),
                "grammar": {
                    "summary": "Several slips",
                    "tips": [{ "tip": "Proofread verbs", "targetSpan": "he go", "replacementSpan": "he goes" }]
                }
            },
            "corrections": [{
                "original": "has",
                "replacement": "have",
                "type": "Grammar",
                "explanation": "Subject-verb agreement"
            }],
            "generalFeedback": "Clear position."
        })
    }

    fn parse(value: serde_json::Value) -> Result<AnalysisResult, AnalysisError> {
        parse_response(value.to_string().as_bytes())
    }

    #[test]
    fn accepts_well_formed_response() {
        let result = parse(valid_response()).unwrap();
        assert_eq!(result.band_score, 6.5);
        assert_eq!(result.suggestions[0].priority, Priority::High);
        assert_eq!(
            result.suggestions[0].edit.as_ref().map(|e| e.target_span.as_str()),
            Some("I has")
        );
        // blank target collapses to informational
        assert!(result.vocabulary[0].edit.is_none());
        assert_eq!(result.feedback.grammar.tips[0].text, "Proofread verbs");
        assert!(result.feedback.grammar.tips[0].edit.is_some());
        assert_eq!(result.corrections[0].kind, CorrectionKind::Grammar);
        assert_eq!(result.general_comment, "Clear position.");
    }

    #[test]
    fn rejects_missing_band_score() {
        let mut value = valid_response();
        value.as_object_mut().unwrap().remove("bandScore");
        assert!(matches!(parse(value), Err(AnalysisError::Malformed(_))));
    }

    #[test]
    fn rejects_out_of_range_band_score() {
        let mut value = valid_response();
        value["bandScore"] = json!(11);
        assert!(matches!(parse(value), Err(AnalysisError::Malformed(_))));
    }

    #[test]
    fn rejects_missing_feedback_block() {
        let mut value = valid_response();
        value["feedback"].as_object_mut().unwrap().remove("lexicalResource");
        let err = parse(value).unwrap_err();
        assert!(err.to_string().contains("lexicalResource"));
    }

    #[test]
    fn rejects_correction_without_original() {
        let mut value = valid_response();
        value["corrections"][0]["original"] = json!("  ");
        assert!(matches!(parse(value), Err(AnalysisError::Malformed(_))));
    }

    #[test]
    fn rejects_unknown_correction_kind() {
        let mut value = valid_response();
        value["corrections"][0]["type"] = json!("style");
        assert!(matches!(parse(value), Err(AnalysisError::Malformed(_))));
    }

    #[test]
    fn allows_empty_replacement_as_deletion() {
        let mut value = valid_response();
        value["corrections"][0]["replacement"] = json!("");
        let result = parse(value).unwrap();
        assert_eq!(result.corrections[0].replacement, "");
    }

    #[test]
    fn null_lists_read_as_empty() {
        let mut value = valid_response();
        value["suggestions"] = Value::Null;
        value["vocabularyEnhancements"] = Value::Null;
        value["corrections"] = Value::Null;
        value["feedback"]["grammar"]["tips"] = Value::Null;
        let result = parse(value).unwrap();
        assert!(result.suggestions.is_empty());
        assert!(result.vocabulary.is_empty());
        assert!(result.corrections.is_empty());
        assert!(result.feedback.grammar.tips.is_empty());
        assert_eq!(result.feedback.grammar.summary, "Several slips");
    }

    #[test]
    fn null_feedback_is_still_rejected() {
        let mut value = valid_response();
        value["feedback"] = Value::Null;
        assert!(matches!(parse(value), Err(AnalysisError::Malformed(_))));
    }

    #[test]
    fn rejects_non_json_body() {
        assert!(matches!(
            parse_response(b"<html>502</html>"),
            Err(AnalysisError::Malformed(_))
        ));
    }
}
