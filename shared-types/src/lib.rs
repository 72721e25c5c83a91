//! Shared types between the studio engine and its UI shells
//!
//! These types are used by both:
//! - the `studio` engine and reactor (native Rust)
//! - any rendering shell (TypeScript bindings via ts-rs)
//!
//! Serializable with serde for JSON over HTTP/WebSocket

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============================================================================
// Analysis Request
// ============================================================================

/// Which writing task the essay answers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub enum TaskVariant {
    Task1,
    #[default]
    Task2,
}

impl TaskVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task1 => "task1",
            Self::Task2 => "task2",
        }
    }
}

impl std::str::FromStr for TaskVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "task1" | "task_1" | "1" => Ok(Self::Task1),
            "task2" | "task_2" | "2" => Ok(Self::Task2),
            other => Err(format!("unknown task variant '{other}', expected task1 or task2")),
        }
    }
}

/// Payload sent to the analysis collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct AnalysisRequest {
    pub document_text: String,
    pub task_variant: TaskVariant,
}

// ============================================================================
// Analysis Result
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub enum CorrectionKind {
    Grammar,
    Vocabulary,
    Coherence,
}

impl CorrectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grammar => "grammar",
            Self::Vocabulary => "vocabulary",
            Self::Coherence => "coherence",
        }
    }
}

/// An original -> replacement fix. Always actionable while `original` is non-empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct Correction {
    pub original: String,
    pub replacement: String,
    pub kind: CorrectionKind,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// The four scoring criteria, each with its own feedback block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub enum FeedbackCategory {
    TaskAchievement,
    CoherenceCohesion,
    LexicalResource,
    Grammar,
}

impl FeedbackCategory {
    pub const ALL: [FeedbackCategory; 4] = [
        Self::TaskAchievement,
        Self::CoherenceCohesion,
        Self::LexicalResource,
        Self::Grammar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskAchievement => "task_achievement",
            Self::CoherenceCohesion => "coherence_cohesion",
            Self::LexicalResource => "lexical_resource",
            Self::Grammar => "grammar",
        }
    }
}

/// Optional target/replacement pair carried by suggestions, vocabulary items and tips.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct SpanEdit {
    pub target_span: String,
    pub replacement_span: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct PrioritizedSuggestion {
    pub priority: Priority,
    pub category: String,
    pub issue: String,
    pub suggestion: String,
    pub example: Option<String>,
    pub edit: Option<SpanEdit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct VocabularyItem {
    pub word: String,
    pub phonetic: String,
    pub part_of_speech: String,
    pub definition: String,
    pub example: String,
    pub usage: String,
    pub edit: Option<SpanEdit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct Tip {
    pub text: String,
    pub example: Option<String>,
    pub edit: Option<SpanEdit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct CategoryFeedback {
    pub summary: String,
    pub tips: Vec<Tip>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct CategoryFeedbackSet {
    pub task_achievement: CategoryFeedback,
    pub coherence_cohesion: CategoryFeedback,
    pub lexical_resource: CategoryFeedback,
    pub grammar: CategoryFeedback,
}

impl CategoryFeedbackSet {
    pub fn get(&self, category: FeedbackCategory) -> &CategoryFeedback {
        match category {
            FeedbackCategory::TaskAchievement => &self.task_achievement,
            FeedbackCategory::CoherenceCohesion => &self.coherence_cohesion,
            FeedbackCategory::LexicalResource => &self.lexical_resource,
            FeedbackCategory::Grammar => &self.grammar,
        }
    }
}

/// One validated analysis snapshot. Replaces any prior result wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct AnalysisResult {
    pub band_score: f32,
    pub suggestions: Vec<PrioritizedSuggestion>,
    pub vocabulary: Vec<VocabularyItem>,
    pub feedback: CategoryFeedbackSet,
    pub corrections: Vec<Correction>,
    pub general_comment: String,
}

// ============================================================================
// Unified Suggestions
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub enum SuggestionSource {
    Prioritized,
    Vocabulary,
    Tip,
}

/// Any critique item, optionally carrying a target/replacement pair.
///
/// Ids are only meaningful within the analysis result that produced them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct Suggestion {
    pub id: String,
    pub source: SuggestionSource,
    pub display_text: String,
    pub detail_text: String,
    pub example_text: Option<String>,
    pub target_span: Option<String>,
    pub replacement_span: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<FeedbackCategory>,
    pub category_tag: Option<String>,
}

impl Suggestion {
    /// Both spans present and the target non-empty.
    pub fn is_actionable(&self) -> bool {
        matches!(
            (self.target_span.as_deref(), self.replacement_span.as_deref()),
            (Some(target), Some(_)) if !target.is_empty()
        )
    }
}

/// Derived per-item state against the live document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub enum Applicability {
    Open,
    Resolved,
    Informational,
}

// ============================================================================
// Annotated Runs
// ============================================================================

/// A maximal slice of the document classified uniformly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub enum Run {
    Plain { text: String },
    Correction { text: String, correction: usize },
    Changed { text: String },
}

impl Run {
    pub fn text(&self) -> &str {
        match self {
            Run::Plain { text } | Run::Correction { text, .. } | Run::Changed { text } => text,
        }
    }

    pub fn is_plain(&self) -> bool {
        matches!(self, Run::Plain { .. })
    }
}

/// Hover detail for a highlighted correction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct CorrectionDetail {
    pub index: usize,
    pub original: String,
    pub replacement: String,
    pub explanation: String,
    pub kind: CorrectionKind,
}

// ============================================================================
// UI State
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub enum EditorMode {
    #[default]
    Edit,
    Review,
}

/// Screen anchor for the correction tooltip.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct TooltipAnchor {
    pub x: f32,
    pub y: f32,
}

// ============================================================================
// Tests
// ============================================================================
