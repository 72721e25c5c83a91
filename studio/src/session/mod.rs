//! Session: the explicit application state and its reaction handlers.
//!
//! Every user or network event maps to one `&mut self` method. Render data
//! (runs, applicability, summary) is derived on demand from the current text
//! and registry, never stored.

pub mod keys;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{
    AnalysisRequest, AnalysisResult, Applicability, CategoryFeedback, Correction,
    CorrectionDetail, EditorMode, FeedbackCategory, Run, Suggestion, TaskVariant, TooltipAnchor,
};
use ts_rs::TS;

use crate::analysis::AnalysisError;
use crate::annotator;
use crate::applier::{self, ApplyOutcome};
use crate::config::Config;
use crate::document::DocumentStore;
use crate::suggestions::{
    correction_applicability, suggestion_applicability, ApplicabilityTally, SuggestionRegistry,
};

pub use keys::{KeyAction, KeyBindings, KeyChord};

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum StudioError {
    #[error("document is empty")]
    EmptyDocument,

    #[error("an analysis request is already in flight")]
    AnalysisInFlight,

    #[error("analysis failed: {0}")]
    AnalysisFailed(#[from] AnalysisError),

    #[error("unknown suggestion: {0}")]
    UnknownSuggestion(String),

    #[error("unknown correction: {0}")]
    UnknownCorrection(usize),

    #[error("studio actor unavailable: {0}")]
    ActorUnavailable(String),
}

impl StudioError {
    /// Text shown inline to the writer.
    pub fn user_message(&self) -> &'static str {
        match self {
            StudioError::EmptyDocument => "Write something before asking for feedback.",
            StudioError::AnalysisInFlight => "Feedback is already on its way.",
            StudioError::AnalysisFailed(_) => {
                "We couldn't analyze your essay right now. Please try again."
            }
            StudioError::UnknownSuggestion(_) | StudioError::UnknownCorrection(_) => {
                "That suggestion is no longer available."
            }
            StudioError::ActorUnavailable(_) => "The editor stopped responding.",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HoverState {
    pub correction: usize,
    pub anchor: TooltipAnchor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct SuggestionView {
    #[serde(flatten)]
    pub suggestion: Suggestion,
    pub status: Applicability,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct CorrectionView {
    pub index: usize,
    #[serde(flatten)]
    pub correction: Correction,
    pub status: Applicability,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct ReviewSummary {
    pub suggestions: ApplicabilityTally,
    pub corrections: ApplicabilityTally,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct TooltipView {
    pub anchor: TooltipAnchor,
    pub detail: CorrectionDetail,
}

/// Everything a shell needs to draw one frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../bindings/studio.ts")]
pub struct StudioView {
    pub text: String,
    pub runs: Vec<Run>,
    pub mode: EditorMode,
    pub task_variant: TaskVariant,
    pub loading: bool,
    pub error: Option<String>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub revision: usize,
    pub band_score: Option<f32>,
    pub general_comment: Option<String>,
    /// When the displayed analysis was installed.
    pub analyzed_at: Option<DateTime<Utc>>,
    pub selected_category: Option<FeedbackCategory>,
    /// Feedback block of the selected category.
    pub category_feedback: Option<CategoryFeedback>,
    pub suggestions: Vec<SuggestionView>,
    pub corrections: Vec<CorrectionView>,
    pub summary: ReviewSummary,
    pub tooltip: Option<TooltipView>,
}

#[derive(Debug, Clone)]
pub struct Session {
    document: DocumentStore,
    registry: SuggestionRegistry,
    bindings: KeyBindings,
    task_variant: TaskVariant,
    mode: EditorMode,
    loading: bool,
    error: Option<StudioError>,
    hover: Option<HoverState>,
    selected_category: Option<FeedbackCategory>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl Session {
    pub fn new(initial_text: impl Into<String>) -> Self {
        Self {
            document: DocumentStore::new(initial_text),
            registry: SuggestionRegistry::new(),
            bindings: KeyBindings::default(),
            task_variant: TaskVariant::default(),
            mode: EditorMode::default(),
            loading: false,
            error: None,
            hover: None,
            selected_category: None,
        }
    }

    pub fn from_config(initial_text: impl Into<String>, config: &Config) -> Result<Self, String> {
        let bindings = KeyBindings::from_specs(&config.undo_keys, &config.redo_keys)?;
        Ok(Self::new(initial_text)
            .with_task_variant(config.task_variant)
            .with_bindings(bindings))
    }

    pub fn with_task_variant(mut self, task_variant: TaskVariant) -> Self {
        self.task_variant = task_variant;
        self
    }

    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn text(&self) -> &str {
        self.document.current()
    }

    pub fn document(&self) -> &DocumentStore {
        &self.document
    }

    pub fn registry(&self) -> &SuggestionRegistry {
        &self.registry
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn task_variant(&self) -> TaskVariant {
        self.task_variant
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&StudioError> {
        self.error.as_ref()
    }

    pub fn hover(&self) -> Option<HoverState> {
        self.hover
    }

    pub fn selected_category(&self) -> Option<FeedbackCategory> {
        self.selected_category
    }

    // ------------------------------------------------------------------
    // Document reactions
    // ------------------------------------------------------------------

    /// Commit user-typed text. Returns false if the text did not change.
    pub fn set_document_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.document.current() {
            return false;
        }
        self.document.set_text(text, None);
        self.hover = None;
        if matches!(self.error, Some(StudioError::EmptyDocument)) {
            self.error = None;
        }
        tracing::debug!(revision = self.document.revision(), "Document text committed");
        true
    }

    pub fn undo(&mut self) -> bool {
        let moved = self.document.undo();
        if moved {
            self.hover = None;
            tracing::debug!(revision = self.document.revision(), "Undo");
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.document.redo();
        if moved {
            self.hover = None;
            tracing::debug!(revision = self.document.revision(), "Redo");
        }
        moved
    }

    /// Drop the transient changed-span highlight, e.g. after a shell timer fires.
    pub fn dismiss_highlight(&mut self) {
        self.document.clear_highlight();
    }

    /// Returns true when the chord was bound and its default must be suppressed.
    pub fn handle_key(&mut self, chord: &KeyChord) -> bool {
        match self.bindings.resolve(chord) {
            Some(KeyAction::Undo) => {
                self.undo();
                true
            }
            Some(KeyAction::Redo) => {
                self.redo();
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Analysis reactions
    // ------------------------------------------------------------------

    /// Gate and prepare an analysis request. Sets `loading` on success.
    pub fn begin_analysis(&mut self) -> Result<AnalysisRequest, StudioError> {
        if self.loading {
            return Err(StudioError::AnalysisInFlight);
        }
        if self.text().trim().is_empty() {
            self.error = Some(StudioError::EmptyDocument);
            return Err(StudioError::EmptyDocument);
        }
        self.loading = true;
        self.error = None;
        tracing::info!(
            chars = self.text().chars().count(),
            task = self.task_variant.as_str(),
            "Analysis requested"
        );
        Ok(AnalysisRequest {
            document_text: self.text().to_string(),
            task_variant: self.task_variant,
        })
    }

    /// Install or reject the outcome of the in-flight request.
    pub fn finish_analysis(&mut self, outcome: Result<AnalysisResult, AnalysisError>) {
        self.loading = false;
        match outcome {
            Ok(result) => {
                tracing::info!(
                    band_score = result.band_score,
                    corrections = result.corrections.len(),
                    suggestions = result.suggestions.len(),
                    "Analysis installed"
                );
                self.registry.replace_all(result);
                self.hover = None;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Analysis failed; keeping previous result");
                self.error = Some(StudioError::AnalysisFailed(e));
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn set_task_variant(&mut self, task_variant: TaskVariant) {
        self.task_variant = task_variant;
    }

    // ------------------------------------------------------------------
    // Apply reactions
    // ------------------------------------------------------------------

    pub fn apply_suggestion(&mut self, id: &str) -> Result<ApplyOutcome, StudioError> {
        let suggestion = self
            .registry
            .suggestion(id)
            .ok_or_else(|| StudioError::UnknownSuggestion(id.to_string()))?;
        let (Some(target), Some(replacement)) = (
            suggestion.target_span.clone(),
            suggestion.replacement_span.clone(),
        ) else {
            return Ok(ApplyOutcome::NotActionable);
        };
        Ok(self.apply_edit(&target, &replacement, false))
    }

    pub fn apply_correction(&mut self, index: usize) -> Result<ApplyOutcome, StudioError> {
        let correction = self
            .registry
            .correction(index)
            .ok_or(StudioError::UnknownCorrection(index))?;
        let (target, replacement) = (correction.original.clone(), correction.replacement.clone());
        Ok(self.apply_edit(&target, &replacement, false))
    }

    /// Apply every open correction in analysis order. Returns how many applied.
    pub fn apply_all_corrections(&mut self) -> usize {
        let edits: Vec<(String, String)> = self
            .registry
            .corrections()
            .iter()
            .map(|c| (c.original.clone(), c.replacement.clone()))
            .collect();
        let applied = edits
            .iter()
            .filter(|(target, replacement)| self.apply_edit(target, replacement, true).applied())
            .count();
        tracing::info!(applied, total = edits.len(), "Applied all corrections");
        applied
    }

    fn apply_edit(&mut self, target: &str, replacement: &str, suppress_highlight: bool) -> ApplyOutcome {
        let outcome = applier::apply(&mut self.document, target, replacement, suppress_highlight);
        if outcome.applied() {
            self.hover = None;
        }
        outcome
    }

    // ------------------------------------------------------------------
    // UI state reactions
    // ------------------------------------------------------------------

    pub fn switch_mode(&mut self, mode: EditorMode) {
        if self.mode != mode {
            tracing::debug!(?mode, "Mode switched");
        }
        self.mode = mode;
        self.hover = None;
    }

    pub fn hover_correction(
        &mut self,
        index: usize,
        anchor: TooltipAnchor,
    ) -> Result<CorrectionDetail, StudioError> {
        let detail = self
            .correction_detail(index)
            .ok_or(StudioError::UnknownCorrection(index))?;
        self.hover = Some(HoverState {
            correction: index,
            anchor,
        });
        Ok(detail)
    }

    pub fn clear_hover(&mut self) {
        self.hover = None;
    }

    pub fn select_category(&mut self, category: Option<FeedbackCategory>) {
        self.selected_category = category;
    }

    // ------------------------------------------------------------------
    // Derived state
    // ------------------------------------------------------------------

    pub fn runs(&self) -> Vec<Run> {
        annotator::annotate(
            self.text(),
            self.registry.corrections(),
            self.document.last_changed(),
        )
    }

    pub fn suggestion_status(&self, id: &str) -> Option<Applicability> {
        self.registry
            .suggestion(id)
            .map(|suggestion| suggestion_applicability(self.text(), suggestion))
    }

    pub fn correction_status(&self, index: usize) -> Option<Applicability> {
        self.registry
            .correction(index)
            .map(|correction| correction_applicability(self.text(), correction))
    }

    pub fn correction_detail(&self, index: usize) -> Option<CorrectionDetail> {
        self.registry.correction(index).map(|c| CorrectionDetail {
            index,
            original: c.original.clone(),
            replacement: c.replacement.clone(),
            explanation: c.explanation.clone(),
            kind: c.kind,
        })
    }

    /// Suggestions for the panel, narrowed to the selected category if any.
    pub fn visible_suggestions(&self) -> Vec<SuggestionView> {
        let suggestions: Vec<&Suggestion> = match self.selected_category {
            Some(category) => self.registry.suggestions_in(category),
            None => self.registry.suggestions().iter().collect(),
        };
        suggestions
            .into_iter()
            .map(|s| SuggestionView {
                status: suggestion_applicability(self.text(), s),
                suggestion: s.clone(),
            })
            .collect()
    }

    pub fn correction_views(&self) -> Vec<CorrectionView> {
        self.registry
            .corrections()
            .iter()
            .enumerate()
            .map(|(index, c)| CorrectionView {
                index,
                status: correction_applicability(self.text(), c),
                correction: c.clone(),
            })
            .collect()
    }

    pub fn summary(&self) -> ReviewSummary {
        let mut summary = ReviewSummary::default();
        for s in self.registry.suggestions() {
            summary
                .suggestions
                .record(suggestion_applicability(self.text(), s));
        }
        for c in self.registry.corrections() {
            summary
                .corrections
                .record(correction_applicability(self.text(), c));
        }
        summary
    }

    pub fn view(&self) -> StudioView {
        let tooltip = self.hover.and_then(|hover| {
            self.correction_detail(hover.correction)
                .map(|detail| TooltipView {
                    anchor: hover.anchor,
                    detail,
                })
        });
        StudioView {
            text: self.text().to_string(),
            runs: self.runs(),
            mode: self.mode,
            task_variant: self.task_variant,
            loading: self.loading,
            error: self.error.as_ref().map(|e| e.user_message().to_string()),
            can_undo: self.document.can_undo(),
            can_redo: self.document.can_redo(),
            revision: self.document.revision(),
            band_score: self.registry.band_score(),
            general_comment: self.registry.general_comment().map(ToString::to_string),
            analyzed_at: self.registry.installed_at(),
            selected_category: self.selected_category,
            category_feedback: self
                .selected_category
                .and_then(|category| self.registry.feedback(category))
                .cloned(),
            suggestions: self.visible_suggestions(),
            corrections: self.correction_views(),
            summary: self.summary(),
            tooltip,
        }
    }
}
