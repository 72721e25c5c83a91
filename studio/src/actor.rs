//! StudioActor - single owner of a studio session.
//!
//! All mutations run inside `handle`, one message at a time. Analysis calls
//! are the only async work: they run on a spawned task that posts
//! `AnalysisFinished` back, so the result is installed as an ordinary message
//! and never races with edits.

use async_trait::async_trait;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use serde::{Deserialize, Serialize};
use shared_types::{AnalysisResult, CorrectionDetail, EditorMode, FeedbackCategory, TooltipAnchor};
use tokio::sync::mpsc;

use crate::analysis::{AnalysisError, SharedAnalysisGateway};
use crate::applier::ApplyOutcome;
use crate::session::{KeyChord, Session, StudioError, StudioView};

#[derive(Debug, Default)]
pub struct StudioActor;

pub struct StudioArguments {
    pub session: Session,
    pub gateway: SharedAnalysisGateway,
    pub events: Option<mpsc::UnboundedSender<StudioEvent>>,
}

pub struct StudioState {
    session: Session,
    gateway: SharedAnalysisGateway,
    events: Option<mpsc::UnboundedSender<StudioEvent>>,
    pending_request: Option<String>,
}

/// Notifications for a shell that wants to redraw without polling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudioEvent {
    DocumentChanged { revision: usize },
    AnalysisStarted { request_id: String },
    AnalysisInstalled { request_id: String, band_score: f32 },
    AnalysisFailed { request_id: String, message: String },
}

#[derive(Debug)]
pub enum StudioMsg {
    /// Commit user-typed text.
    SetText { text: String },
    Undo,
    Redo,
    /// Start an analysis of the current text. Replies with the request id.
    RequestAnalysis {
        reply: RpcReplyPort<Result<String, StudioError>>,
    },
    /// Posted by the spawned analysis task.
    AnalysisFinished {
        request_id: String,
        outcome: Result<AnalysisResult, AnalysisError>,
    },
    ApplySuggestion {
        id: String,
        reply: RpcReplyPort<Result<ApplyOutcome, StudioError>>,
    },
    ApplyCorrection {
        index: usize,
        reply: RpcReplyPort<Result<ApplyOutcome, StudioError>>,
    },
    ApplyAllCorrections {
        reply: RpcReplyPort<usize>,
    },
    SwitchMode { mode: EditorMode },
    HoverCorrection {
        index: usize,
        anchor: TooltipAnchor,
        reply: RpcReplyPort<Result<CorrectionDetail, StudioError>>,
    },
    ClearHover,
    DismissHighlight,
    SelectCategory { category: Option<FeedbackCategory> },
    /// Replies true when the chord was consumed.
    HandleKey {
        chord: KeyChord,
        reply: RpcReplyPort<bool>,
    },
    GetView {
        reply: RpcReplyPort<StudioView>,
    },
}

#[async_trait]
impl Actor for StudioActor {
    type Msg = StudioMsg;
    type State = StudioState;
    type Arguments = StudioArguments;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(actor_id = %myself.get_id(), "StudioActor starting");
        Ok(StudioState {
            session: args.session,
            gateway: args.gateway,
            events: args.events,
            pending_request: None,
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            StudioMsg::SetText { text } => {
                if state.session.set_document_text(text) {
                    Self::document_changed(state);
                }
            }
            StudioMsg::Undo => {
                if state.session.undo() {
                    Self::document_changed(state);
                }
            }
            StudioMsg::Redo => {
                if state.session.redo() {
                    Self::document_changed(state);
                }
            }
            StudioMsg::RequestAnalysis { reply } => {
                let result = Self::request_analysis(&myself, state);
                let _ = reply.send(result);
            }
            StudioMsg::AnalysisFinished {
                request_id,
                outcome,
            } => Self::analysis_finished(state, request_id, outcome),
            StudioMsg::ApplySuggestion { id, reply } => {
                let result = state.session.apply_suggestion(&id);
                if matches!(result, Ok(ApplyOutcome::Applied)) {
                    Self::document_changed(state);
                }
                let _ = reply.send(result);
            }
            StudioMsg::ApplyCorrection { index, reply } => {
                let result = state.session.apply_correction(index);
                if matches!(result, Ok(ApplyOutcome::Applied)) {
                    Self::document_changed(state);
                }
                let _ = reply.send(result);
            }
            StudioMsg::ApplyAllCorrections { reply } => {
                let applied = state.session.apply_all_corrections();
                if applied > 0 {
                    Self::document_changed(state);
                }
                let _ = reply.send(applied);
            }
            StudioMsg::SwitchMode { mode } => state.session.switch_mode(mode),
            StudioMsg::HoverCorrection {
                index,
                anchor,
                reply,
            } => {
                let _ = reply.send(state.session.hover_correction(index, anchor));
            }
            StudioMsg::ClearHover => state.session.clear_hover(),
            StudioMsg::DismissHighlight => state.session.dismiss_highlight(),
            StudioMsg::SelectCategory { category } => state.session.select_category(category),
            StudioMsg::HandleKey { chord, reply } => {
                let revision = state.session.document().revision();
                let handled = state.session.handle_key(&chord);
                if state.session.document().revision() != revision {
                    Self::document_changed(state);
                }
                let _ = reply.send(handled);
            }
            StudioMsg::GetView { reply } => {
                let _ = reply.send(state.session.view());
            }
        }
        Ok(())
    }
}

impl StudioActor {
    fn emit(state: &StudioState, event: StudioEvent) {
        if let Some(events) = &state.events {
            let _ = events.send(event);
        }
    }

    fn document_changed(state: &StudioState) {
        Self::emit(
            state,
            StudioEvent::DocumentChanged {
                revision: state.session.document().revision(),
            },
        );
    }

    fn request_analysis(
        myself: &ActorRef<StudioMsg>,
        state: &mut StudioState,
    ) -> Result<String, StudioError> {
        let request = state.session.begin_analysis()?;
        let request_id = ulid::Ulid::new().to_string();
        state.pending_request = Some(request_id.clone());
        Self::emit(
            state,
            StudioEvent::AnalysisStarted {
                request_id: request_id.clone(),
            },
        );

        let gateway = state.gateway.clone();
        let myself_clone = myself.clone();
        let request_id_clone = request_id.clone();
        tokio::spawn(async move {
            // a panicking gateway must still post AnalysisFinished
            let call = tokio::spawn(async move { gateway.analyze(&request).await });
            let outcome = match call.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(error = %e, "Analysis task aborted");
                    Err(AnalysisError::Transport("analysis task aborted".to_string()))
                }
            };
            let _ = myself_clone.send_message(StudioMsg::AnalysisFinished {
                request_id: request_id_clone,
                outcome,
            });
        });

        Ok(request_id)
    }

    fn analysis_finished(
        state: &mut StudioState,
        request_id: String,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) {
        if state.pending_request.as_deref() != Some(request_id.as_str()) {
            tracing::warn!(request_id = %request_id, "Dropping analysis result for unknown request");
            return;
        }
        state.pending_request = None;

        let event = match &outcome {
            Ok(result) => StudioEvent::AnalysisInstalled {
                request_id,
                band_score: result.band_score,
            },
            Err(e) => StudioEvent::AnalysisFailed {
                request_id,
                message: e.to_string(),
            },
        };
        state.session.finish_analysis(outcome);
        Self::emit(state, event);
    }
}

/// Convenience wrapper around `ractor::call!` that maps messaging failures.
pub async fn fetch_view(actor: &ActorRef<StudioMsg>) -> Result<StudioView, StudioError> {
    ractor::call!(actor, |reply| StudioMsg::GetView { reply })
        .map_err(|e| StudioError::ActorUnavailable(e.to_string()))
}

pub async fn request_analysis(actor: &ActorRef<StudioMsg>) -> Result<String, StudioError> {
    ractor::call!(actor, |reply| StudioMsg::RequestAnalysis { reply })
        .map_err(|e| StudioError::ActorUnavailable(e.to_string()))?
}
