//! Analysis gateway: the boundary to the external critique model.
//!
//! The engine only depends on the `AnalysisGateway` trait; the HTTP transport
//! is one implementation and tests substitute their own.

mod http;
pub mod wire;

use async_trait::async_trait;
use shared_types::{AnalysisRequest, AnalysisResult};
use std::sync::Arc;

pub use http::HttpAnalysisGateway;

pub type SharedAnalysisGateway = Arc<dyn AnalysisGateway>;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("invalid analysis request: {0}")]
    InvalidRequest(String),

    #[error("analysis transport failed: {0}")]
    Transport(String),

    #[error("analysis service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed analysis response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError>;
}
