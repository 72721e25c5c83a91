//! Redline Studio - essay critique engine
//!
//! This crate keeps an essay under a linear edit history, installs analysis
//! results from an external critique service, and derives annotated runs and
//! suggestion applicability from the live text on every render.

pub mod actor;
pub mod analysis;
pub mod annotator;
pub mod applier;
pub mod config;
pub mod document;
pub mod session;
pub mod suggestions;

pub use actor::{StudioActor, StudioArguments, StudioEvent, StudioMsg};
pub use session::{Session, StudioError, StudioView};
