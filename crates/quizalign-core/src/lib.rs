//! quizalign-core: Alignment, validation and retry pipeline for quiz items.
//!
//! This crate defines the item model, the keyword and class-band analysis,
//! the per-item validator and scorer, and the orchestrator that drives a
//! [`traits::QuestionGenerator`] until the output is aligned.

pub mod align;
pub mod band;
pub mod batch;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod keywords;
pub mod model;
pub mod normalize;
pub mod ontology;
pub mod report;
pub mod scorer;
pub mod traits;
pub mod validator;
