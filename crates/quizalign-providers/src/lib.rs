//! quizalign-providers: Question generator backends.
//!
//! Implements the `QuestionGenerator` trait for OpenAI-compatible chat APIs,
//! an offline template generator, and a scripted mock for tests.

pub mod config;
pub mod fewshot;
pub mod mock;
pub mod openai;
pub mod template;

pub use config::{create_generator, load_config, ProviderConfig, QuizalignConfig};
pub use quizalign_core::error::ProviderError;
