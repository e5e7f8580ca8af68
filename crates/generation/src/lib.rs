//! Answer generation for lexrag.
//!
//! [`GeminiClient`] implements the `lexrag_core::GenerationClient` trait
//! against Google's Generative Language API. The query pipeline only sees
//! the trait, so other backends can be slotted in without touching it.

pub mod gemini;

pub use gemini::GeminiClient;
