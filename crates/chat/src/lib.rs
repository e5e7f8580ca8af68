//! The lexrag query pipeline.
//!
//! [`QueryOrchestrator`] ties the pieces together: it validates a query,
//! resolves the conversation, persists the user turn, retrieves statute
//! articles from the index, composes a grounded prompt via
//! [`PromptComposer`], calls the generation backend, and records the
//! assistant turn with citation metadata.

pub mod composer;
pub mod orchestrator;

pub use composer::PromptComposer;
pub use orchestrator::{
    QueryOrchestrator, CONFIDENCE_GROUNDED, CONFIDENCE_UNGROUNDED, MAX_QUERY_CHARS,
    TITLE_MAX_CHARS,
};
