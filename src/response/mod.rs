//! The response processor: raw assistant text in, structured segments out.
//!
//! `ResponseProcessor::process` is a pure function of its input. It never
//! touches the network or filesystem, never executes or interprets anything
//! the text contains, and is safe on adversarial input — dangerous-looking
//! content classifies as what it looks like and goes no further.

pub mod blocks;
pub mod classify;
pub mod interactive;
pub mod requests;

use serde::{Deserialize, Serialize};

pub use blocks::{ChangeType, CodeBlock, DiffBlock, DiffLine, DiffLineKind};
pub use classify::ResponseType;
pub use interactive::InteractiveElement;
pub use requests::FileRequest;

/// Structured view of one assistant response. Derived purely from the text;
/// never persisted by this subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedResponse {
    /// Trimmed display text.
    pub content: String,
    pub response_type: ResponseType,
    pub code_blocks: Vec<CodeBlock>,
    pub diff_blocks: Vec<DiffBlock>,
    pub interactive_elements: Vec<InteractiveElement>,
    pub file_requests: Vec<FileRequest>,
    /// The input, byte for byte.
    pub raw_content: String,
}

/// Stateless processor; one instance serves any number of responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseProcessor;

impl ResponseProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, raw: &str) -> ProcessedResponse {
        ProcessedResponse {
            content: raw.trim().to_string(),
            response_type: classify::classify(raw),
            code_blocks: blocks::extract_code_blocks(raw),
            diff_blocks: blocks::extract_diff_blocks(raw),
            interactive_elements: interactive::extract_interactive_elements(raw),
            file_requests: requests::extract_file_requests(raw),
            raw_content: raw.to_string(),
        }
    }
}
