pub mod types;
pub mod prompt;
pub mod parser;
pub mod validation;
pub mod anthropic;
pub mod orchestrator;

pub use types::*;
pub use prompt::*;
pub use parser::*;
pub use validation::*;
pub use anthropic::*;
pub use orchestrator::*;

pub use crate::models::enums::{PromptLanguage, Severity};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("medication list is empty")]
    EmptyInput,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Model service error: {0}")]
    Upstream(String),

    #[error("Model service did not answer within {0}s")]
    UpstreamTimeout(u64),

    #[error("Unsupported model response content: {0}")]
    UnsupportedResponseShape(String),

    /// `raw` is the unmodified model reply. For operator logs only.
    #[error("Could not parse model response: {detail}")]
    ResponseParse { raw: String, detail: String },
}
