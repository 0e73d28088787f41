pub mod error;

pub use error::{ErrorCategory, ErrorClassifier, ExpandError, LlmError, Result};
