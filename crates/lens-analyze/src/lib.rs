//! Plan analysis client.

#[cfg(feature = "test-util")]
pub mod mock;
mod openai;
mod unavailable;

pub use lens_types::{AnalyzeError, Analyzer, AuditReport};
pub use openai::{parse_report, OpenAiAnalyzer, OpenAiAnalyzerConfig};
pub use unavailable::UnavailableAnalyzer;

#[cfg(feature = "test-util")]
pub use mock::MockAnalyzer;
