pub mod analyzer;
pub mod backend;
pub mod classifier;
pub mod extractor;
pub mod parser;
pub mod profile;
pub mod prompts;
pub mod question;
pub mod renderer;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use analyzer::Analyzer;
