pub mod claude;
pub mod error;
pub mod openai;
pub mod traits;

pub use claude::Claude;
pub use error::{AiError, Result};
pub use openai::OpenAi;
pub use traits::{GenerationBackend, Sampling};
