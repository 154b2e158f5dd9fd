pub mod openai;
mod types;

pub use openai::OpenAiProvider;
pub use types::*;
