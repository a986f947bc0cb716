//! [`aar_domain::ports::ModelService`] adapters.

mod openai;

pub use openai::OpenAiService;
