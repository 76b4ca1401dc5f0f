pub mod analysis_llm;
pub mod gemini;
pub mod image_gen;
pub mod qa_llm;
pub mod study_llm;

pub use analysis_llm::GeminiAnalysisAdapter;
pub use gemini::GeminiClient;
pub use image_gen::GeminiImageAdapter;
pub use qa_llm::{GeminiQaAdapter, OpenAiQaAdapter};
pub use study_llm::GeminiStudyAdapter;
