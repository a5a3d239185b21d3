//! Provider implementations.

mod gemini;

pub use gemini::GeminiSentimentProvider;
