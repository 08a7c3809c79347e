pub mod gemini;
pub mod sui;
