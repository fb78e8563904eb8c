// Conversion engine: prompt building, sequential per-platform generation,
// and the multipart convert handler.
// All LLM calls go through providers — no direct vendor API calls here.

pub mod handlers;
pub mod pipeline;
pub mod prompts;
