// Gap analysis: prompt the LLM with competitor posts, validate what comes
// back, and publish it as a document.
// All LLM calls go through llm_client — no direct Gemini calls here.

pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod orchestrator;
pub mod prompts;
