// Recipe generation: tiered sourcing (cache → presets → live generator → fallback),
// background cache replenishment, and the HTTP handlers that expose it.
// All LLM calls go through llm_client; nothing here talks to the Anthropic API directly.

pub mod cache;
pub mod fallback;
pub mod generator;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;
