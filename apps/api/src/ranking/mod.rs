// Candidate Ranking Pipeline
// Implements: weight configuration, scrape → match → finalize staging,
// finalize-response parsing, report download.
// All LLM calls go through llm_client — no direct Anthropic calls here.

pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod weights;
