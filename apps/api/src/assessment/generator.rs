//! Interview-question generation for one job role.
//!
//! The model is asked for a `{"questions": [...]}` object. Malformed
//! output degrades to an empty question set; only the model call itself
//! can fail.

use serde::Deserialize;
use tracing::warn;

use crate::assessment::prompts::{QUESTION_PROMPT_TEMPLATE, QUESTION_SYSTEM};
use crate::llm_client::{strip_json_fences, ChatModel, ChatRequest, LlmError};

#[derive(Debug, Default, Deserialize)]
struct QuestionSet {
    #[serde(default)]
    questions: Vec<String>,
}

/// Asks the test-creator agent for interview questions grounded in the
/// job requirements text.
pub async fn generate_test_questions(
    model: &dyn ChatModel,
    job_text: &str,
) -> Result<Vec<String>, LlmError> {
    let prompt = QUESTION_PROMPT_TEMPLATE.replace("{job_text}", job_text);
    let response = model
        .complete(ChatRequest {
            prompt: &prompt,
            system: QUESTION_SYSTEM,
            website_access: false,
        })
        .await?;

    let questions = parse_questions(&response);
    if questions.is_empty() {
        warn!("question generation returned no usable questions");
    }
    Ok(questions)
}

/// Parses the model response. Bad JSON, a missing `questions` key, or a
/// non-array value all yield an empty set.
pub fn parse_questions(text: &str) -> Vec<String> {
    serde_json::from_str::<QuestionSet>(strip_json_fences(text))
        .map(|set| set.questions)
        .unwrap_or_default()
}
