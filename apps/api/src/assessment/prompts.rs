// LLM prompt constants for assessment generation.

/// System prompt for the test-creator agent — enforces JSON-only output.
pub const QUESTION_SYSTEM: &str = "You are a technical interviewer \
    designing a skills assessment for a specific job role. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Question-generation prompt template. Replace `{job_text}` before sending.
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"Generate 5-7 technical interview questions based on these job requirements:
{job_text}

Return the questions in JSON format:
{"questions": ["question1", "question2", ...]}"#;
