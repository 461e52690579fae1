//! Axum route handler for assessment creation.
//!
//! Failure semantics follow the interaction contract: unknown session and
//! blank role are typed request errors, but everything downstream — the
//! question-generation call and the forms API — is caught and rendered
//! as a user-visible error string rather than re-raised.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::assessment::generator::generate_test_questions;
use crate::errors::AppError;
use crate::forms::FormsPublisher;
use crate::llm_client::ChatModel;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAssessmentRequest {
    pub session_id: Uuid,
    pub role_name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateAssessmentResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub question_count: usize,
}

struct PublishedAssessment {
    form_url: String,
    question_count: usize,
}

/// POST /api/v1/assessments
///
/// Generates interview questions for one job role and publishes them as
/// an external form. Repeated calls for the same role are not deduplicated
/// — each creates a new distinct form.
pub async fn handle_create_assessment(
    State(state): State<AppState>,
    Json(request): Json<CreateAssessmentRequest>,
) -> Result<Json<CreateAssessmentResponse>, AppError> {
    if request.role_name.trim().is_empty() {
        return Err(AppError::Validation(
            "role_name cannot be empty".to_string(),
        ));
    }

    let session = state
        .sessions
        .get(&request.session_id)
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", request.session_id)))?;

    match publish_assessment(
        state.llm.as_ref(),
        state.forms.as_ref(),
        &session.job_text,
        &request.role_name,
    )
    .await
    {
        Ok(published) => {
            info!(
                "Created assessment form for '{}' with {} questions",
                request.role_name, published.question_count
            );
            Ok(Json(CreateAssessmentResponse {
                form_url: Some(published.form_url),
                error: None,
                question_count: published.question_count,
            }))
        }
        Err(e) => {
            warn!("Assessment creation failed for '{}': {e}", request.role_name);
            Ok(Json(CreateAssessmentResponse {
                form_url: None,
                error: Some(format!("Error creating form: {e}")),
                question_count: 0,
            }))
        }
    }
}

async fn publish_assessment(
    model: &dyn ChatModel,
    forms: &dyn FormsPublisher,
    job_text: &str,
    role_name: &str,
) -> Result<PublishedAssessment, AppError> {
    let questions = generate_test_questions(model, job_text).await?;

    let title = format!("{role_name} Skills Assessment");
    let document_title = format!("{role_name} Test");
    let form_id = forms.create_form(&title, &document_title).await?;

    // An empty batch is never sent; the form simply stays item-less.
    if !questions.is_empty() {
        forms.add_short_answer_items(&form_id, &questions).await?;
    }

    Ok(PublishedAssessment {
        form_url: form_id.edit_url(),
        question_count: questions.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;

    use crate::forms::testing::StubForms;
    use crate::llm_client::testing::StubModel;
    use crate::ranking::pipeline::FinalizeOutcome;
    use crate::ranking::weights::MatchWeights;
    use crate::session::Session;
    use crate::state::testing::state_with;

    const QUESTIONS_JSON: &str = r#"{"questions": ["Explain Go channels.", "Describe GC tuning."]}"#;

    fn seeded_state(model: Arc<StubModel>, forms: Arc<StubForms>) -> (crate::state::AppState, Uuid) {
        let state = state_with(model, forms);
        let session_id = Uuid::new_v4();
        state.sessions.insert(Session {
            id: session_id,
            created_at: Utc::now(),
            weights: MatchWeights::default(),
            job_text: "Senior Backend Engineer, 5+ years Go, remote".to_string(),
            report_markdown: "report".to_string(),
            outcome: FinalizeOutcome::Unparsed("report".to_string()),
        });
        (state, session_id)
    }

    fn assessment_request(session_id: Uuid, role: &str) -> Json<CreateAssessmentRequest> {
        Json(CreateAssessmentRequest {
            session_id,
            role_name: role.to_string(),
        })
    }

    #[tokio::test]
    async fn test_create_assessment_publishes_form_with_questions() {
        let model = Arc::new(StubModel::scripted(&[QUESTIONS_JSON]));
        let forms = Arc::new(StubForms::new());
        let (state, session_id) = seeded_state(model, forms.clone());

        let Json(response) = handle_create_assessment(
            State(state),
            assessment_request(session_id, "Senior Backend Engineer"),
        )
        .await
        .unwrap();

        assert_eq!(
            response.form_url.as_deref(),
            Some("https://docs.google.com/forms/d/form-0/edit")
        );
        assert!(response.error.is_none());
        assert_eq!(response.question_count, 2);

        assert_eq!(
            forms.created.lock().unwrap()[0],
            "Senior Backend Engineer Skills Assessment"
        );
        let items = forms.items.lock().unwrap();
        assert_eq!(items[0].0, "form-0");
        assert_eq!(items[0].1.len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_creation_yields_distinct_forms() {
        let model = Arc::new(StubModel::scripted(&[QUESTIONS_JSON, QUESTIONS_JSON]));
        let forms = Arc::new(StubForms::new());
        let (state, session_id) = seeded_state(model, forms);

        let Json(first) = handle_create_assessment(
            State(state.clone()),
            assessment_request(session_id, "Backend Engineer"),
        )
        .await
        .unwrap();
        let Json(second) = handle_create_assessment(
            State(state),
            assessment_request(session_id, "Backend Engineer"),
        )
        .await
        .unwrap();

        assert_ne!(first.form_url, second.form_url);
    }

    #[tokio::test]
    async fn test_malformed_questions_still_create_an_empty_form() {
        let model = Arc::new(StubModel::scripted(&["not json at all"]));
        let forms = Arc::new(StubForms::new());
        let (state, session_id) = seeded_state(model, forms.clone());

        let Json(response) =
            handle_create_assessment(State(state), assessment_request(session_id, "QA Engineer"))
                .await
                .unwrap();

        assert!(response.form_url.is_some());
        assert_eq!(response.question_count, 0);
        assert_eq!(forms.created.lock().unwrap().len(), 1);
        // No item batch is sent for an empty question set.
        assert!(forms.items.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_forms_failure_is_rendered_not_raised() {
        let model = Arc::new(StubModel::scripted(&[QUESTIONS_JSON]));
        let forms = Arc::new(StubForms::failing());
        let (state, session_id) = seeded_state(model, forms);

        let Json(response) =
            handle_create_assessment(State(state), assessment_request(session_id, "Data Engineer"))
                .await
                .unwrap();

        assert!(response.form_url.is_none());
        let error = response.error.unwrap();
        assert!(error.starts_with("Error creating form:"), "got: {error}");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let state = state_with(
            Arc::new(StubModel::scripted(&[])),
            Arc::new(StubForms::new()),
        );
        let err = handle_create_assessment(
            State(state),
            assessment_request(Uuid::new_v4(), "Backend Engineer"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_blank_role_name_is_rejected() {
        let model = Arc::new(StubModel::scripted(&[]));
        let (state, session_id) = seeded_state(model.clone(), Arc::new(StubForms::new()));

        let err = handle_create_assessment(State(state), assessment_request(session_id, "  "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(model.call_count(), 0);
    }
}
