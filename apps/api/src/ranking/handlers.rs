//! Axum route handlers for the ranking pipeline and report download.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ranking::pipeline::{run_ranking, JobRole};
use crate::ranking::weights::MatchWeights;
use crate::session::Session;
use crate::state::AppState;

pub const REPORT_FILENAME: &str = "ranked_candidates.md";

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub job_text: String,
    pub candidate_text: String,
    #[serde(default)]
    pub weights: MatchWeights,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub session_id: Uuid,
    pub report_markdown: String,
    /// Whether the finalize response parsed into a ranking structure.
    pub ranking_parsed: bool,
    /// Empty when the finalize response did not parse.
    pub job_roles: Vec<JobRole>,
}

/// POST /api/v1/rank
///
/// Runs the full scrape → match → finalize pipeline. Both inputs must be
/// non-blank; validation happens before any external call is made.
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    if request.job_text.trim().is_empty() || request.candidate_text.trim().is_empty() {
        return Err(AppError::Validation(
            "Please provide both job requirements and candidate profiles.".to_string(),
        ));
    }

    let weights = request.weights.clamped();
    let report = run_ranking(
        state.llm.as_ref(),
        &request.job_text,
        &request.candidate_text,
        &weights,
    )
    .await?;

    let session_id = Uuid::new_v4();
    let job_roles = report.outcome.job_roles().to_vec();
    let ranking_parsed = report.outcome.is_parsed();

    state.sessions.insert(Session {
        id: session_id,
        created_at: Utc::now(),
        weights,
        job_text: request.job_text,
        report_markdown: report.report_markdown.clone(),
        outcome: report.outcome,
    });

    Ok(Json(RankResponse {
        session_id,
        report_markdown: report.report_markdown,
        ranking_parsed,
        job_roles,
    }))
}

/// GET /api/v1/report/:session_id
///
/// Serves the stored finalize-stage markdown as a download.
pub async fn handle_report_download(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = state
        .sessions
        .get(&session_id)
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    let headers = [
        (
            header::CONTENT_TYPE,
            "text/markdown; charset=utf-8".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{REPORT_FILENAME}\""),
        ),
    ];
    Ok((headers, session.report_markdown).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::forms::testing::StubForms;
    use crate::llm_client::testing::StubModel;
    use crate::state::testing::state_with;

    const REPORT: &str = "## Top Candidates for Each Job Role\n\n| Rank | Name | Score | Reasoning |";

    fn rank_request(job: &str, candidates: &str) -> Json<RankRequest> {
        Json(RankRequest {
            job_text: job.to_string(),
            candidate_text: candidates.to_string(),
            weights: MatchWeights::default(),
        })
    }

    #[tokio::test]
    async fn test_blank_inputs_rejected_before_any_model_call() {
        let model = Arc::new(StubModel::scripted(&[]));
        let state = state_with(model.clone(), Arc::new(StubForms::new()));

        for (job, candidates) in [("", "Alice: 6 years Go"), ("Backend role", "   "), ("", "")] {
            let err = handle_rank(State(state.clone()), rank_request(job, candidates))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_rank_returns_report_and_stores_session() {
        let model = Arc::new(StubModel::scripted(&["scraped", "matched", REPORT]));
        let state = state_with(model.clone(), Arc::new(StubForms::new()));

        let Json(response) = handle_rank(
            State(state.clone()),
            rank_request(
                "Senior Backend Engineer, 5+ years Go, remote",
                "Alice: 6 years Go, remote-based",
            ),
        )
        .await
        .unwrap();

        assert_eq!(model.call_count(), 3);
        assert!(response
            .report_markdown
            .contains("## Top Candidates for Each Job Role"));
        assert!(!response.ranking_parsed);
        assert!(response.job_roles.is_empty());

        let session = state.sessions.get(&response.session_id).unwrap();
        assert_eq!(session.report_markdown, REPORT);
        assert_eq!(session.job_text, "Senior Backend Engineer, 5+ years Go, remote");
    }

    #[tokio::test]
    async fn test_rank_surfaces_parsed_roles() {
        let finalize =
            r#"{"job_roles": [{"role_name": "Platform Engineer", "candidates": []}]}"#;
        let model = Arc::new(StubModel::scripted(&["scraped", "matched", finalize]));
        let state = state_with(model, Arc::new(StubForms::new()));

        let Json(response) = handle_rank(
            State(state),
            rank_request("Platform Engineer, Rust", "Bo: 4 years Rust"),
        )
        .await
        .unwrap();

        assert!(response.ranking_parsed);
        assert_eq!(response.job_roles.len(), 1);
        assert_eq!(response.job_roles[0].role_name, "Platform Engineer");
    }

    #[tokio::test]
    async fn test_report_download_serves_stored_markdown() {
        let model = Arc::new(StubModel::scripted(&["scraped", "matched", REPORT]));
        let state = state_with(model, Arc::new(StubForms::new()));

        let Json(ranked) = handle_rank(
            State(state.clone()),
            rank_request("Backend role", "Alice: 6 years Go"),
        )
        .await
        .unwrap();

        let response = handle_report_download(State(state), Path(ranked.session_id))
            .await
            .unwrap();

        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains(REPORT_FILENAME));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), REPORT.as_bytes());
    }

    #[tokio::test]
    async fn test_report_download_unknown_session_is_not_found() {
        let state = state_with(
            Arc::new(StubModel::scripted(&[])),
            Arc::new(StubForms::new()),
        );
        let err = handle_report_download(State(state), Path(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
