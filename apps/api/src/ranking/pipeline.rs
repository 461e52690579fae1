//! Ranking pipeline — scrape → match → finalize, strictly sequential.
//!
//! Each stage is one best-effort model call; a stage failure aborts the
//! run and surfaces as a typed error. The finalize response is kept
//! verbatim as the report and additionally parsed into `RankingData`
//! when it happens to be JSON.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{strip_json_fences, ChatModel, ChatRequest};
use crate::ranking::prompts::{
    FINALIZE_PROMPT_TEMPLATE, FINALIZE_SYSTEM, MATCH_PROMPT_TEMPLATE, MATCH_SYSTEM,
    SCRAPE_PROMPT_TEMPLATE, SCRAPE_SYSTEM,
};
use crate::ranking::weights::MatchWeights;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Parsed structure of the finalize response, when it is JSON.
/// Every field is lenient: model output is never trusted to be complete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingData {
    #[serde(default)]
    pub job_roles: Vec<JobRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRole {
    pub role_name: String,
    #[serde(default)]
    pub candidates: Vec<RankedCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCandidate {
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub reasoning: String,
}

/// Tagged result of parsing the finalize response. Downstream code must
/// handle both branches; an `Unparsed` outcome exposes zero job roles
/// but is not an error.
#[derive(Debug, Clone)]
pub enum FinalizeOutcome {
    Parsed(RankingData),
    Unparsed(String),
}

impl FinalizeOutcome {
    pub fn job_roles(&self) -> &[JobRole] {
        match self {
            FinalizeOutcome::Parsed(data) => &data.job_roles,
            FinalizeOutcome::Unparsed(_) => &[],
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, FinalizeOutcome::Parsed(_))
    }
}

/// Output of one full pipeline run.
#[derive(Debug, Clone)]
pub struct RankingReport {
    /// The finalize-stage response, verbatim. This is what the user sees
    /// and what the report download serves.
    pub report_markdown: String,
    pub outcome: FinalizeOutcome,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the three ranking stages in order.
///
/// 1. Scrape: candidate text → research agent (website access granted).
/// 2. Match: job text + candidate text + weights → ranked matches.
/// 3. Finalize: both prior responses → markdown report, parsed leniently.
pub async fn run_ranking(
    model: &dyn ChatModel,
    job_text: &str,
    candidate_text: &str,
    weights: &MatchWeights,
) -> Result<RankingReport, AppError> {
    info!("Scrape stage: gathering additional candidate insights");
    let scrape_prompt = SCRAPE_PROMPT_TEMPLATE.replace("{candidate_text}", candidate_text);
    let scraped_data = model
        .complete(ChatRequest {
            prompt: &scrape_prompt,
            system: SCRAPE_SYSTEM,
            website_access: true,
        })
        .await?;

    info!("Match stage: ranking candidates against job roles");
    let weights_json = serde_json::to_string(weights)
        .map_err(|e| AppError::Internal(anyhow!("failed to serialize weights: {e}")))?;
    let match_prompt = MATCH_PROMPT_TEMPLATE
        .replace("{job_text}", job_text)
        .replace("{candidate_text}", candidate_text)
        .replace("{weights}", &weights_json);
    let matched_candidates = model
        .complete(ChatRequest {
            prompt: &match_prompt,
            system: MATCH_SYSTEM,
            website_access: false,
        })
        .await?;

    info!("Finalize stage: composing the ranking report");
    let finalize_prompt = FINALIZE_PROMPT_TEMPLATE
        .replace("{scraped_data}", &scraped_data)
        .replace("{matched_candidates}", &matched_candidates);
    let report_markdown = model
        .complete(ChatRequest {
            prompt: &finalize_prompt,
            system: FINALIZE_SYSTEM,
            website_access: false,
        })
        .await?;

    let outcome = parse_finalize_outcome(&report_markdown);
    match &outcome {
        FinalizeOutcome::Parsed(data) => {
            info!("Finalize response parsed: {} job roles", data.job_roles.len());
        }
        FinalizeOutcome::Unparsed(_) => {
            warn!("Finalize response is not JSON; ranking structure unavailable");
        }
    }

    Ok(RankingReport {
        report_markdown,
        outcome,
    })
}

/// Parses the finalize response into `RankingData` after stripping any
/// code fences. Parse failure is an `Unparsed` outcome, never an error.
pub fn parse_finalize_outcome(text: &str) -> FinalizeOutcome {
    match serde_json::from_str::<RankingData>(strip_json_fences(text)) {
        Ok(data) => FinalizeOutcome::Parsed(data),
        Err(_) => FinalizeOutcome::Unparsed(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::llm_client::testing::StubModel;

    const JOB_TEXT: &str = "Senior Backend Engineer, 5+ years Go, remote";
    const CANDIDATE_TEXT: &str = "Alice: 6 years Go, remote-based";

    #[tokio::test]
    async fn test_stages_run_in_order_with_expected_capabilities() {
        let model = StubModel::scripted(&[
            "scrape summary",
            "match ranking",
            "## Top Candidates for Each Job Role\n\n| Rank | Name | Score | Reasoning |",
        ]);

        let report = run_ranking(&model, JOB_TEXT, CANDIDATE_TEXT, &MatchWeights::default())
            .await
            .unwrap();

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);

        // Stage 1: scrape agent gets the candidate text and website access.
        assert!(calls[0].website_access);
        assert_eq!(calls[0].system, SCRAPE_SYSTEM);
        assert!(calls[0].prompt.contains(CANDIDATE_TEXT));

        // Stage 2: match agent gets job text, candidate text, and weights.
        assert!(!calls[1].website_access);
        assert!(calls[1].prompt.contains(JOB_TEXT));
        assert!(calls[1].prompt.contains(CANDIDATE_TEXT));
        assert!(calls[1].prompt.contains("\"skills\":0.3"));

        // Stage 3: finalize agent gets both prior responses and the
        // report heading contract.
        assert!(!calls[2].website_access);
        assert!(calls[2].prompt.contains("scrape summary"));
        assert!(calls[2].prompt.contains("match ranking"));
        assert!(calls[2].prompt.contains("## Top Candidates for Each Job Role"));

        // The finalize response surfaces verbatim and is non-empty.
        assert!(report
            .report_markdown
            .contains("## Top Candidates for Each Job Role"));
    }

    #[tokio::test]
    async fn test_non_json_finalize_response_is_unparsed_with_no_roles() {
        let model = StubModel::scripted(&["scraped", "matched", "## A markdown report"]);

        let report = run_ranking(&model, JOB_TEXT, CANDIDATE_TEXT, &MatchWeights::default())
            .await
            .unwrap();

        assert!(!report.outcome.is_parsed());
        assert!(report.outcome.job_roles().is_empty());
        assert_eq!(report.report_markdown, "## A markdown report");
    }

    #[tokio::test]
    async fn test_json_finalize_response_is_parsed_into_roles() {
        let finalize = r#"{"job_roles": [
            {"role_name": "Senior Backend Engineer", "candidates": [
                {"rank": 1, "name": "Alice", "score": 92.5, "reasoning": "6 years Go, remote"}
            ]}
        ]}"#;
        let model = StubModel::scripted(&["scraped", "matched", finalize]);

        let report = run_ranking(&model, JOB_TEXT, CANDIDATE_TEXT, &MatchWeights::default())
            .await
            .unwrap();

        let roles = report.outcome.job_roles();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].role_name, "Senior Backend Engineer");
        assert_eq!(roles[0].candidates[0].name, "Alice");
        assert_eq!(roles[0].candidates[0].rank, 1);
    }

    #[tokio::test]
    async fn test_stage_failure_propagates_as_error() {
        // Script only two responses; the finalize call fails.
        let model = StubModel::scripted(&["scraped", "matched"]);

        let err = run_ranking(&model, JOB_TEXT, CANDIDATE_TEXT, &MatchWeights::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[test]
    fn test_parse_outcome_strips_code_fences() {
        let fenced = "```json\n{\"job_roles\": [{\"role_name\": \"Data Engineer\"}]}\n```";
        let outcome = parse_finalize_outcome(fenced);
        assert_eq!(outcome.job_roles().len(), 1);
        assert_eq!(outcome.job_roles()[0].role_name, "Data Engineer");
    }

    #[test]
    fn test_parse_outcome_accepts_missing_candidate_fields() {
        let sparse = r#"{"job_roles": [{"role_name": "QA", "candidates": [{"name": "Bo"}]}]}"#;
        let outcome = parse_finalize_outcome(sparse);
        let candidate = &outcome.job_roles()[0].candidates[0];
        assert_eq!(candidate.name, "Bo");
        assert_eq!(candidate.rank, 0);
        assert_eq!(candidate.reasoning, "");
    }

    #[test]
    fn test_parse_outcome_empty_object_is_parsed_with_no_roles() {
        let outcome = parse_finalize_outcome("{}");
        assert!(outcome.is_parsed());
        assert!(outcome.job_roles().is_empty());
    }
}
