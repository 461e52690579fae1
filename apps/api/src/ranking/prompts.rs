// All LLM prompt constants for the ranking pipeline. Three agent
// identities, one per stage. Templates use `{placeholder}` substitution.

/// System prompt for the scrape agent — the only agent granted the
/// website-fetch capability.
pub const SCRAPE_SYSTEM: &str = "You are a candidate research agent. \
    You enrich candidate profiles with information from URLs the \
    candidates themselves provide. Use the fetch_website tool for any \
    URL you find. Be factual; if a page cannot be fetched, say so and \
    move on. Respond in markdown.";

/// Scrape stage prompt template. Replace `{candidate_text}` before sending.
pub const SCRAPE_PROMPT_TEMPLATE: &str = r#"Extract additional candidate insights from provided URLs.

**Candidate Profiles:**
{candidate_text}

Your task:
1. Identify candidate URLs in the provided profiles.
2. Fetch relevant data from those URLs.
3. Summarize the additional insights gained for each candidate.

If a profile contains no URLs, state that no additional insights were found for that candidate."#;

/// System prompt for the match agent.
pub const MATCH_SYSTEM: &str = "You are a recruiting analyst. You match \
    candidates to job roles strictly from the material provided, weighing \
    criteria according to the stated priority weights. Respond in markdown.";

/// Match stage prompt template.
/// Replace `{job_text}`, `{candidate_text}`, `{weights}` before sending.
pub const MATCH_PROMPT_TEMPLATE: &str = r#"Determine candidate-job role matches based on provided job requirements and profiles.

**Job Requirements:**
{job_text}

**Candidate Profiles:**
{candidate_text}

Your task:
1. Analyze the provided job requirements and candidate profiles.
2. Match each candidate to the most suitable job role based on:
- **Skills**
- **Experience**
- **Salary Fit**
- **Location**
- **Education**
- **Weight Priorities:** {weights}
3. Generate a ranked list of candidates for each job role."#;

/// System prompt for the finalize agent — composes the report shown to
/// the user and the machine-readable ranking structure.
pub const FINALIZE_SYSTEM: &str = "You are a hiring report writer for HR \
    decision-makers. You combine research insights and match analysis \
    into one clear, actionable markdown report.";

/// Finalize stage prompt template.
/// Replace `{scraped_data}`, `{matched_candidates}` before sending.
pub const FINALIZE_PROMPT_TEMPLATE: &str = r#"Generate a structured ranking based on the insights provided by both agents.

**Scraped Data from Candidate URLs:**
{scraped_data}

**Matched Candidates:**
{matched_candidates}

Your task:
1. Combine insights from the scraped data and the candidate-job matching results.
2. Generate a final ranked list of candidates for each job role in the following format:

## Top Candidates for Each Job Role
- **Job Role 1:**
| Rank | Name | Score | Reasoning |
|------|------|-------|-----------|

- **Job Role 2:**
| Rank | Name | Score | Reasoning |
|------|------|-------|-----------|

3. Ensure the output is clear and actionable for HR decision-makers."#;
