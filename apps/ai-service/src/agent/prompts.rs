// LLM prompt constants for the career-advice pipeline.
// Filled with llm_client::prompts::fill_template; JSON calls wrap their role
// line with llm_client::prompts::json_only_system.

/// Role line for resume analysis. The JSON output rules are appended at call time.
pub const ANALYSIS_ROLE: &str = "You are an expert HR analyst.";

/// Resume analysis prompt. Replace `{resume}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following resume text.

Return a JSON object with this EXACT schema (no extra fields):
{
  "skills": ["Rust", "PostgreSQL", "Kubernetes", "gRPC", "Incident response"],
  "summary": "Backend engineer with six years building payment infrastructure."
}

Rules:
- "skills": the 5 to 7 most prominent technical and professional skills, most important first.
- "summary": a short professional summary of the candidate, at most three sentences.
- If the resume lists fewer skills, return only the ones it supports. Never invent skills.

Resume:
{resume}"#;

/// Recommendation prompt. Placeholders: `{user_goal}`, `{skills}`, `{summary}`,
/// `{job_description}`, `{similar_jobs}`.
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"You are a world-class career coach providing advice in a job tracking app.
A user wants to achieve this goal: "{user_goal}"

Here is the structured analysis of their resume:
- Key Skills Identified: {skills}
- Professional Summary: {summary}

Here is the target job description they want to apply for:
---
{job_description}
---

For added context, here are snippets from other similar jobs they have stored:
---
{similar_jobs}
---

Provide a concise, actionable, and step-by-step recommendation in Markdown format.
Focus on specific changes to their resume, highlighting which of their skills ({skills}) to emphasize,
and suggest how to bridge any gaps based on the target job description.
Keep the tone encouraging and professional."#;
