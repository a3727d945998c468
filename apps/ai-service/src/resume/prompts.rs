// LLM prompt constants for LaTeX resume tailoring.

/// Rebuild prompt. Replace `{job_description}` and `{latex_source}` before sending.
pub const REBUILD_PROMPT_TEMPLATE: &str = r#"You are an expert resume writer who is fluent in LaTeX.
Your task is to rewrite the content of the provided LaTeX resume to be perfectly tailored for the given job description.

**CRITICAL INSTRUCTIONS:**
1.  **DO NOT** change the LaTeX structure, commands, formatting, document class, or layout. Preserve it exactly.
2.  **ONLY** modify the text content within the resume, such as project descriptions, experience bullet points, and the professional summary.
3.  Incorporate keywords from the job description naturally into the text.
4.  Rewrite bullet points to highlight accomplishments and skills that are most relevant to the job description.
5.  Your output **MUST** be only the raw, complete, modified LaTeX code. Do not add any explanations, apologies, or introductory text.

**Job Description:**
---
{job_description}
---

**Original LaTeX Resume Source:**
---
{latex_source}
---"#;
