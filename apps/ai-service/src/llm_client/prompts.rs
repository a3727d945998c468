// Prompt helpers shared by every module that calls the inference provider.

/// Output rules for any call whose reply is parsed as JSON.
pub const JSON_ONLY_RULES: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt made of a role line followed by `JSON_ONLY_RULES`.
pub fn json_only_system(role: &str) -> String {
    format!("{} {JSON_ONLY_RULES}", role.trim_end())
}

/// Fills `{name}` placeholders in a single left-to-right pass.
///
/// Substituted values are never re-scanned, so user text containing `{summary}`
/// or similar cannot pull in another placeholder's value. Unknown placeholders
/// are left as-is.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replacement = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_only_system_appends_rules_to_role() {
        let system = json_only_system("You are an expert HR analyst.\n");
        assert!(system.starts_with("You are an expert HR analyst. You MUST respond"));
        assert!(system.ends_with(JSON_ONLY_RULES));
    }

    #[test]
    fn test_fill_template_replaces_known_placeholders() {
        let out = fill_template("Goal: {goal}. Job: {job}", &[("goal", "lead"), ("job", "SRE")]);
        assert_eq!(out, "Goal: lead. Job: SRE");
    }

    #[test]
    fn test_fill_template_does_not_rescan_values() {
        let out = fill_template(
            "{job_description} / {summary}",
            &[("job_description", "We love {summary} tokens"), ("summary", "S")],
        );
        assert_eq!(out, "We love {summary} tokens / S");
    }

    #[test]
    fn test_fill_template_keeps_unknown_and_literal_braces() {
        let out = fill_template(
            "\\textbf{Name} {name} {missing",
            &[("name", "Ada")],
        );
        assert_eq!(out, "\\textbf{Name} Ada {missing");
    }
}
