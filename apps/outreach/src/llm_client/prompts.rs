// Shared prompt fragments and prompt-building utilities.
// Each agent that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting pieces only.

use crate::lead::Lead;

/// Reply sent when the model answers with plain text but has not finished yet.
pub const DEFAULT_AUTO_REPLY: &str = "Please continue with the task.";

/// Appended to every agent system prompt that runs inside the tool-calling loop.
pub const FINISH_INSTRUCTION: &str = "\
    When your work is complete, call the `finish` function exactly once and pass your \
    final deliverable as its `result` argument. Do not call `finish` before the \
    deliverable is complete.";

/// Renders a lead as a stable key/value block for prompts.
pub fn render_lead(lead: &Lead) -> String {
    format!(
        "- First Name: {}\n- Company Name: {}\n- Website URL: {}\n- Profile URL: {}",
        lead.first_name, lead.company_name, lead.website_url, lead.profile_url
    )
}

/// Fills `{name}` placeholders in `template` in a single left-to-right pass.
/// Inserted values are never rescanned; unknown placeholders are kept as is.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(var, _)| *var == name)
                .map(|(_, value)| (close, *value))
        });
        match value {
            Some((close, value)) => {
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
