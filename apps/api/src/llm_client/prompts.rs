// Shared prompt fragments.
// Each feature that needs model calls keeps its own prompts.rs alongside it.
// This file contains cross-cutting fragments only.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appends the current date so the model can reason about recency.
pub fn with_current_date(system: &str, today: chrono::NaiveDate) -> String {
    format!("{system}\n\nCurrent date: {}", today.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_current_date_appends_iso_date() {
        let today = chrono::NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let prompt = with_current_date("You are helpful.", today);
        assert!(prompt.starts_with("You are helpful."));
        assert!(prompt.ends_with("Current date: 2025-03-09"));
    }
}
