//! Prompt templates for Redpulse.
//!
//! Templates use `{{variable}}` placeholders rendered at call time.

use chrono::{Days, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub agent: AgentPrompts,
    pub fallback: FallbackPrompts,
}

/// Prompts for the tool-augmented analysis path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
    pub user: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a Reddit analysis expert. Use available tools to:
1. Find top 2 posts about the given topic BUT only after {{cutoff_date}}, NOTHING before this date strictly!
2. Analyze their content and sentiment
3. Create a summary of discussions and overall sentiment"#
                .to_string(),

            user: r#"Analyze Reddit posts about '{{topic}}'.
Provide a comprehensive summary including:
- Main discussion points
- Key opinions expressed
- Any notable trends or patterns
- Summarize the overall narrative, discussion points and also quote interesting comments without mentioning names
- Overall sentiment (positive/neutral/negative)"#
                .to_string(),
        }
    }
}

/// Prompt for the degraded path with no live data access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackPrompts {
    pub user: String,
}

impl Default for FallbackPrompts {
    fn default() -> Self {
        Self {
            user: r#"You are a Reddit analysis expert. Provide a comprehensive analysis of recent Reddit discussions about '{{topic}}'.

Since I cannot access live Reddit data, please provide:
- What types of discussions would typically be happening about this topic on Reddit
- Common opinions and sentiment patterns you'd expect to find
- Key discussion points and trends
- Overall sentiment analysis (positive/neutral/negative)
- Sample of the kind of interesting quotes or comments that might appear (without usernames)

Make this analysis realistic and based on typical Reddit discussion patterns for this topic.

Topic to analyze: {{topic}}
Time frame: Recent discussions (last 2 weeks)"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}

/// Cutoff date for "recent" posts: today minus `lookback_days`, `YYYY-MM-DD`.
pub fn cutoff_date(lookback_days: u32) -> String {
    let today = Local::now().date_naive();
    let cutoff = today
        .checked_sub_days(Days::new(u64::from(lookback_days)))
        .unwrap_or(today);
    cutoff.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts_nonempty() {
        let prompts = Prompts::default();
        assert!(prompts.agent.system.contains("{{cutoff_date}}"));
        assert!(prompts.agent.user.contains("{{topic}}"));
        assert!(prompts.fallback.user.contains("{{topic}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Posts about {{topic}} after {{cutoff_date}}.";
        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), "rust".to_string());
        vars.insert("cutoff_date".to_string(), "2026-08-16".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Posts about rust after 2026-08-16.");
    }

    #[test]
    fn test_cutoff_date_two_weeks_back() {
        let expected = Local::now()
            .date_naive()
            .checked_sub_days(Days::new(14))
            .unwrap();
        assert_eq!(cutoff_date(14), expected.format("%Y-%m-%d").to_string());
    }

    #[test]
    fn test_cutoff_date_format() {
        let date = cutoff_date(14);
        // YYYY-MM-DD
        assert_eq!(date.len(), 10);
        assert_eq!(&date[4..5], "-");
        assert_eq!(&date[7..8], "-");
    }

    #[test]
    fn test_rendered_system_prompt_carries_cutoff() {
        let prompts = Prompts::default();
        let cutoff = cutoff_date(14);
        let mut vars = HashMap::new();
        vars.insert("cutoff_date".to_string(), cutoff.clone());

        let rendered = Prompts::render(&prompts.agent.system, &vars);
        assert!(rendered.contains(&cutoff));
        assert!(!rendered.contains("{{cutoff_date}}"));
    }
}
