//! Prompt templates for repurposing an investment report into platform copy.
//!
//! Everything here is a pure function of its inputs: identical
//! (text, platform, style) always yields the identical prompt string.

use crate::models::platform::Platform;

/// System prompt shared by every platform. The structure rules let the
/// Word formatter reconstruct headings, bullets, and tables downstream.
pub const GENERATION_SYSTEM: &str = "You are a financial marketing copywriter \
    repurposing an investment research report for social media. \
    Ground every claim in the report text you are given. \
    Do NOT invent figures, tickers, or events not present in the report. \
    \
    STRUCTURE RULES: \
    Use Markdown headers (#, ##, ###) for titles and section breaks. \
    Use '-' for bullet lists. \
    If you reproduce tabular data (rows and columns), you MUST wrap it in \
    strict tags on their own lines: [[TABLE_START]] ... [[TABLE_END]], with \
    one row per line and cells separated by '|'. \
    Output plain text with that Markdown only — no code fences.";

/// Per-platform voice and length directives.
const LINKEDIN_DIRECTIVE: &str = "Write a full LinkedIn article: a strong headline as a '#' \
    header, an engaging opening hook, 3-5 sections with '##' subheads covering the report's \
    key findings, and a closing call to action. Professional but conversational tone, \
    600-900 words. Reproduce the most important figures as a table.";

const TWITTER_DIRECTIVE: &str = "Write a Twitter thread of 4-6 numbered posts. Each post \
    must stand alone under 280 characters, lead with the sharpest data point, and end the \
    thread with a takeaway. No hashtag stuffing: at most two hashtags total.";

const XIAOHONGSHU_DIRECTIVE: &str = "Write a Xiaohongshu post in Simplified Chinese: a \
    catchy emoji-friendly title, a personal first-person angle on the report's findings, \
    short punchy paragraphs, and 3-5 relevant hashtags at the end.";

const REDDIT_DIRECTIVE: &str = "Write a Reddit discussion post for an investing subreddit: \
    an informative title as a '#' header, a neutral summary of the report's thesis with the \
    supporting numbers, explicit caveats, and an open question to invite discussion. \
    No marketing language or emoji.";

/// Prompt template. Replace `{platform_directive}`, `{style_block}`,
/// `{report_text}` before sending.
const PROMPT_TEMPLATE: &str = "TASK:\n{platform_directive}\n{style_block}\nINVESTMENT REPORT TEXT:\n{report_text}";

fn platform_directive(platform: Platform) -> &'static str {
    match platform {
        Platform::LinkedIn => LINKEDIN_DIRECTIVE,
        Platform::Twitter => TWITTER_DIRECTIVE,
        Platform::Xiaohongshu => XIAOHONGSHU_DIRECTIVE,
        Platform::Reddit => REDDIT_DIRECTIVE,
    }
}

/// Builds the user prompt for one platform. Deterministic and side-effect
/// free; the optional style directive is passed through verbatim.
pub fn build_prompt(report_text: &str, platform: Platform, style: Option<&str>) -> String {
    let style_block = match style.map(str::trim).filter(|s| !s.is_empty()) {
        Some(style) => format!("\nSTYLE DIRECTIVE:\n{style}\n"),
        None => String::new(),
    };

    PROMPT_TEMPLATE
        .replace("{platform_directive}", platform_directive(platform))
        .replace("{style_block}", &style_block)
        .replace("{report_text}", report_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_is_deterministic() {
        let a = build_prompt("Q3 revenue up 12%", Platform::LinkedIn, Some("upbeat"));
        let b = build_prompt("Q3 revenue up 12%", Platform::LinkedIn, Some("upbeat"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_build_prompt_embeds_report_and_style() {
        let prompt = build_prompt("Q3 revenue up 12%", Platform::Reddit, Some("keep it dry"));
        assert!(prompt.contains("Q3 revenue up 12%"));
        assert!(prompt.contains("keep it dry"));
    }

    #[test]
    fn test_build_prompt_differs_per_platform() {
        let text = "Q3 revenue up 12%";
        let linkedin = build_prompt(text, Platform::LinkedIn, None);
        let twitter = build_prompt(text, Platform::Twitter, None);
        assert_ne!(linkedin, twitter);
    }

    #[test]
    fn test_blank_style_adds_no_block() {
        let with_blank = build_prompt("text", Platform::Twitter, Some("   "));
        let without = build_prompt("text", Platform::Twitter, None);
        assert_eq!(with_blank, without);
        assert!(!without.contains("STYLE DIRECTIVE"));
    }
}
