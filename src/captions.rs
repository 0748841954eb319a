use crate::{domain::CaptionModel, errors::UpstreamError, models::CaptionResponse};
use tracing::debug;

/// Builds the prompt sent to the text model. The template clause is only
/// added for a non-empty template name.
pub fn build_prompt(topic: &str, template_name: Option<&str>) -> String {
    let for_template = match template_name {
        Some(name) if !name.is_empty() => format!(" for a {name} meme"),
        _ => String::new(),
    };
    format!(
        "Write a short, witty meme caption about: {topic}{for_template}. \
         Keep it under 12 words, funny, and internet-style. Provide two options:\n\
         1. Top text\n\
         2. Bottom text\n\
         \n\
         Return in format:\n\
         Top: [text]\n\
         Bottom: [text]"
    )
}

/// Best-effort extraction of a top/bottom caption pair from free-form
/// model output.
///
/// Lines carrying a `top:`/`bottom:` label (case-insensitive, anywhere in
/// the line) win; the text after the last occurrence of the label is the
/// candidate, and a line matching `top:` is never also counted as a
/// bottom line. When no line produced anything, the raw output is split
/// into sentences instead: first sentence up, second down, with the first
/// 50 characters of the raw output as a last resort. Quote characters are
/// stripped from whatever survives. This never fails; ambiguous input
/// just yields emptier fields.
pub fn parse_caption(raw: &str) -> (String, String) {
    let mut top_text = String::new();
    let mut bottom_text = String::new();

    for line in raw.lines().filter(|line| !line.trim().is_empty()) {
        if let Some(offset) = after_last_label(line, "top:") {
            top_text = line[offset..].trim().to_string();
        } else if let Some(offset) = after_last_label(line, "bottom:") {
            bottom_text = line[offset..].trim().to_string();
        }
    }

    // Label-free (or label-but-empty) output: naive sentence split
    if top_text.is_empty() && bottom_text.is_empty() {
        let sentences: Vec<&str> = raw
            .split(['.', '!', '?'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        top_text = sentences
            .first()
            .map(|s| s.to_string())
            .unwrap_or_else(|| raw.chars().take(50).collect());
        bottom_text = sentences.get(1).map(|s| s.to_string()).unwrap_or_default();
    }

    (strip_quotes(&top_text), strip_quotes(&bottom_text))
}

/// Byte offset just past the last occurrence of `label` in `line`,
/// compared ASCII-case-insensitively. The labels are plain ASCII, so the
/// returned offset always lands on a character boundary.
fn after_last_label(line: &str, label: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let label = label.as_bytes();
    if label.is_empty() || bytes.len() < label.len() {
        return None;
    }
    let mut found = None;
    for start in 0..=bytes.len() - label.len() {
        if bytes[start..start + label.len()].eq_ignore_ascii_case(label) {
            found = Some(start + label.len());
        }
    }
    found
}

fn strip_quotes(s: &str) -> String {
    s.replace(['\'', '"'], "")
}

/// Caption adapter entry point: prompt the model about `topic` and parse
/// its reply. The raw output rides along in the response for debugging
/// and client-side fallback.
pub async fn generate_caption(
    model: &dyn CaptionModel,
    topic: &str,
    template_name: Option<&str>,
) -> Result<CaptionResponse, UpstreamError> {
    let prompt = build_prompt(topic, template_name);
    let raw = model.generate(&prompt).await?;
    let (top_text, bottom_text) = parse_caption(&raw);

    debug!(%top_text, %bottom_text, "Caption parsed from model output");
    Ok(CaptionResponse {
        top_text,
        bottom_text,
        original_response: raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labeled_lines() {
        let (top, bottom) = parse_caption("Top: Why is Monday here\nBottom: Send help");
        assert_eq!(top, "Why is Monday here");
        assert_eq!(bottom, "Send help");
    }

    #[test]
    fn labels_match_case_insensitively() {
        let (top, bottom) = parse_caption("TOP: shouting\nbottom: whispering");
        assert_eq!(top, "shouting");
        assert_eq!(bottom, "whispering");
    }

    #[test]
    fn labels_are_found_mid_line() {
        // Models often number the options; the label is not at line start
        let (top, bottom) = parse_caption("1. Top: First option\n2. Bottom: Second option");
        assert_eq!(top, "First option");
        assert_eq!(bottom, "Second option");
    }

    #[test]
    fn later_labeled_lines_override_earlier_ones() {
        let (top, _) = parse_caption("Top: first try\nTop: second try");
        assert_eq!(top, "second try");
    }

    #[test]
    fn line_with_both_labels_counts_as_top() {
        let (top, bottom) = parse_caption("Top: up Bottom: down");
        assert_eq!(top, "up Bottom: down");
        assert_eq!(bottom, "");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let (top, bottom) = parse_caption("\n   \nTop: kept\n\nBottom: also kept\n");
        assert_eq!(top, "kept");
        assert_eq!(bottom, "also kept");
    }

    #[test]
    fn quotes_are_stripped_from_results() {
        let (top, bottom) = parse_caption("Top: \"Stay calm\"\nBottom: it's 'fine'");
        assert_eq!(top, "Stay calm");
        assert_eq!(bottom, "its fine");
    }

    #[test]
    fn falls_back_to_sentence_split() {
        let (top, bottom) = parse_caption("Mondays are the worst. Send help.");
        assert_eq!(top, "Mondays are the worst");
        assert_eq!(bottom, "Send help");
    }

    #[test]
    fn fallback_with_single_sentence_leaves_bottom_empty() {
        let (top, bottom) = parse_caption("Just one thought here!");
        assert_eq!(top, "Just one thought here");
        assert_eq!(bottom, "");
    }

    #[test]
    fn fallback_keeps_a_separator_free_line_whole() {
        // No '.', '!' or '?' anywhere, so the whole output is one sentence
        let raw = "a".repeat(80);
        let (top, bottom) = parse_caption(&raw);
        assert_eq!(top, raw);
        assert_eq!(bottom, "");
    }

    #[test]
    fn fallback_without_any_sentence_truncates_raw_output() {
        // All separators: the sentence list is empty and the raw output
        // is capped at 50 characters
        let raw = "!".repeat(80);
        let (top, bottom) = parse_caption(&raw);
        assert_eq!(top, "!".repeat(50));
        assert_eq!(bottom, "");
    }

    #[test]
    fn empty_label_still_triggers_fallback() {
        // A lone "Top:" parses to an empty field, so the sentence
        // fallback runs over the raw text
        let (top, bottom) = parse_caption("Top:");
        assert_eq!(top, "Top:");
        assert_eq!(bottom, "");
    }

    #[test]
    fn empty_input_yields_empty_pair() {
        assert_eq!(parse_caption(""), (String::new(), String::new()));
    }

    #[test]
    fn prompt_mentions_topic_and_template() {
        let prompt = build_prompt("monday meetings", Some("Drake Hotline Bling"));
        assert!(prompt.contains("monday meetings"));
        assert!(prompt.contains("for a Drake Hotline Bling meme"));
        assert!(prompt.contains("Top: [text]"));
        assert!(prompt.contains("Bottom: [text]"));
    }

    #[test]
    fn prompt_omits_template_clause_when_absent_or_empty() {
        assert!(!build_prompt("cats", None).contains("for a"));
        assert!(!build_prompt("cats", Some("")).contains("for a"));
    }
}
