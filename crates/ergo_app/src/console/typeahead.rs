/// Free-text conventions the backend understands in chat input.
pub const CHAT_VOCABULARY: &[&str] = &["project", "resume", "analyze", "reset"];

/// Console-local slash commands.
pub const SLASH_VOCABULARY: &[&str] = &[
    "/yes", "/no", "/cmd", "/project", "/resume", "/reset", "/clear", "/clearlog", "/suggest",
    "/status", "/help", "/quit",
];

/// Vocabulary entries starting with `draft` (case-insensitive), excluding an
/// entry the draft already spells out in full.
pub fn suggestions(draft: &str, vocabulary: &[&'static str]) -> Vec<&'static str> {
    let draft = draft.trim_start().to_ascii_lowercase();
    if draft.is_empty() {
        return Vec::new();
    }
    vocabulary
        .iter()
        .copied()
        .filter(|word| word.starts_with(&draft) && *word != draft)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_matches_exclude_exact_word() {
        assert_eq!(suggestions("re", CHAT_VOCABULARY), vec!["resume", "reset"]);
        assert_eq!(suggestions("RES", CHAT_VOCABULARY), vec!["resume", "reset"]);
        assert!(suggestions("reset", CHAT_VOCABULARY).is_empty());
        assert!(suggestions("", CHAT_VOCABULARY).is_empty());
        assert!(suggestions("x", CHAT_VOCABULARY).is_empty());
    }

    #[test]
    fn slash_prefix_lists_related_commands() {
        assert_eq!(suggestions("/clear", SLASH_VOCABULARY), vec!["/clearlog"]);
    }
}
