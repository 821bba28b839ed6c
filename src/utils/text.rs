/// Discord's per-message content limit, in characters.
pub const MESSAGE_LIMIT: usize = 2000;

/// Splits `text` into pieces of at most `max_chars` characters, preferring
/// to break after a newline, then after whitespace, and only cutting inside
/// a word when a single word is longer than the limit.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text.trim();

    while !rest.is_empty() {
        if rest.chars().count() <= max_chars {
            chunks.push(rest.to_string());
            break;
        }

        let hard_end = rest
            .char_indices()
            .nth(max_chars)
            .map_or(rest.len(), |(i, _)| i);
        let window = &rest[..hard_end];
        let cut = window
            .rfind('\n')
            .or_else(|| window.rfind(char::is_whitespace))
            .filter(|&i| i > 0)
            .unwrap_or(hard_end);

        let (head, tail) = rest.split_at(cut);
        let head = head.trim_end();
        if !head.is_empty() {
            chunks.push(head.to_string());
        }
        rest = tail.trim_start();
    }

    chunks
}

/// Removes `<@id>` and `<@!id>` mentions of the bot from a message.
pub fn strip_mention(content: &str, bot_id: u64) -> String {
    content
        .replace(&format!("<@{bot_id}>"), "")
        .replace(&format!("<@!{bot_id}>"), "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_single_chunk() {
        assert_eq!(split_message("hello", MESSAGE_LIMIT), vec!["hello"]);
        assert!(split_message("   ", MESSAGE_LIMIT).is_empty());
    }

    #[test]
    fn test_long_reply_split_under_limit() {
        let text = "lorem ipsum dolor sit amet ".repeat(200);
        let chunks = split_message(&text, MESSAGE_LIMIT);
        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= MESSAGE_LIMIT));
        assert_eq!(chunks.join(" ").split_whitespace().count(), 1000);
    }

    #[test]
    fn test_prefers_newline_breaks() {
        let chunks = split_message("first line\nsecond line", 15);
        assert_eq!(chunks, vec!["first line", "second line"]);
    }

    #[test]
    fn test_multibyte_hard_cut() {
        let text = "가".repeat(25);
        let chunks = split_message(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 10);
        assert_eq!(chunks[2].chars().count(), 5);
    }

    #[test]
    fn test_strip_mention() {
        assert_eq!(strip_mention("<@42> what is rust?", 42), "what is rust?");
        assert_eq!(strip_mention("hey <@!42>", 42), "hey");
        assert_eq!(strip_mention("<@7> hi", 42), "<@7> hi");
    }
}
