//! Mention formatting and Discord length limits
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Word-aware chunking for reminder pings, roster field truncation
//! - 1.0.0: Mention helpers

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;
/// Discord embed field value limit
pub const FIELD_LIMIT: usize = 1024;
/// Zero-width space, used for embed fields that would otherwise be empty
pub const EMPTY_FIELD: &str = "\u{200b}";

/// Format a user mention
pub fn mention(user_id: u64) -> String {
    format!("<@{user_id}>")
}

/// Chunk text on whitespace so that no chunk exceeds `max_size` bytes.
///
/// Words longer than `max_size` are split on UTF-8 boundaries.
pub fn chunk_words(text: &str, max_size: usize) -> Vec<String> {
    if text.len() <= max_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        let needed = if current.is_empty() {
            word.len()
        } else {
            current.len() + 1 + word.len()
        };

        if needed > max_size && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        if word.len() > max_size {
            chunks.extend(chunk_long_word(word, max_size));
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn chunk_long_word(word: &str, max_size: usize) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();

    for ch in word.chars() {
        if current.len() + ch.len_utf8() > max_size && !current.is_empty() {
            result.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }

    if !current.is_empty() {
        result.push(current);
    }
    result
}

/// Join one mention per line for an embed field, collapsing the tail into
/// an "…and N more" line once `limit` would be exceeded.
pub fn mention_field(user_ids: &[u64], limit: usize) -> String {
    if user_ids.is_empty() {
        return EMPTY_FIELD.to_string();
    }

    let mut value = String::new();
    for (shown, user_id) in user_ids.iter().enumerate() {
        let line = mention(*user_id);
        let separator = usize::from(!value.is_empty());
        let left_after = user_ids.len() - shown - 1;

        // Keep room for the overflow line whenever more users follow
        let mut needed = value.len() + separator + line.len();
        if left_after > 0 {
            needed += format!("\n…and {left_after} more").len();
        }

        if needed > limit {
            if !value.is_empty() {
                value.push('\n');
            }
            value.push_str(&format!("…and {} more", user_ids.len() - shown));
            return value;
        }

        if separator == 1 {
            value.push('\n');
        }
        value.push_str(&line);
    }
    value
}
