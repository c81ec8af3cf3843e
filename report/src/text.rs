//! Label truncation for point annotations and hover text.

use textwrap::WordSeparator;

/// Default maximum label length.
pub const DEFAULT_MAX_LEN: usize = 30;

const PLACEHOLDER: &str = "...";

/// Shorten `text` to at most `max_len` characters.
///
/// Text that already fits is returned unchanged. Otherwise whitespace is
/// collapsed and whole words are kept while they fit alongside the `...`
/// placeholder. A leading word too long to fit leaves just the placeholder.
/// Lengths are counted in `char`s, not terminal columns, so wide and
/// combining characters count as one each.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_len {
        return collapsed;
    }

    let budget = max_len.saturating_sub(PLACEHOLDER.len());
    if budget == 0 {
        return PLACEHOLDER.to_string();
    }

    let mut kept = String::new();
    let mut kept_len = 0;
    for word in WordSeparator::AsciiSpace.find_words(&collapsed) {
        let separator = usize::from(kept_len > 0);
        let word_len = word.word.chars().count();
        if kept_len + separator + word_len > budget {
            break;
        }
        if separator == 1 {
            kept.push(' ');
        }
        kept.push_str(word.word);
        kept_len += separator + word_len;
    }

    if kept.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        format!("{kept}{PLACEHOLDER}")
    }
}
