//! Delimiter splitting and the separator priority list.

/// Default delimiters, most to least meaningful: paragraphs, lines, CJK and
/// ASCII sentence/clause punctuation, spaces, then single characters.
pub const DEFAULT_SEPARATORS: &[&str] = &[
    "\n\n", "\n", "。", ".", "！", "!", "？", "?", "；", ";", "，", ",", " ", "",
];

/// Ordered candidate delimiters, always ending in `""`.
///
/// The trailing empty delimiter splits between every character, so recursive
/// splitting over this list always makes progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparatorPriority(Vec<String>);

impl SeparatorPriority {
    pub fn new<I, S>(separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list: Vec<String> = separators.into_iter().map(Into::into).collect();
        if list.last().map_or(true, |s| !s.is_empty()) {
            list.push(String::new());
        }
        Self(list)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for SeparatorPriority {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATORS.iter().copied())
    }
}

/// Split `text` on every occurrence of `separator`.
///
/// Every piece after the first keeps the separator as its prefix, so the
/// pieces concatenate back to the input. Whitespace-only pieces are dropped.
/// The empty separator yields one piece per char. When `separator` does not
/// occur the result is the trimmed input alone, which tells the caller to
/// try the next separator.
pub fn split_on_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }
    if !text.contains(separator) {
        let trimmed = text.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    }
    text.split(separator)
        .enumerate()
        .map(|(i, part)| {
            if i == 0 {
                part.to_string()
            } else {
                format!("{separator}{part}")
            }
        })
        .filter(|piece| !piece.trim().is_empty())
        .collect()
}
