//! Character-counted text utilities shared by the chunking strategies.
//!
//! Every size in the engine is measured in `char`s, so slicing must go through
//! these helpers rather than byte ranges.

/// Length of `text` in chars.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The last `n` chars of `text` (all of it when shorter).
pub(crate) fn tail_chars(text: &str, n: usize) -> &str {
    let len = char_len(text);
    if len <= n {
        return text;
    }
    match text.char_indices().nth(len - n) {
        Some((idx, _)) => &text[idx..],
        None => "",
    }
}

/// The first `n` chars of `text` (all of it when shorter).
pub(crate) fn head_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Cut `text` into consecutive slices of at most `width` chars.
pub(crate) fn slice_chars(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|slice| slice.iter().collect())
        .collect()
}

/// Prepend the trailing `overlap` chars of each chunk to its successor.
///
/// Overlap is taken from the un-overlapped previous chunk, so context never
/// compounds across more than one boundary.
pub(crate) fn add_overlap(chunks: Vec<String>, overlap: usize) -> Vec<String> {
    if chunks.len() <= 1 || overlap == 0 {
        return chunks;
    }
    let mut overlapped = Vec::with_capacity(chunks.len());
    overlapped.push(chunks[0].clone());
    for pair in chunks.windows(2) {
        let context = tail_chars(&pair[0], overlap);
        overlapped.push(format!("{context}{}", pair[1]));
    }
    overlapped
}
