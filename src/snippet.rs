/// Characters of context kept on each side of a match.
pub const DEFAULT_SNIPPET_RADIUS: usize = 70;

/// Collapse every whitespace run (newlines from page reflow included) into a
/// single space and trim both ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build a bounded excerpt around the match at byte span `start..end`.
///
/// `radius` counts characters, not bytes. The window is clamped to the text
/// and never splits a code point. Out-of-range or inverted spans are clamped
/// rather than panicking.
pub fn snippet(text: &str, start: usize, end: usize, radius: usize) -> String {
    let end = floor_boundary(text, end.min(text.len()));
    let start = floor_boundary(text, start.min(end));

    let lo = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);

    let hi = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    normalize_whitespace(&text[lo..hi])
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
