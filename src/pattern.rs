use regex::{Regex, RegexBuilder};

use crate::error::SearchError;

/// A query compiled once per run and reused for every page.
///
/// Always built with dot-matches-newline, so a regex like `quarterly.revenue`
/// still hits when extraction reflowed the phrase across a line break.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
}

impl CompiledPattern {
    /// The underlying regex, for callers that need more than spans.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Non-overlapping `(start, end)` byte spans, left to right.
    pub fn find_iter<'t>(&'t self, text: &'t str) -> impl Iterator<Item = (usize, usize)> + 't {
        self.regex.find_iter(text).map(|m| (m.start(), m.end()))
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Compile `query` into a matcher.
///
/// In literal mode every metacharacter is escaped, so `a.b*c` only matches
/// that exact substring. The caller is expected to have trimmed and checked
/// the query for emptiness.
///
/// # Errors
///
/// [`SearchError::InvalidPattern`] when `use_regex` is set and the query is
/// not a valid expression.
pub fn compile(
    query: &str,
    use_regex: bool,
    ignore_case: bool,
) -> Result<CompiledPattern, SearchError> {
    let source = if use_regex {
        query.to_string()
    } else {
        regex::escape(query)
    };

    let regex = RegexBuilder::new(&source)
        .dot_matches_new_line(true)
        .case_insensitive(ignore_case)
        .build()
        .map_err(|e| SearchError::InvalidPattern(e.to_string()))?;

    Ok(CompiledPattern { regex })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_mode_escapes_metacharacters() {
        let p = compile("a.b*c", false, false).unwrap();
        assert!(p.is_match("xx a.b*c yy"));
        assert!(!p.is_match("aXbbbc"));
        assert!(!p.is_match("abc"));
    }

    #[test]
    fn regex_mode_uses_pattern_language() {
        let p = compile("a.b*c", true, false).unwrap();
        assert!(p.is_match("aXbbbc"));
    }

    #[test]
    fn case_folding_follows_flag() {
        let insensitive = compile("Hello", false, true).unwrap();
        for text in ["hello", "HELLO", "HeLLo", "Hello"] {
            assert!(insensitive.is_match(text), "{text} should match");
        }

        let sensitive = compile("Hello", false, false).unwrap();
        assert!(sensitive.is_match("Hello"));
        for text in ["hello", "HELLO", "HeLLo"] {
            assert!(!sensitive.is_match(text), "{text} should not match");
        }
    }

    #[test]
    fn dot_crosses_line_breaks() {
        let p = compile("quarterly.revenue", true, false).unwrap();
        assert!(p.is_match("quarterly\nrevenue"));
    }

    #[test]
    fn malformed_regex_is_invalid_pattern() {
        let err = compile("(unclosed", true, false).unwrap_err();
        assert!(matches!(err, SearchError::InvalidPattern(_)));
    }

    #[test]
    fn find_iter_is_left_to_right_and_non_overlapping() {
        let p = compile("aa", false, false).unwrap();
        let spans: Vec<_> = p.find_iter("aaaaa").collect();
        assert_eq!(spans, vec![(0, 2), (2, 4)]);
    }
}
