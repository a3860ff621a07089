//! Query scoring
//!
//! A query is matched against an item's term list through a tiered
//! heuristic; the first tier that hits wins:
//! - exact equality: `10000 + len` (`5000 + len` for terms of ≤ 3 chars)
//! - word-boundary hit at `offset`: `4000 - offset` when the hit is a whole
//!   word, `3000 - offset` when only boundary-anchored
//! - plain substring at `offset`: `2000 - offset`
//! - bounded edit distance `d`: `1000 - d`, only for short-ish terms with a
//!   similar length, and only when `d` is at most half the query length
//! - otherwise the term contributes 0
//!
//! The regex is compiled once per query, not per term.

use regex::Regex;

/// Per-query matching state shared across all scored terms
pub(crate) struct QueryMatcher {
    normalized: String,
    boundary: Option<Regex>,
    no_levenshtein: bool,
}

impl QueryMatcher {
    /// Build the matcher for a non-empty, already-normalized query
    pub(crate) fn new(normalized: String, no_levenshtein: bool) -> Self {
        let boundary = Regex::new(&format!(r"\b{}", regex::escape(&normalized))).ok();
        QueryMatcher {
            normalized,
            boundary,
            no_levenshtein,
        }
    }

    pub(crate) fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Score one term against the query; 0 means "does not qualify"
    pub(crate) fn score_term(&self, term: &str) -> f64 {
        let query = &self.normalized;

        if term == query {
            let len = term.chars().count();
            return if len <= 3 {
                5000.0 + len as f64
            } else {
                10000.0 + len as f64
            };
        }

        if let Some(hit) = self.boundary.as_ref().and_then(|re| re.find(term)) {
            // Offsets penalize by character position, not byte position
            let offset = term[..hit.start()].chars().count() as f64;
            let whole_word = term[hit.end()..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric() && c != '_');
            return if whole_word {
                4000.0 - offset
            } else {
                3000.0 - offset
            };
        }

        if let Some(byte_offset) = term.find(query.as_str()) {
            let offset = term[..byte_offset].chars().count() as f64;
            return 2000.0 - offset;
        }

        if !self.no_levenshtein {
            let term_len = term.chars().count();
            let query_len = query.chars().count();
            if term_len < 20 && term_len.abs_diff(query_len) < 5 {
                if let Some(distance) = bounded_levenshtein(query, term, query_len / 2) {
                    return 1000.0 - distance as f64;
                }
            }
        }

        0.0
    }
}

/// Levenshtein distance between `a` and `b`, abandoned once it provably
/// exceeds `max`
///
/// Two-row dynamic program; returns `None` when the distance is above `max`.
pub fn bounded_levenshtein(a: &str, b: &str, max: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > max {
        return None;
    }
    if a.is_empty() {
        return (b.len() <= max).then_some(b.len());
    }
    if b.is_empty() {
        return (a.len() <= max).then_some(a.len());
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
            row_min = row_min.min(curr[j + 1]);
        }
        // Every later cell derives from this row, so the whole row being
        // over budget means the final distance is too
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    let distance = prev[b.len()];
    (distance <= max).then_some(distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(query: &str) -> QueryMatcher {
        QueryMatcher::new(query.to_string(), false)
    }

    #[test]
    fn test_exact_match_scores_by_length() {
        assert_eq!(matcher("hello").score_term("hello"), 10005.0);
        // Short terms are down-weighted
        assert_eq!(matcher("abc").score_term("abc"), 5003.0);
        assert_eq!(matcher("ab").score_term("ab"), 5002.0);
    }

    #[test]
    fn test_whole_word_boundary_match() {
        // "world" starts at offset 6 and ends the term
        assert_eq!(matcher("world").score_term("hello world"), 3994.0);
        // Whole word in the middle
        assert_eq!(matcher("world").score_term("a world apart"), 3998.0);
    }

    #[test]
    fn test_boundary_but_not_whole_word() {
        // "world" starts the word "worldly" at offset 4
        assert_eq!(matcher("world").score_term("say worldly"), 2996.0);
    }

    #[test]
    fn test_plain_substring_match() {
        // No word boundary before "world" in "sworld"
        assert_eq!(matcher("world").score_term("sworld"), 1999.0);
    }

    #[test]
    fn test_levenshtein_fallback() {
        // One substitution, query length 5 allows distance up to 2
        assert_eq!(matcher("hello").score_term("hallo"), 999.0);
        assert_eq!(matcher("hello").score_term("hallu"), 998.0);
        // Three edits exceed half the query length
        assert_eq!(matcher("hello").score_term("haalu"), 0.0);
    }

    #[test]
    fn test_levenshtein_gates() {
        // Terms of 20+ chars never take the fallback
        assert_eq!(matcher("hello").score_term("aaaaaaaaaaaaaaaaaaaa"), 0.0);
        // Length difference of 5+ never takes the fallback
        assert_eq!(matcher("hello").score_term("abcdefghij"), 0.0);
        // Disabled fallback
        let strict = QueryMatcher::new("hello".to_string(), true);
        assert_eq!(strict.score_term("hallo"), 0.0);
    }

    #[test]
    fn test_tier_ordering() {
        let m = matcher("world");
        let exact = m.score_term("world");
        let whole = m.score_term("hello world");
        let boundary = m.score_term("say worldly");
        let substring = m.score_term("sworld");
        let fuzzy = m.score_term("worle");
        assert!(exact > whole);
        assert!(whole > boundary);
        assert!(boundary > substring);
        assert!(substring > fuzzy);
        assert!(fuzzy > 0.0);
    }

    #[test]
    fn test_offsets_count_characters_not_bytes() {
        // "test" sits 4 characters (10 bytes) into the term
        assert_eq!(matcher("test").score_term("日本語 test"), 3996.0);
        // The substring starts 2 characters (6 bytes) in
        assert_eq!(matcher("語te").score_term("日本語test"), 1998.0);
    }

    #[test]
    fn test_bounded_levenshtein_basics() {
        assert_eq!(bounded_levenshtein("kitten", "sitting", 3), Some(3));
        assert_eq!(bounded_levenshtein("kitten", "sitting", 2), None);
        assert_eq!(bounded_levenshtein("same", "same", 0), Some(0));
        assert_eq!(bounded_levenshtein("", "abc", 3), Some(3));
        assert_eq!(bounded_levenshtein("", "abcd", 3), None);
        assert_eq!(bounded_levenshtein("ab", "ba", 2), Some(2));
    }

    #[test]
    fn test_regex_metacharacters_in_query_are_literal() {
        // A query containing regex syntax must not panic or mismatch
        let m = matcher("a+b");
        assert_eq!(m.score_term("a+b"), 5003.0);
        assert!(m.score_term("xxab") <= 0.0 || m.score_term("xxab") < 2000.0);
    }
}
