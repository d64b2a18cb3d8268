//! Relevance of a title to the live search string
//!
//! Only the relative order of scores matters.

/// Score `candidate` against a non-empty `query`. Higher is better.
///
/// A case-insensitive substring hit at char position `p` scores
/// `100 - p - 0.1 * | |candidate| - |query| |`. Anything else falls back to
/// [`indel_ratio`] on the case-preserved strings.
///
/// ```
/// use core_library::view::fuzzy::match_score;
///
/// assert!(match_score("Fou", "Foundation") > match_score("Fou", "Dune"));
/// ```
pub fn match_score(query: &str, candidate: &str) -> f64 {
    match substring_position(query, candidate) {
        Some(position) => {
            let length_gap = candidate.chars().count().abs_diff(query.chars().count());
            100.0 - position as f64 - 0.1 * length_gap as f64
        }
        None => indel_ratio(query, candidate),
    }
}

/// Char position of the first case-insensitive occurrence of `query` in
/// `candidate`.
///
/// Counted in the lower-cased text, which can be longer than `candidate`:
/// `İ` lowers to `i` plus a combining dot.
fn substring_position(query: &str, candidate: &str) -> Option<usize> {
    let haystack = candidate.to_lowercase();
    let needle = query.to_lowercase();
    let byte_offset = haystack.find(&needle)?;
    Some(haystack[..byte_offset].chars().count())
}

/// Normalized Indel similarity, `100 * (1 - distance / (|a| + |b|))`.
///
/// Indel distance only counts insertions and deletions, so it equals
/// `|a| + |b| - 2 * LCS(a, b)`. Two empty strings are identical (100).
pub fn indel_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }

    let common = longest_common_subsequence(&a, &b);
    100.0 * (2 * common) as f64 / total as f64
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev_row = vec![0usize; b.len() + 1];
    let mut curr_row = vec![0usize; b.len() + 1];

    for &left in a {
        for (j, &right) in b.iter().enumerate() {
            curr_row[j + 1] = if left == right {
                prev_row[j] + 1
            } else {
                prev_row[j + 1].max(curr_row[j])
            };
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_substring_score_formula() {
        // "Fou" at 0 in "Foundation": 100 - 0 - 0.1 * 7
        assert_close(match_score("Fou", "Foundation"), 99.3);
        // "dat" at 4: 100 - 4 - 0.1 * 7
        assert_close(match_score("dat", "Foundation"), 95.3);
    }

    #[test]
    fn test_substring_match_ignores_case() {
        assert_close(match_score("DUNE", "Dune"), 100.0);
        assert_close(match_score("herbert", "Frank Herbert"), 100.0 - 6.0 - 0.6);
    }

    #[test]
    fn test_substring_position_counts_chars() {
        // 'É' is two bytes but one char
        assert_close(match_score("toile", "Étoile"), 100.0 - 1.0 - 0.1);
    }

    #[test]
    fn test_substring_position_uses_lowercased_text() {
        // "İ" lowers to two chars, shifting "nights" from 9 to 10
        assert_close(match_score("nights", "İstanbul Nights"), 100.0 - 10.0 - 0.9);
    }

    #[test]
    fn test_earlier_position_ranks_higher() {
        let early = match_score("ring", "Rings of Power");
        let late = match_score("ring", "The Lord of the Rings");
        assert!(early > late);
    }

    #[test]
    fn test_fallback_to_indel_ratio() {
        // LCS("Fou", "Dune") = "u"
        assert_close(match_score("Fou", "Dune"), 100.0 * 2.0 / 7.0);
    }

    #[test]
    fn test_indel_ratio_bounds() {
        assert_close(indel_ratio("", ""), 100.0);
        assert_close(indel_ratio("abc", "abc"), 100.0);
        assert_close(indel_ratio("abc", "xyz"), 0.0);
        assert_close(indel_ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_indel_ratio_is_case_sensitive() {
        assert_close(indel_ratio("ABC", "abc"), 0.0);
    }

    #[test]
    fn test_indel_ratio_is_symmetric() {
        assert_close(indel_ratio("kitten", "sitting"), indel_ratio("sitting", "kitten"));
        // LCS("kitten", "sitting") = "ittn"
        assert_close(indel_ratio("kitten", "sitting"), 100.0 * 8.0 / 13.0);
    }
}
