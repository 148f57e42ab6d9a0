//! Token-order-insensitive similarity scoring between titles

/// Score two strings 0-100, insensitive to word order.
///
/// Tokens are sorted before comparison, so "knight hollow" and
/// "hollow knight" score 100. The score is a Levenshtein distance
/// normalized over the longer sorted string.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let sorted_a = sort_tokens(a);
    let sorted_b = sort_tokens(b);
    ratio(&sorted_a, &sorted_b)
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn ratio(a: &str, b: &str) -> u8 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let longest = len_a.max(len_b);
    if longest == 0 {
        return 100;
    }
    let distance = levenshtein(a, b);
    (100.0 * (1.0 - distance as f64 / longest as f64)).round() as u8
}

/// Classic two-row Levenshtein over chars.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur: Vec<usize> = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            cur[j + 1] = (prev[j + 1] + 1).min(cur[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_score_100() {
        assert_eq!(token_sort_ratio("hollow knight", "hollow knight"), 100);
    }

    #[test]
    fn test_word_order_is_ignored() {
        assert_eq!(token_sort_ratio("knight hollow", "hollow knight"), 100);
        assert_eq!(
            token_sort_ratio("war of god", "god of war"),
            token_sort_ratio("god of war", "god of war"),
        );
    }

    #[test]
    fn test_both_empty_score_100() {
        assert_eq!(token_sort_ratio("", ""), 100);
        assert_eq!(token_sort_ratio("   ", ""), 100);
    }

    #[test]
    fn test_disjoint_strings_score_low() {
        assert!(token_sort_ratio("hollow knight", "stardew valley") < 50);
        assert_eq!(token_sort_ratio("", "hollow knight"), 0);
    }

    #[test]
    fn test_small_edit_scores_high() {
        // one char off in 14 -> 93
        assert_eq!(token_sort_ratio("hollow knight", "hollow knights"), 93);
    }

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", "abc"), 0);
    }
}
