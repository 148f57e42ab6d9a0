//! Title domain - normalization for cross-storefront comparison

pub mod similarity;

pub use similarity::token_sort_ratio;

/// Platform and edition noise stripped before comparing titles.
/// Multi-word phrases first so "game of the year" wins over "edition".
const NOISE_PHRASES: &[&[&str]] = &[
    &["game", "of", "the", "year"],
    &["deluxe", "edition"],
    &["special", "edition"],
    &["standard", "edition"],
    &["ultimate", "edition"],
    &["edition"],
    &["remastered"],
    &["goty"],
    &["playstation"],
    &["ps4"],
    &["ps5"],
];

/// Strip platform tags, edition suffixes, trademark glyphs and bracketed
/// segments from a title, lowercase it and collapse whitespace.
///
/// Idempotent: normalizing twice yields the same string. Empty input yields
/// empty output.
pub fn normalize(title: &str) -> String {
    let lowered = title.to_lowercase();
    let unglyphed: String = lowered.chars().filter(|c| *c != '™' && *c != '®').collect();
    let unbracketed = strip_bracketed(&unglyphed);

    let tokens: Vec<&str> = unbracketed.split_whitespace().collect();
    let mut kept: Vec<&str> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        match match_phrase_at(&tokens, i) {
            Some(len) => i += len,
            None => {
                kept.push(tokens[i]);
                i += 1;
            }
        }
    }
    kept.join(" ")
}

/// Length of the noise phrase starting at `pos`, if any.
fn match_phrase_at(tokens: &[&str], pos: usize) -> Option<usize> {
    for phrase in NOISE_PHRASES {
        if pos + phrase.len() > tokens.len() {
            continue;
        }
        let matches = phrase
            .iter()
            .zip(&tokens[pos..pos + phrase.len()])
            .all(|(want, tok)| bare(tok) == *want);
        if matches {
            return Some(phrase.len());
        }
    }
    None
}

/// Token with surrounding punctuation removed, so "edition:" still counts
/// as the word "edition".
fn bare(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Drop `(..)` and `[..]` segments, including the brackets themselves.
fn strip_bracketed(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth_paren = 0usize;
    let mut depth_square = 0usize;
    for c in text.chars() {
        match c {
            '(' => depth_paren += 1,
            ')' => depth_paren = depth_paren.saturating_sub(1),
            '[' => depth_square += 1,
            ']' => depth_square = depth_square.saturating_sub(1),
            _ if depth_paren == 0 && depth_square == 0 => out.push(c),
            _ => {}
        }
    }
    out
}
