//! Character-bigram text similarity.
//!
//! Korean review text is agglutinative, so whole-word matching misses most
//! overlaps ("연기가" vs "연기는"). Bigrams over letters and digits catch them
//! without a morphological analyzer.

use std::collections::HashMap;

/// Bigram frequency vector of a text.
pub type Profile = HashMap<[char; 2], u32>;

/// Lowercased letters and digits only; whitespace and punctuation are dropped.
fn normalize(text: &str) -> Vec<char> {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Build the bigram profile of `text`. A single-character text yields one
/// padded gram so that it can still match.
pub fn bigram_profile(text: &str) -> Profile {
    let chars = normalize(text);
    let mut profile = Profile::new();

    match chars.len() {
        0 => {}
        1 => {
            profile.insert([chars[0], '\0'], 1);
        }
        _ => {
            for pair in chars.windows(2) {
                *profile.entry([pair[0], pair[1]]).or_insert(0) += 1;
            }
        }
    }

    profile
}

/// Cosine similarity of two profiles, in [0, 1]. Empty profiles score 0.
pub fn cosine_similarity(a: &Profile, b: &Profile) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let dot: f64 = small
        .iter()
        .filter_map(|(gram, x)| large.get(gram).map(|y| *x as f64 * *y as f64))
        .sum();

    let norm = |p: &Profile| p.values().map(|v| (*v as f64).powi(2)).sum::<f64>().sqrt();
    let denom = norm(a) * norm(b);
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}
