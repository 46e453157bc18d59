//! Stylometric measurement helpers
//!
//! Per-page writing-style metrics and the z-score outlier rule used to
//! spot author shifts between pages.

use unicode_segmentation::UnicodeSegmentation;

use crate::types::StylometricProfile;

/// Stop words excluded from content-word statistics (English + Portuguese)
const STOP_WORDS: &[&str] = &[
    // English
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from",
    "had", "has", "have", "he", "her", "his", "i", "in", "is", "it", "its",
    "not", "of", "on", "or", "she", "that", "the", "their", "they", "this",
    "to", "was", "were", "which", "will", "with", "you",
    // Portuguese
    "ao", "aos", "até", "com", "como", "da", "das", "de", "do", "dos", "e",
    "ela", "ele", "em", "essa", "esse", "esta", "este", "eu", "foi", "mais",
    "mas", "na", "não", "nas", "no", "nos", "o", "os", "ou", "para", "pela",
    "pelo", "por", "que", "se", "sem", "seu", "sua", "um", "uma",
];

/// Collapses runs of whitespace, mirroring the cleaning applied before the
/// page-length floor is checked
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word.to_lowercase().as_str())
}

fn is_alphabetic(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_alphabetic())
}

/// Rough syllable estimate from vowel groups; never below one
fn syllables(word: &str) -> usize {
    const VOWELS: &str = "aeiouyáéíóúâêôãõàè";
    let mut count = 0;
    let mut previous_was_vowel = false;
    for c in word.to_lowercase().chars() {
        let is_vowel = VOWELS.contains(c);
        if is_vowel && !previous_was_vowel {
            count += 1;
        }
        previous_was_vowel = is_vowel;
    }
    count.max(1)
}

/// Flesch-Kincaid grade level
fn readability_grade(words: &[&str], sentence_count: usize) -> f64 {
    if words.is_empty() || sentence_count == 0 {
        return 0.0;
    }
    let word_count = words.len() as f64;
    let syllable_count: usize = words.iter().map(|w| syllables(w)).sum();
    0.39 * (word_count / sentence_count as f64)
        + 11.8 * (syllable_count as f64 / word_count)
        - 15.59
}

/// Computes the per-page profile over cleaned text
pub fn profile(text: &str) -> StylometricProfile {
    let sentences: Vec<&str> = text
        .unicode_sentences()
        .filter(|s| !s.trim().is_empty())
        .collect();
    let sentence_count = sentences.len().max(1);

    let words: Vec<&str> = text.unicode_words().collect();
    let content_words: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| is_alphabetic(w) && !is_stop_word(w))
        .collect();

    if content_words.is_empty() {
        return StylometricProfile {
            mean_sentence_len: 0.0,
            mean_word_len: 0.0,
            lexical_diversity: 0.0,
            readability_grade: 0.0,
        };
    }

    let mean_sentence_len = words.len() as f64 / sentence_count as f64;
    let mean_word_len = content_words
        .iter()
        .map(|w| w.chars().count() as f64)
        .sum::<f64>()
        / content_words.len() as f64;

    let unique: std::collections::BTreeSet<String> =
        content_words.iter().map(|w| w.to_lowercase()).collect();
    let lexical_diversity = unique.len() as f64 / content_words.len() as f64;

    StylometricProfile {
        mean_sentence_len,
        mean_word_len,
        lexical_diversity,
        readability_grade: readability_grade(&words, sentence_count),
    }
}

/// Flags pages whose readability sits more than `threshold` sample standard
/// deviations from the mean.
///
/// Undefined below two qualifying pages: no flag is ever raised there.
pub fn outlier_pages(values: &[(usize, f64)], threshold: f64) -> Vec<usize> {
    if values.len() < 2 {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|(_, v)| v).sum::<f64>() / n;
    let variance = values.iter().map(|(_, v)| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stdev = variance.sqrt();
    if stdev == 0.0 {
        return Vec::new();
    }

    values
        .iter()
        .filter(|(_, v)| ((v - mean) / stdev).abs() > threshold)
        .map(|(page, _)| *page)
        .collect()
}
