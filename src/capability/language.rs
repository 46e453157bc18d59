//! Short-text language classification

use lingua::{Language, LanguageDetector, LanguageDetectorBuilder};

use super::LanguageClassifier;

/// Classifier over a fixed set of common document languages
pub struct LinguaClassifier {
    detector: LanguageDetector,
}

impl LinguaClassifier {
    pub fn new() -> Self {
        let detector = LanguageDetectorBuilder::from_languages(&[
            Language::English,
            Language::Portuguese,
            Language::Spanish,
            Language::French,
            Language::German,
            Language::Italian,
        ])
        .build();
        Self { detector }
    }
}

impl Default for LinguaClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageClassifier for LinguaClassifier {
    fn classify(&self, sample: &str) -> Option<String> {
        self.detector
            .detect_language_of(sample)
            .map(|language| language.iso_code_639_1().to_string().to_lowercase())
    }
}
