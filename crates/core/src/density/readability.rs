//! Readability formulas over tokenized sentences.
//!
//! The Flesch reading ease feeds the density score through
//! [`reading_difficulty`]. The remaining grade-level formulas are reported
//! alongside it in [`ReadabilityScores`] and take no part in the gate.

use serde::{Deserialize, Serialize};

/// Flesch reading ease above which text counts as trivially easy.
const EASY_READING_EASE: f64 = 90.0;

/// Words with at least this many syllables are "complex" for the fog index.
const COMPLEX_WORD_SYLLABLES: usize = 3;

/// Standard readability indices, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityScores {
    pub flesch_reading_ease: f64,
    pub flesch_kincaid_grade: f64,
    pub gunning_fog: f64,
    pub automated_readability_index: f64,
    pub coleman_liau_index: f64,
}

/// Raw counts the readability formulas are computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextCounts {
    pub words: usize,
    pub sentences: usize,
    pub syllables: usize,
    pub letters: usize,
    pub complex_words: usize,
}

impl TextCounts {
    /// Tallies lower-cased words grouped by sentence.
    pub fn from_sentences<S: AsRef<str>>(sentences: &[Vec<S>]) -> Self {
        let mut counts = Self { sentences: sentences.len(), ..Self::default() };
        for word in sentences.iter().flatten() {
            let word = word.as_ref();
            let syllables = count_syllables(word);
            counts.words += 1;
            counts.syllables += syllables;
            counts.letters += word.chars().filter(|c| c.is_alphanumeric()).count();
            if syllables >= COMPLEX_WORD_SYLLABLES {
                counts.complex_words += 1;
            }
        }
        counts
    }
}

impl ReadabilityScores {
    /// Computes every index from `counts`. Returns `None` when there are no words.
    ///
    /// # Arguments
    ///
    /// * `counts` - word, sentence, syllable, letter and complex-word totals
    ///
    /// # Example
    ///
    /// ```rust
    /// use sgnl_core::density::readability::{ReadabilityScores, TextCounts};
    ///
    /// let counts = TextCounts { words: 100, sentences: 5, syllables: 150, letters: 450, complex_words: 10 };
    /// let scores = ReadabilityScores::from_counts(&counts).unwrap();
    /// assert_eq!(scores.flesch_kincaid_grade, 9.91);
    /// assert_eq!(scores.gunning_fog, 12.0);
    /// ```
    pub fn from_counts(counts: &TextCounts) -> Option<Self> {
        if counts.words == 0 {
            return None;
        }
        let words = counts.words as f64;
        let sentences = counts.sentences.max(1) as f64;
        let words_per_sentence = words / sentences;
        let syllables_per_word = counts.syllables as f64 / words;
        let letters_per_word = counts.letters as f64 / words;

        Some(Self {
            flesch_reading_ease: round2(flesch_reading_ease(counts.words, counts.sentences, counts.syllables)),
            flesch_kincaid_grade: round2(0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59),
            gunning_fog: round2(0.4 * (words_per_sentence + 100.0 * counts.complex_words as f64 / words)),
            automated_readability_index: round2(4.71 * letters_per_word + 0.5 * words_per_sentence - 21.43),
            coleman_liau_index: round2(
                0.0588 * (100.0 * letters_per_word) - 0.296 * (100.0 * sentences / words) - 15.8,
            ),
        })
    }
}

/// Counts syllables as vowel groups, dropping a silent trailing `e`.
pub fn count_syllables(word: &str) -> usize {
    let lower = word.to_lowercase();
    let chars: Vec<char> = lower.chars().filter(|c| c.is_alphabetic()).collect();
    if chars.is_empty() {
        return 0;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut groups = 0;
    let mut previous_vowel = false;
    for &c in &chars {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            groups += 1;
        }
        previous_vowel = vowel;
    }

    let len = chars.len();
    let silent_e = len > 2 && chars[len - 1] == 'e' && !is_vowel(chars[len - 2]) && chars[len - 2] != 'l';
    if silent_e && groups > 1 {
        groups -= 1;
    }

    groups.max(1)
}

/// Flesch reading ease: `206.835 − 1.015·(words/sentences) − 84.6·(syllables/words)`.
pub fn flesch_reading_ease(words: usize, sentences: usize, syllables: usize) -> f64 {
    if words == 0 {
        return 0.0;
    }
    let sentences = sentences.max(1) as f64;
    let words = words as f64;
    206.835 - 1.015 * (words / sentences) - 84.6 * (syllables as f64 / words)
}

/// Maps reading ease onto `[0, 1]`, where harder text scores higher.
pub fn reading_difficulty(reading_ease: f64) -> f64 {
    ((EASY_READING_EASE - reading_ease) / EASY_READING_EASE).clamp(0.0, 1.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cat", 1)]
    #[case("make", 1)]
    #[case("table", 2)]
    #[case("compiler", 3)]
    #[case("ownership", 3)]
    #[case("readability", 5)]
    #[case("the", 1)]
    #[case("rhythm", 1)]
    #[case("42", 0)]
    fn test_count_syllables(#[case] word: &str, #[case] expected: usize) {
        assert_eq!(count_syllables(word), expected);
    }

    #[test]
    fn test_flesch_reading_ease() {
        let easy = flesch_reading_ease(10, 2, 11);
        let hard = flesch_reading_ease(40, 1, 80);
        assert!(easy > 90.0);
        assert!(hard < 0.0);
        assert_eq!(flesch_reading_ease(0, 0, 0), 0.0);
    }

    #[test]
    fn test_reading_difficulty_is_bounded() {
        assert_eq!(reading_difficulty(120.0), 0.0);
        assert_eq!(reading_difficulty(90.0), 0.0);
        assert!((reading_difficulty(45.0) - 0.5).abs() < 1e-9);
        assert_eq!(reading_difficulty(-40.0), 1.0);
    }

    #[test]
    fn test_text_counts_from_sentences() {
        let sentences = vec![vec!["the", "compiler", "rejects", "it"], vec!["fix", "the", "bug"]];
        let counts = TextCounts::from_sentences(&sentences);
        assert_eq!(counts.words, 7);
        assert_eq!(counts.sentences, 2);
        assert_eq!(counts.complex_words, 1);
        assert_eq!(counts.letters, 29);
    }

    #[test]
    fn test_readability_scores_formulas() {
        let counts = TextCounts { words: 100, sentences: 5, syllables: 150, letters: 450, complex_words: 10 };
        let scores = ReadabilityScores::from_counts(&counts).unwrap();
        assert!((scores.flesch_reading_ease - 59.64).abs() < 0.011);
        assert_eq!(scores.flesch_kincaid_grade, 9.91);
        assert_eq!(scores.gunning_fog, 12.0);
        assert!((scores.automated_readability_index - 9.77).abs() < 0.011);
        assert_eq!(scores.coleman_liau_index, 9.18);
    }

    #[test]
    fn test_harder_text_has_higher_grade() {
        let easy = TextCounts { words: 60, sentences: 10, syllables: 66, letters: 220, complex_words: 0 };
        let hard = TextCounts { words: 60, sentences: 2, syllables: 120, letters: 400, complex_words: 15 };
        let easy = ReadabilityScores::from_counts(&easy).unwrap();
        let hard = ReadabilityScores::from_counts(&hard).unwrap();
        assert!(hard.flesch_kincaid_grade > easy.flesch_kincaid_grade);
        assert!(hard.gunning_fog > easy.gunning_fog);
        assert!(hard.coleman_liau_index > easy.coleman_liau_index);
        assert!(hard.flesch_reading_ease < easy.flesch_reading_ease);
    }

    #[test]
    fn test_readability_scores_need_words() {
        assert_eq!(ReadabilityScores::from_counts(&TextCounts::default()), None);
    }
}
