//! Lexicon-based sentiment polarity
//!
//! Scores free text in `[-1.0, 1.0]` the way pattern-style analyzers do:
//! every known word carries a polarity, an intensifier right before a word
//! amplifies it and a negator shortly before a word flips and damps it.
//! The text's polarity is the mean over all scored words.

/// Word polarities
const LEXICON: &[(&str, f64)] = &[
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("awful", -1.0),
    ("bad", -0.7),
    ("beautiful", 0.85),
    ("bored", -0.5),
    ("boring", -1.0),
    ("bright", 0.7),
    ("calm", 0.3),
    ("cheerful", 0.8),
    ("content", 0.4),
    ("crappy", -0.8),
    ("depressed", -0.8),
    ("disappointed", -0.75),
    ("dull", -0.3),
    ("excellent", 1.0),
    ("excited", 0.4),
    ("exhausted", -0.4),
    ("fantastic", 0.4),
    ("fine", 0.4),
    ("fun", 0.3),
    ("glad", 0.5),
    ("gloomy", -0.6),
    ("good", 0.7),
    ("great", 0.8),
    ("grumpy", -0.5),
    ("happy", 0.8),
    ("hate", -0.8),
    ("horrible", -1.0),
    ("joyful", 0.8),
    ("lonely", -0.5),
    ("love", 0.5),
    ("lovely", 0.5),
    ("low", -0.3),
    ("mad", -0.6),
    ("miserable", -1.0),
    ("nice", 0.6),
    ("ok", 0.2),
    ("okay", 0.2),
    ("perfect", 1.0),
    ("pleased", 0.5),
    ("poor", -0.4),
    ("sad", -0.5),
    ("stressed", -0.6),
    ("terrible", -1.0),
    ("thrilled", 0.6),
    ("tired", -0.4),
    ("unhappy", -0.6),
    ("upset", -0.6),
    ("wonderful", 1.0),
    ("worried", -0.5),
    ("worse", -0.4),
    ("worst", -1.0),
];

const INTENSIFIERS: &[&str] = &[
    "very",
    "really",
    "so",
    "extremely",
    "super",
    "totally",
    "incredibly",
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "don't", "dont", "isn't", "isnt", "aren't", "wasn't", "can't",
    "cannot", "didn't", "doesn't", "nor", "hardly",
];

const INTENSIFIER_FACTOR: f64 = 1.3;
const NEGATION_FACTOR: f64 = -0.5;
const NEGATION_WINDOW: usize = 2;

/// Look up the polarity of a single lower-case word
pub fn word_polarity(word: &str) -> Option<f64> {
    LEXICON
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, score)| *score)
}

/// Split text into lower-case word tokens, keeping apostrophes
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('\u{2019}', "'")
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Polarity of a piece of text in `[-1.0, 1.0]`; `0.0` when nothing scores
pub fn polarity(text: &str) -> f64 {
    let tokens = tokenize(text);
    let mut scores = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        let Some(mut score) = word_polarity(token) else {
            continue;
        };

        if i > 0 && INTENSIFIERS.contains(&tokens[i - 1].as_str()) {
            score = (score * INTENSIFIER_FACTOR).clamp(-1.0, 1.0);
        }

        let window_start = i.saturating_sub(NEGATION_WINDOW);
        if tokens[window_start..i]
            .iter()
            .any(|t| NEGATORS.contains(&t.as_str()))
        {
            score *= NEGATION_FACTOR;
        }

        scores.push(score);
    }

    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("I DON’T feel great, really!"),
            vec!["i", "don't", "feel", "great", "really"]
        );
        assert!(tokenize("  ...  ").is_empty());
    }

    #[test]
    fn test_neutral_text() {
        assert!(approx(polarity(""), 0.0));
        assert!(approx(polarity("going out tonight"), 0.0));
    }

    #[test]
    fn test_plain_words() {
        assert!(approx(polarity("I feel great"), 0.8));
        assert!(approx(polarity("what a terrible day"), -1.0));
        // mean of good (0.7) and boring (-1.0)
        assert!(approx(polarity("good food, boring place"), -0.15));
    }

    #[test]
    fn test_intensifier() {
        assert!(approx(polarity("very good"), 0.7 * 1.3));
        assert!(approx(polarity("really awesome"), 1.0));
    }

    #[test]
    fn test_negation() {
        assert!(approx(polarity("not good"), -0.35));
        assert!(approx(polarity("I'm not feeling bad"), 0.35));
        // negator outside the window is ignored
        assert!(approx(polarity("not that I am happy"), 0.8));
    }

    #[test]
    fn test_bounds() {
        let p = polarity("so so so perfect");
        assert!(p <= 1.0);
        let n = polarity("extremely awful horrible");
        assert!(n >= -1.0);
    }
}
