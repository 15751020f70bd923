//! Mood detection and manual mood selection

use crate::mood::Mood;
use crate::sentiment;

/// Polarity above which text reads as happy
pub const HAPPY_THRESHOLD: f64 = 0.4;
/// Polarity below which text reads as sad
pub const SAD_THRESHOLD: f64 = -0.2;

/// Detect moods from a free-text description
///
/// Mood names mentioned in the text win. Otherwise the sentiment polarity
/// picks exactly one mood, with adventurous as the neutral fallback.
pub fn detect_moods(text: &str) -> Vec<Mood> {
    let lowered = text.to_lowercase();
    let named: Vec<Mood> = Mood::ALL
        .into_iter()
        .filter(|mood| lowered.contains(mood.as_str()))
        .collect();
    if !named.is_empty() {
        return named;
    }

    let polarity = sentiment::polarity(text);
    if polarity > HAPPY_THRESHOLD {
        vec![Mood::Happy]
    } else if polarity < SAD_THRESHOLD {
        vec![Mood::Sad]
    } else {
        vec![Mood::Adventurous]
    }
}

/// Outcome of the mood selection prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoodSelection {
    /// Nothing entered: use the detected moods
    Automatic,
    /// Moods picked by the user
    Manual(Vec<Mood>),
}

impl MoodSelection {
    /// Resolve the selection against the automatically detected moods
    pub fn resolve(self, detected: &[Mood]) -> Vec<Mood> {
        match self {
            MoodSelection::Automatic => detected.to_vec(),
            MoodSelection::Manual(moods) => moods,
        }
    }
}

/// Parse a selection like `"1, sad 3"` against the offered moods
///
/// Numbers are 1-based indices into `available`; words must name one of the
/// offered moods. Unresolvable input falls back to the first offered mood.
pub fn parse_mood_selection(input: &str, available: &[Mood]) -> MoodSelection {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return MoodSelection::Automatic;
    }

    let mut selected: Vec<Mood> = Vec::new();
    for token in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let mood = if token.chars().all(|c| c.is_ascii_digit()) {
            token
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|idx| available.get(idx).copied())
        } else {
            available.iter().copied().find(|m| m.as_str() == token)
        };

        if let Some(mood) = mood {
            if !selected.contains(&mood) {
                selected.push(mood);
            }
        }
    }

    if selected.is_empty() {
        if let Some(first) = available.first() {
            selected.push(*first);
        }
    }
    MoodSelection::Manual(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_moods_win() {
        assert_eq!(detect_moods("Feeling HAPPY"), vec![Mood::Happy]);
        assert_eq!(
            detect_moods("sad but adventurous, maybe happy"),
            vec![Mood::Happy, Mood::Sad, Mood::Adventurous]
        );
        // named mood beats a negative sentiment
        assert_eq!(detect_moods("terrible, I want something adventurous"), vec![Mood::Adventurous]);
    }

    #[test]
    fn test_sentiment_fallback() {
        assert_eq!(detect_moods("I feel great today"), vec![Mood::Happy]);
        assert_eq!(detect_moods("what an awful week"), vec![Mood::Sad]);
        assert_eq!(detect_moods("dunno, whatever"), vec![Mood::Adventurous]);
        assert_eq!(detect_moods(""), vec![Mood::Adventurous]);
    }

    #[test]
    fn test_selection_empty_is_automatic() {
        assert_eq!(parse_mood_selection("   ", &Mood::ALL), MoodSelection::Automatic);
        assert_eq!(
            MoodSelection::Automatic.resolve(&[Mood::Sad]),
            vec![Mood::Sad]
        );
    }

    #[test]
    fn test_selection_numbers_and_names() {
        assert_eq!(
            parse_mood_selection("3, sad", &Mood::ALL),
            MoodSelection::Manual(vec![Mood::Adventurous, Mood::Sad])
        );
        assert_eq!(
            parse_mood_selection("1 1 happy", &Mood::ALL),
            MoodSelection::Manual(vec![Mood::Happy])
        );
        assert_eq!(
            parse_mood_selection("9, 2", &Mood::ALL),
            MoodSelection::Manual(vec![Mood::Sad])
        );
    }

    #[test]
    fn test_selection_garbage_falls_back_to_first() {
        assert_eq!(
            parse_mood_selection("0, grumpy", &Mood::ALL),
            MoodSelection::Manual(vec![Mood::Happy])
        );
        assert_eq!(
            parse_mood_selection("x", &[Mood::Sad, Mood::Happy]),
            MoodSelection::Manual(vec![Mood::Sad])
        );
    }
}
