//! Crisis Keyword Detector.
//!
//! Case-insensitive substring match against a fixed phrase list. Paraphrased
//! crisis language will not match; that limitation is accepted here and the
//! coach system prompt carries its own safety rules as a second line.

const CRISIS_PHRASES: &[&str] = &[
    "suicide",
    "suicidal",
    "kill myself",
    "killing myself",
    "end my life",
    "ending my life",
    "take my own life",
    "want to die",
    "wanna die",
    "better off dead",
    "no reason to live",
    "ending it all",
    "end it all",
    "self harm",
    "self-harm",
    "hurt myself",
    "cut myself",
    "overdose",
];

/// Fixed reply sent instead of a coaching response when crisis language is detected.
pub const CRISIS_RESPONSE: &str = "It sounds like you are going through something really painful, \
and I'm glad you told me. You deserve support from a person right now. \
If you are in immediate danger, please call your local emergency number. \
In the US you can call or text 988 (Suicide & Crisis Lifeline) any time, \
or text HOME to 741741 to reach the Crisis Text Line. \
If you are outside the US, findahelpline.com lists free, confidential lines in your country. \
I'm still here to talk when you're ready.";

/// True if `text` contains any known crisis phrase.
pub fn detect_crisis(text: &str) -> bool {
    let lowered = text.to_lowercase();
    CRISIS_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_end_my_life() {
        assert!(detect_crisis("I want to end my life"));
    }

    #[test]
    fn test_ordinary_stress_is_not_crisis() {
        assert!(!detect_crisis("I had a stressful day"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(detect_crisis("Sometimes I think about SUICIDE"));
        assert!(detect_crisis("thinking about Self-Harm again"));
    }

    #[test]
    fn test_empty_text() {
        assert!(!detect_crisis(""));
    }

    #[test]
    fn test_paraphrase_is_a_known_miss() {
        assert!(!detect_crisis("I don't see the point in anything anymore"));
    }

    #[test]
    fn test_crisis_response_lists_hotline() {
        assert!(CRISIS_RESPONSE.contains("988"));
    }
}
