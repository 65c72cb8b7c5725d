//! Greeting detection: the fast path that skips retrieval entirely.

const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hai",
    "hii",
    "good morning",
    "good afternoon",
    "good evening",
    "whats up",
    "what's up",
];

/// True when the input is nothing but a greeting.
///
/// The input is lowercased and trimmed, then compared against the fixed
/// greeting set: it matches when it equals a greeting phrase or starts
/// with one followed only by whitespace/punctuation ("hey!!", "hello :)").
/// A greeting followed by real content ("hey, what is the capital of
/// France") is a question, not a greeting, and falls through to
/// retrieval.
pub fn is_greeting(input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    if normalized.is_empty() {
        return false;
    }

    GREETINGS.iter().any(|phrase| {
        normalized
            .strip_prefix(phrase)
            .is_some_and(|rest| rest.chars().all(|c| !c.is_alphanumeric()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_greeting_phrase_matches() {
        for phrase in GREETINGS {
            assert!(is_greeting(phrase), "{phrase:?} should match");
        }
    }

    #[test]
    fn case_and_whitespace_variations_match() {
        assert!(is_greeting("  HELLO  "));
        assert!(is_greeting("Good Morning"));
        assert!(is_greeting("\tWhats Up\n"));
    }

    #[test]
    fn trailing_punctuation_still_matches() {
        assert!(is_greeting("hey!"));
        assert!(is_greeting("good evening?"));
        assert!(is_greeting("hi..."));
    }

    #[test]
    fn greeting_followed_by_a_question_does_not_match() {
        assert!(!is_greeting("hey, what is the capital of France"));
        assert!(!is_greeting("hello can you summarize this"));
        assert!(!is_greeting("hi there"));
    }

    #[test]
    fn mid_sentence_greeting_does_not_match() {
        assert!(!is_greeting("say hello to the team"));
        assert!(!is_greeting("the high road"));
    }

    #[test]
    fn empty_and_blank_input_do_not_match() {
        assert!(!is_greeting(""));
        assert!(!is_greeting("   "));
    }
}
