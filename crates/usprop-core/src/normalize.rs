//! Text cleaning applied to questions and answers before serialization.

/// Punctuation kept by default in addition to word characters and whitespace.
pub const DEFAULT_KEEP_CHARS: &str = ".?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNormalizer {
    keep_chars: Vec<char>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::with_keep_chars(DEFAULT_KEEP_CHARS)
    }
}

impl TextNormalizer {
    pub fn with_keep_chars(keep_chars: &str) -> Self {
        Self { keep_chars: keep_chars.chars().collect() }
    }

    /// Lower-case, drop everything that is not a word character, whitespace
    /// or a kept character, then collapse whitespace runs to single spaces.
    ///
    /// Word characters are Unicode alphanumerics and `_`; combining marks
    /// with the Alphabetic property (Devanagari vowel signs, for example)
    /// count as alphanumeric and are kept. Repeated kept
    /// characters are left alone: `"  Hello   World?? "` becomes
    /// `"hello world??"`.
    pub fn normalize(&self, text: &str) -> String {
        let filtered: String = text
            .to_lowercase()
            .chars()
            .filter(|&c| is_word_char(c) || is_space(c) || self.keep_chars.contains(&c))
            .collect();
        filtered.split(is_space).filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ")
    }
}

/// Normalize with the default kept characters.
pub fn normalize(text: &str) -> String {
    TextNormalizer::default().normalize(text)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// Unicode White_Space plus the ASCII information separators U+001C..U+001F,
// which Python's `\s` also treats as whitespace.
fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}
