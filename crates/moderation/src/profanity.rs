//! Denylist-based profanity filter.
//!
//! Matching runs twice: once over the lowercased input and once over its
//! jamo decomposition, so "ㅅㅣㅂㅏㄹ"-style spellings and bare consonant
//! shorthands are caught alongside the plain words.

use once_cell::sync::Lazy;

use crate::jamo::to_jamo;

static PROFANITY_WORDS: &[&str] = &[
    "바보",
    "멍청이",
    "새끼",
    "시발",
    "개새끼",
    "병신",
    "존나",
    "좆",
    "씨발",
    "창녀",
    "개같은",
    "미친놈",
    "꺼져",
    "지랄",
    "염병",
    "걸레",
    "미친",
    "썅",
    "씹새끼",
    "개소리",
    "등신",
    "개놈",
    "또라이",
    "돌대가리",
    "새꺄",
    "썅년",
    "개년",
    "개지랄",
    "졸라",
    "닥쳐",
    "븅신",
    "쓰레기",
    "창놈",
    "쪼다",
    "찐따",
    "병맛",
    "싸이코",
    "개새",
    "씹새",
    "씨발놈",
    "씨발년",
    "씨발새끼",
    "좆같은",
    "지랄하네",
    "병신새끼",
    "쌍년",
    "쌍놈",
    "좆밥",
    "색기",
    "ㅅㅂ",
    "ㅈㄴ",
    "ㄲㅈ",
    "ㅁㅊ",
    "ㅆㅂ",
    "ㅂㅅ",
    "ㅈㄹ",
    "ㄱㅅㄲ",
    "ㅆㅂㅅㄲ",
];

static PROFANITY_JAMO: Lazy<Vec<String>> = Lazy::new(|| {
    PROFANITY_WORDS
        .iter()
        .map(|word| to_jamo(&word.to_lowercase()))
        .collect()
});

/// Whether the text contains any denylisted word, in plain or jamo form.
pub fn contains_profanity(text: &str) -> bool {
    let lowered = text.to_lowercase();
    if PROFANITY_WORDS.iter().any(|word| lowered.contains(word)) {
        return true;
    }

    let jamo = to_jamo(&lowered);
    PROFANITY_JAMO
        .iter()
        .any(|pattern| jamo.contains(pattern.as_str()))
}

/// Replace each denylisted word with `*` repeated to the word's length.
///
/// Only plain-form occurrences are rewritten; jamo-form hits have no stable
/// mapping back onto the original syllables.
pub fn mask_profanity(text: &str) -> String {
    let mut masked = text.to_string();
    for word in PROFANITY_WORDS {
        if !masked.contains(word) {
            continue;
        }
        let stars = "*".repeat(word.chars().count());
        masked = masked.replace(word, &stars);
    }
    masked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_plain_words() {
        assert!(contains_profanity("바보"));
        assert!(contains_profanity("이 바보야"));
        assert!(contains_profanity("멍청이같은"));
    }

    #[test]
    fn detects_consonant_shorthand() {
        assert!(contains_profanity("ㅅㅂ"));
        assert!(contains_profanity("아 ㅂㅅ 같네"));
    }

    #[test]
    fn detects_jamo_spelling_of_full_word() {
        assert!(contains_profanity("ㅂㅏㅂㅗ"));
        assert!(contains_profanity("ㅅㅣㅂㅏㄹ"));
    }

    #[test]
    fn accepts_clean_text() {
        assert!(!contains_profanity("안녕하세요"));
        assert!(!contains_profanity("happy_tiger"));
        assert!(!contains_profanity("좋은 하루 되세요"));
    }

    #[test]
    fn masks_plain_words_with_stars() {
        assert_eq!(mask_profanity("이 바보야"), "이 **야");
        assert_eq!(mask_profanity("멍청이 소리 하네"), "*** 소리 하네");
    }

    #[test]
    fn mask_leaves_clean_text_untouched() {
        assert_eq!(mask_profanity("안녕하세요"), "안녕하세요");
    }
}
