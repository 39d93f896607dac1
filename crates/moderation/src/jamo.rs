//! Hangul syllable decomposition.
//!
//! Precomposed syllables (U+AC00..U+D7A3) are split into their compatibility
//! jamo so that consonant-skeleton spellings can be matched against full
//! words.

const CHOSUNG: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ',
    'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
];

const JUNGSUNG: [char; 21] = [
    'ㅏ', 'ㅐ', 'ㅑ', 'ㅒ', 'ㅓ', 'ㅔ', 'ㅕ', 'ㅖ', 'ㅗ', 'ㅘ', 'ㅙ', 'ㅚ', 'ㅛ', 'ㅜ', 'ㅝ',
    'ㅞ', 'ㅟ', 'ㅠ', 'ㅡ', 'ㅢ', 'ㅣ',
];

// Index 0 means the syllable has no final consonant.
const JONGSUNG: [Option<char>; 28] = [
    None,
    Some('ㄱ'),
    Some('ㄲ'),
    Some('ㄳ'),
    Some('ㄴ'),
    Some('ㄵ'),
    Some('ㄶ'),
    Some('ㄷ'),
    Some('ㄹ'),
    Some('ㄺ'),
    Some('ㄻ'),
    Some('ㄼ'),
    Some('ㄽ'),
    Some('ㄾ'),
    Some('ㄿ'),
    Some('ㅀ'),
    Some('ㅁ'),
    Some('ㅂ'),
    Some('ㅄ'),
    Some('ㅅ'),
    Some('ㅆ'),
    Some('ㅇ'),
    Some('ㅈ'),
    Some('ㅊ'),
    Some('ㅋ'),
    Some('ㅌ'),
    Some('ㅍ'),
    Some('ㅎ'),
];

const SYLLABLE_BASE: u32 = 0xAC00;
const SYLLABLE_LAST: u32 = 0xD7A3;
const JUNGSUNG_COUNT: u32 = 21;
const JONGSUNG_COUNT: u32 = 28;

fn decompose(ch: char) -> Option<(char, char, Option<char>)> {
    let code = ch as u32;
    if !(SYLLABLE_BASE..=SYLLABLE_LAST).contains(&code) {
        return None;
    }

    let offset = code - SYLLABLE_BASE;
    let chosung = CHOSUNG[(offset / (JUNGSUNG_COUNT * JONGSUNG_COUNT)) as usize];
    let jungsung = JUNGSUNG[((offset % (JUNGSUNG_COUNT * JONGSUNG_COUNT)) / JONGSUNG_COUNT) as usize];
    let jongsung = JONGSUNG[(offset % JONGSUNG_COUNT) as usize];

    Some((chosung, jungsung, jongsung))
}

/// Convert text to its jamo form; non-Hangul characters pass through unchanged.
pub fn to_jamo(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match decompose(ch) {
            Some((cho, jung, jong)) => {
                out.push(cho);
                out.push(jung);
                if let Some(jong) = jong {
                    out.push(jong);
                }
            }
            None => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposes_open_syllable() {
        assert_eq!(to_jamo("바보"), "ㅂㅏㅂㅗ");
    }

    #[test]
    fn decomposes_closed_syllable() {
        assert_eq!(to_jamo("시발"), "ㅅㅣㅂㅏㄹ");
        assert_eq!(to_jamo("닭"), "ㄷㅏㄺ");
    }

    #[test]
    fn passes_through_non_hangul() {
        assert_eq!(to_jamo("abc 123!"), "abc 123!");
        assert_eq!(to_jamo("ㅅㅂ"), "ㅅㅂ");
    }

    #[test]
    fn handles_mixed_text() {
        assert_eq!(to_jamo("멋진user"), "ㅁㅓㅅㅈㅣㄴuser");
    }
}
