//! Word counting over decoded text runs.

/// Count maximal runs of word characters (letters, digits, underscore).
pub fn count_words(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;
    for c in text.chars() {
        let word_char = is_word_char(c);
        if word_char && !in_word {
            count += 1;
        }
        in_word = word_char;
    }
    count
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
