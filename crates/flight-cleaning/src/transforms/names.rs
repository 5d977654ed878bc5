//! Carrier-name normalization.

/// Cleans free-text airline names.
///
/// Applies, in order: trim, drop every character that is not an ASCII
/// letter, ASCII digit or space, then title-case. Inner spacing is kept as
/// is, so removing punctuation can leave trailing or doubled spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameNormalizer;

impl NameNormalizer {
    pub fn normalize(&self, name: &str) -> String {
        let kept: String = name.trim().chars().filter(|&c| is_kept(c)).collect();
        title_case(&kept)
    }
}

/// ASCII letters, ASCII digits and the plain space survive normalization.
pub fn is_kept(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' '
}

/// Upper-case the first letter of each run of ASCII letters and lower-case
/// the rest of the run. Every other character is copied unchanged.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if c.is_ascii_alphabetic() {
            out.push(if in_word {
                c.to_ascii_lowercase()
            } else {
                c.to_ascii_uppercase()
            });
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}
