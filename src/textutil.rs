use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Accent-stripped, lowercased form used for fuzzy comparison. Never
/// persisted: folding can change string length, so offsets into the folded
/// form only approximate offsets into the raw form.
pub fn fold_for_match(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// The decimal digits of `s`, in order, everything else removed.
pub fn digits_only(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

pub fn has_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}
