use once_cell::sync::Lazy;
use regex::Regex;

/// Default per-chunk character budget for translation requests.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 800;

// A sentence-terminal mark plus the whitespace run that follows it. Cutting
// at the match end keeps the whitespace attached to the preceding segment,
// so segments concatenate back to the exact input.
static SENTENCE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("sentence break"));

/// Splits `text` into chunks of at most `max_chars` characters, breaking
/// only after sentence-terminal punctuation. A single sentence longer than
/// `max_chars` is kept whole. Whitespace-only input passes through as one
/// chunk; callers skip translation for it entirely.
pub fn split_for_translation(text: &str, max_chars: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![text.to_string()];
    }

    let mut segments: Vec<&str> = Vec::new();
    let mut start = 0usize;
    for m in SENTENCE_BREAK_RE.find_iter(text) {
        segments.push(&text[start..m.end()]);
        start = m.end();
    }
    if start < text.len() {
        segments.push(&text[start..]);
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;
    for seg in segments {
        let seg_chars = seg.chars().count();
        if !current.is_empty() && current_chars + seg_chars > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        current.push_str(seg);
        current_chars += seg_chars;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
