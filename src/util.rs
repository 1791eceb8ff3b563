/// Strip leading and trailing symbol characters from a quizzed word.
///
/// The backend applies the same cleanup before serving a question, but words
/// can reach the client from older persisted logs, so the rule lives here too:
/// anything that is not alphanumeric or an underscore is trimmed from both
/// ends, interior punctuation is kept.
pub fn strip_symbols(s: &str) -> &str {
    s.trim_matches(|c: char| !(c.is_alphanumeric() || c == '_'))
}

pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64) * 100.0
}
